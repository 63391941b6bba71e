//! Shared types for the fleet timeline

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Newtype wrapper for vehicle IDs to provide type safety
///
/// IDs are UUIDv7 (time-sortable) and stay stable across cache round-trips,
/// so callers can hold onto a vehicle reference while the display order or
/// index changes underneath them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct VehicleId(pub Uuid);

impl VehicleId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for VehicleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype wrapper for schedule IDs to provide type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ScheduleId(pub Uuid);

impl ScheduleId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ScheduleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Area identifier - one of the fixed set of municipalities the fleet covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaSlug {
    Yamato,
    Ebina,
    Chofu,
}

impl AreaSlug {
    /// All known areas, in display order
    pub const ALL: [AreaSlug; 3] = [AreaSlug::Yamato, AreaSlug::Ebina, AreaSlug::Chofu];

    pub fn as_str(&self) -> &'static str {
        match self {
            AreaSlug::Yamato => "yamato",
            AreaSlug::Ebina => "ebina",
            AreaSlug::Chofu => "chofu",
        }
    }
}

impl std::str::FromStr for AreaSlug {
    type Err = UnknownArea;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yamato" => Ok(AreaSlug::Yamato),
            "ebina" => Ok(AreaSlug::Ebina),
            "chofu" => Ok(AreaSlug::Chofu),
            other => Err(UnknownArea(other.to_string())),
        }
    }
}

impl std::fmt::Display for AreaSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown area slug: {0}")]
pub struct UnknownArea(pub String);

/// Remote payload resolved into a closed shape at the ingestion boundary
///
/// The upstream endpoint is loose about how it wraps its rows (bare array,
/// `{"data": [...]}`, `{"values": [...]}`) and about whether rows are cell
/// arrays or keyed objects. Shape detection happens exactly once, here, so
/// normalization can match exhaustively instead of duck-typing per call site.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Rows as positional cell arrays, possibly with a leading header row
    Rows(Vec<Vec<Value>>),
    /// Rows as keyed objects with synonym-variant field names
    Objects(Vec<Map<String, Value>>),
    /// Unknown shape, empty response, or malformed body
    Empty,
}

impl Payload {
    /// Resolve a parsed JSON body into a payload shape.
    ///
    /// Any shape other than the three accepted wrappers degrades to `Empty`;
    /// mixed-type row lists keep only the elements matching the detected
    /// row form.
    pub fn from_json(json: Value) -> Payload {
        let rows = match json {
            Value::Array(items) => items,
            Value::Object(mut obj) => match obj.remove("data") {
                Some(Value::Array(items)) => items,
                _ => match obj.remove("values") {
                    Some(Value::Array(items)) => items,
                    _ => return Payload::Empty,
                },
            },
            _ => return Payload::Empty,
        };

        match rows.first() {
            Some(Value::Array(_)) => Payload::Rows(
                rows.into_iter()
                    .filter_map(|row| match row {
                        Value::Array(cells) => Some(cells),
                        _ => None,
                    })
                    .collect(),
            ),
            Some(Value::Object(_)) => Payload::Objects(
                rows.into_iter()
                    .filter_map(|row| match row {
                        Value::Object(fields) => Some(fields),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => Payload::Empty,
        }
    }

    /// Number of rows carried (a header row, if any, is still counted here)
    pub fn len(&self) -> usize {
        match self {
            Payload::Rows(rows) => rows.len(),
            Payload::Objects(rows) => rows.len(),
            Payload::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Canonical vehicle record produced by the normalizer
///
/// Invariant: every field is a trimmed string; absent source fields become
/// empty strings, never missing values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEntry {
    pub city: String,
    pub station: String,
    pub model: String,
    pub plate: String,
    pub status: String,
}
