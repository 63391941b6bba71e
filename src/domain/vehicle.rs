//! Vehicle and reservation schedule data model

use crate::domain::types::{ScheduleId, VehicleId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Storage format for schedule endpoints - timezone-naive, round-trippable
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Display format for schedule selection labels
const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse a user-editable datetime string.
///
/// Accepts the stored form plus the minute-precision variants that datetime
/// form inputs produce (`2024-01-01T10:00`, with `T` or space separator).
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    const ACCEPTED: [&str; 4] =
        ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

    let text = text.trim();
    ACCEPTED.iter().find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&dt.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(de)?;
        super::parse_timestamp(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {text}")))
    }
}

/// One reservation window on a vehicle's timeline
///
/// Invariant: `start < end` strictly. Enforced by the store at mutation time;
/// a schedule is never stored violated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub id: ScheduleId,
    #[serde(with = "timestamp")]
    pub start: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub end: NaiveDateTime,
}

impl Schedule {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { id: ScheduleId::new(), start, end }
    }

    /// Selection-control label, index-ordered by the caller
    pub fn label(&self) -> String {
        format!("{} – {}", self.start.format(LABEL_FORMAT), self.end.format(LABEL_FORMAT))
    }

    /// True if this window shares any instant with `[start, end)`
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && start < self.end
    }
}

/// A fleet vehicle and its reservation windows
///
/// `schedules` keeps insertion order, not time order - the display collaborator
/// relies on positions staying put through edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(default)]
    pub id: VehicleId,
    pub name: String,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

impl Vehicle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: VehicleId::new(), name: name.into(), schedules: Vec::new() }
    }

    /// Display label composed from station, model and plate
    pub fn display_name(station: &str, model: &str, plate: &str) -> String {
        format!("{station} - {model} - {plate}")
    }
}
