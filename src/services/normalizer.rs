//! Row normalizer - heterogeneous tabular data to canonical entries
//!
//! The remote sheet has no fixed contract: rows arrive as positional cell
//! arrays (with or without a header row) or as keyed objects whose field
//! names drift between spellings. This module absorbs all of that and
//! produces trimmed-string `NormalizedEntry` records. It never errors;
//! malformed input degrades to empty fields or skipped rows.

use crate::domain::types::{NormalizedEntry, Payload};
use serde_json::{Map, Value};
use tracing::debug;

/// Column positions resolved from a detected header row
struct HeaderMap {
    city: usize,
    station: usize,
    model: usize,
    plate: usize,
    status: usize,
}

/// Coerce a JSON cell to a trimmed string; non-scalar cells become empty
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Inspect the first row as a candidate header.
///
/// Cells are lower-cased and tested for substring markers; the row counts as
/// a header only if at least the city and station markers are present.
fn detect_header(first: &[Value]) -> Option<HeaderMap> {
    let lower: Vec<String> = first.iter().map(|c| cell_text(c).to_lowercase()).collect();

    if !lower.iter().any(|c| c.contains("city")) || !lower.iter().any(|c| c.contains("station")) {
        return None;
    }

    // Positional defaults cover headers that name only some columns
    let mut map = HeaderMap { city: 0, station: 1, model: 2, plate: 3, status: 4 };
    for (i, col) in lower.iter().enumerate() {
        if col.contains("city") {
            map.city = i;
        } else if col.contains("station") {
            map.station = i;
        } else if col.contains("model") {
            map.model = i;
        } else if col.contains("plate") || col.contains("number") {
            map.plate = i;
        } else if col.contains("status") {
            map.status = i;
        }
    }
    Some(map)
}

fn cell_at(row: &[Value], index: usize) -> String {
    row.get(index).map(cell_text).unwrap_or_default()
}

fn normalize_cell_rows(rows: &[Vec<Value>]) -> Vec<NormalizedEntry> {
    let (header, data) = match rows.split_first() {
        Some((first, rest)) => match detect_header(first) {
            Some(map) => (Some(map), rest),
            None => (None, rows),
        },
        None => return Vec::new(),
    };

    data.iter()
        .map(|row| match &header {
            Some(map) => NormalizedEntry {
                city: cell_at(row, map.city),
                station: cell_at(row, map.station),
                model: cell_at(row, map.model),
                plate: cell_at(row, map.plate),
                status: cell_at(row, map.status),
            },
            None => {
                // Fixed layout: A=city, B=station, C=model, D=plate.
                // Status sits in column F, falling back to E when F is blank.
                let status_f = cell_at(row, 5);
                let status = if status_f.is_empty() { cell_at(row, 4) } else { status_f };
                NormalizedEntry {
                    city: cell_at(row, 0),
                    station: cell_at(row, 1),
                    model: cell_at(row, 2),
                    plate: cell_at(row, 3),
                    status,
                }
            }
        })
        .collect()
}

/// Resolve a field by trying key spellings in order; first present key wins
fn resolve_field(fields: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| fields.get(*key).filter(|v| !v.is_null()))
        .map(cell_text)
        .unwrap_or_default()
}

fn normalize_object_rows(rows: &[Map<String, Value>]) -> Vec<NormalizedEntry> {
    rows.iter()
        .map(|fields| NormalizedEntry {
            city: resolve_field(fields, &["city", "City", "city_name"]),
            station: resolve_field(fields, &["station", "Station", "station_name"]),
            model: resolve_field(fields, &["model", "Model", "car_model"]),
            plate: resolve_field(fields, &["plate", "Plate", "number", "Number"]),
            status: resolve_field(fields, &["status", "Status", "state"]),
        })
        .collect()
}

/// Normalize a resolved payload into canonical entries
pub fn normalize(payload: &Payload) -> Vec<NormalizedEntry> {
    let entries = match payload {
        Payload::Rows(rows) => normalize_cell_rows(rows),
        Payload::Objects(rows) => normalize_object_rows(rows),
        Payload::Empty => Vec::new(),
    };
    debug!(rows = payload.len(), entries = entries.len(), "payload_normalized");
    entries
}
