//! Domain models - core business types
//!
//! This module contains the canonical data types used throughout the system:
//! - `Payload` - remote tabular payload resolved into a closed shape
//! - `NormalizedEntry` - canonical vehicle record after normalization
//! - `AreaSlug` - identifier for one of the covered municipalities
//! - `Vehicle` / `Schedule` - the per-area reservation model

pub mod types;
pub mod vehicle;

// Re-export commonly used types at module level
pub use types::{AreaSlug, NormalizedEntry, Payload, ScheduleId, VehicleId};
pub use vehicle::{parse_timestamp, Schedule, Vehicle};
