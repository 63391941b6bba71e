//! IO modules - external system interfaces
//!
//! This module contains all external IO operations:
//! - `source` - HTTP fetch boundary for the spreadsheet-backed endpoint
//! - `cache` - local key→JSON persistence bridge for per-area vehicle lists

pub mod cache;
pub mod source;

// Re-export commonly used types
pub use cache::VehicleCache;
pub use source::{HttpSource, PayloadSource};
