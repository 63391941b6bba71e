//! Services - business logic and state management
//!
//! This module contains the core pipeline and model services:
//! - `normalizer` - heterogeneous payload rows to canonical entries
//! - `classifier` - status filter and city→area mapping
//! - `store` - per-area vehicle/schedule model with validated CRUD
//! - `layout` - reservation intervals to timeline pixel geometry
//! - `ingest` - fetch/normalize/classify orchestration and cache fill

pub mod classifier;
pub mod ingest;
pub mod layout;
pub mod normalizer;
pub mod store;

// Re-export commonly used types
pub use ingest::Ingestor;
pub use layout::{layout, BarGeometry, BufferRect, LayoutConfig};
pub use store::{AreaBoard, ScheduleError};
