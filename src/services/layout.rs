//! Timeline layout engine - reservation intervals to pixel geometry
//!
//! The timeline is a fixed horizontal band: `total_hours` of wall-clock time
//! discretized into fixed-size slots, each rendered at a constant pixel
//! width. Pixel position is linear in elapsed time from the reference day
//! start; nothing here snaps to slot boundaries or clips to the visible
//! band - out-of-window schedules produce negative offsets or overflowing
//! widths and the rendering collaborator decides what to do with them.

use crate::domain::vehicle::Schedule;
use crate::infra::config::Config;
use chrono::{Local, NaiveDateTime, NaiveTime};

/// Fixed timeline scale derived from configuration
#[derive(Debug, Clone, Copy)]
pub struct LayoutConfig {
    slot_minutes: u32,
    slot_width_px: f64,
    total_slots: u32,
}

impl LayoutConfig {
    pub fn new(slot_minutes: u32, slot_width_px: f64, total_hours: u32) -> Self {
        let slot_minutes = slot_minutes.max(1);
        Self { slot_minutes, slot_width_px, total_slots: total_hours * 60 / slot_minutes }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.slot_minutes(), config.slot_width_px(), config.total_hours())
    }

    pub fn slot_width_px(&self) -> f64 {
        self.slot_width_px
    }

    /// Total band width - constant, independent of content
    pub fn timeline_width_px(&self) -> f64 {
        f64::from(self.total_slots) * self.slot_width_px
    }

    fn px_per_minute(&self) -> f64 {
        self.slot_width_px / f64::from(self.slot_minutes)
    }
}

/// A buffer rectangle adjacent to a reservation bar - visual spacing only,
/// not a reservation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferRect {
    pub left_px: f64,
    pub width_px: f64,
}

/// Pixel geometry for one schedule on the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct BarGeometry {
    pub bar_left_px: f64,
    pub bar_width_px: f64,
    pub buffer_before: Option<BufferRect>,
    pub buffer_after: Option<BufferRect>,
}

/// Reference day start: local midnight of the current moment
pub fn local_day_start() -> NaiveDateTime {
    Local::now().date_naive().and_time(NaiveTime::MIN)
}

/// Compute bar and buffer geometry for one schedule.
///
/// Buffers are one slot wide, placed immediately before and after the bar,
/// and emitted only when they fall fully inside the band. They are computed
/// per schedule; adjacent schedules' buffers are never merged.
pub fn layout(schedule: &Schedule, day_start: NaiveDateTime, config: &LayoutConfig) -> BarGeometry {
    let px_per_minute = config.px_per_minute();
    let start_minutes = (schedule.start - day_start).num_seconds() as f64 / 60.0;
    let end_minutes = (schedule.end - day_start).num_seconds() as f64 / 60.0;

    let bar_left_px = start_minutes * px_per_minute;
    let bar_width_px = (end_minutes - start_minutes) * px_per_minute;

    let buffer_width = config.slot_width_px();
    let timeline_width = config.timeline_width_px();

    let buffer_before = (bar_left_px - buffer_width >= 0.0)
        .then_some(BufferRect { left_px: bar_left_px - buffer_width, width_px: buffer_width });

    let buffer_after = (bar_left_px + bar_width_px + buffer_width <= timeline_width)
        .then_some(BufferRect { left_px: bar_left_px + bar_width_px, width_px: buffer_width });

    BarGeometry { bar_left_px, bar_width_px, buffer_before, buffer_after }
}
