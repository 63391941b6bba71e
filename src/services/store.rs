//! Vehicle/schedule store - one area's reservation model with validated CRUD
//!
//! The board owns the vehicle list for a single area. Vehicles and schedules
//! are addressed by their stable ids; display-position accessors map the
//! selection-control indices back to ids so a caller holding an index from a
//! stale list cannot silently mutate the wrong entity.

use crate::domain::types::{AreaSlug, ScheduleId, VehicleId};
use crate::domain::vehicle::{parse_timestamp, Schedule, Vehicle};
use crate::infra::config::OverlapPolicy;
use chrono::NaiveDateTime;
use tracing::{debug, info};

/// Errors surfaced by schedule mutations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// User-facing validation failure; the mutation did not happen
    #[error("{0}")]
    Validation(String),
    /// Vehicle or schedule id not present; indicates a stale caller
    #[error("vehicle or schedule not found")]
    NotFound,
}

pub struct AreaBoard {
    area: AreaSlug,
    vehicles: Vec<Vehicle>,
    overlap_policy: OverlapPolicy,
}

impl AreaBoard {
    pub fn new(area: AreaSlug, vehicles: Vec<Vehicle>, overlap_policy: OverlapPolicy) -> Self {
        Self { area, vehicles, overlap_policy }
    }

    pub fn area(&self) -> AreaSlug {
        self.area
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Consume the board for persistence
    pub fn into_vehicles(self) -> Vec<Vehicle> {
        self.vehicles
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    fn vehicle_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }

    /// Map a display position to the vehicle id at that position
    pub fn vehicle_at(&self, index: usize) -> Option<VehicleId> {
        self.vehicles.get(index).map(|v| v.id)
    }

    /// Map a display position within a vehicle's list to a schedule id
    pub fn schedule_at(&self, vehicle: VehicleId, index: usize) -> Option<ScheduleId> {
        self.vehicle(vehicle)?.schedules.get(index).map(|s| s.id)
    }

    /// Selection-control labels for a vehicle's schedules, insertion-ordered
    pub fn schedule_labels(&self, vehicle: VehicleId) -> Vec<String> {
        self.vehicle(vehicle)
            .map(|v| v.schedules.iter().map(Schedule::label).collect())
            .unwrap_or_default()
    }

    /// Parse and validate a start/end pair
    fn validate_window(
        start_text: &str,
        end_text: &str,
    ) -> Result<(NaiveDateTime, NaiveDateTime), ScheduleError> {
        if start_text.trim().is_empty() || end_text.trim().is_empty() {
            return Err(ScheduleError::Validation("start and end are required".to_string()));
        }
        let start = parse_timestamp(start_text)
            .ok_or_else(|| ScheduleError::Validation(format!("invalid start: {start_text}")))?;
        let end = parse_timestamp(end_text)
            .ok_or_else(|| ScheduleError::Validation(format!("invalid end: {end_text}")))?;
        // Strict: equal instants are rejected too
        if start >= end {
            return Err(ScheduleError::Validation("end must be after start".to_string()));
        }
        Ok((start, end))
    }

    /// Overlap check under the configured policy; `skip` exempts the schedule
    /// being edited
    fn check_overlap(
        &self,
        vehicle: &Vehicle,
        start: NaiveDateTime,
        end: NaiveDateTime,
        skip: Option<ScheduleId>,
    ) -> Result<(), ScheduleError> {
        if self.overlap_policy == OverlapPolicy::Allow {
            return Ok(());
        }
        let conflict = vehicle
            .schedules
            .iter()
            .filter(|s| Some(s.id) != skip)
            .any(|s| s.overlaps(start, end));
        if conflict {
            return Err(ScheduleError::Validation(
                "window overlaps an existing schedule".to_string(),
            ));
        }
        Ok(())
    }

    /// Append a new schedule to a vehicle
    pub fn add_schedule(
        &mut self,
        vehicle: VehicleId,
        start_text: &str,
        end_text: &str,
    ) -> Result<ScheduleId, ScheduleError> {
        let (start, end) = Self::validate_window(start_text, end_text)?;

        let target = self.vehicle(vehicle).ok_or(ScheduleError::NotFound)?;
        self.check_overlap(target, start, end, None)?;

        let schedule = Schedule::new(start, end);
        let id = schedule.id;
        // vehicle was found above; the second lookup cannot fail
        if let Some(target) = self.vehicle_mut(vehicle) {
            target.schedules.push(schedule);
        }

        info!(area = %self.area, vehicle = %vehicle, schedule = %id, "schedule_added");
        Ok(id)
    }

    /// Overwrite an existing schedule's window in place, preserving its
    /// position in the sequence
    pub fn edit_schedule(
        &mut self,
        vehicle: VehicleId,
        schedule: ScheduleId,
        start_text: &str,
        end_text: &str,
    ) -> Result<(), ScheduleError> {
        let (start, end) = Self::validate_window(start_text, end_text)?;

        let target = self.vehicle(vehicle).ok_or(ScheduleError::NotFound)?;
        if !target.schedules.iter().any(|s| s.id == schedule) {
            return Err(ScheduleError::NotFound);
        }
        self.check_overlap(target, start, end, Some(schedule))?;

        if let Some(target) = self.vehicle_mut(vehicle) {
            if let Some(entry) = target.schedules.iter_mut().find(|s| s.id == schedule) {
                entry.start = start;
                entry.end = end;
            }
        }

        info!(area = %self.area, vehicle = %vehicle, schedule = %schedule, "schedule_edited");
        Ok(())
    }

    /// Remove a schedule; unknown ids are a silent no-op.
    ///
    /// Returns whether anything was removed. Later display positions shift
    /// down by one, which is why callers hold ids rather than indices.
    pub fn delete_schedule(&mut self, vehicle: VehicleId, schedule: ScheduleId) -> bool {
        let Some(target) = self.vehicle_mut(vehicle) else {
            debug!(vehicle = %vehicle, "delete_unknown_vehicle");
            return false;
        };
        let before = target.schedules.len();
        target.schedules.retain(|s| s.id != schedule);
        let removed = target.schedules.len() < before;

        if removed {
            info!(area = %self.area, vehicle = %vehicle, schedule = %schedule, "schedule_deleted");
        } else {
            debug!(vehicle = %vehicle, schedule = %schedule, "delete_unknown_schedule");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with_vehicle() -> (AreaBoard, VehicleId) {
        let vehicle = Vehicle::new("A駅 - X - AA-1");
        let id = vehicle.id;
        (AreaBoard::new(AreaSlug::Yamato, vec![vehicle], OverlapPolicy::Allow), id)
    }

    #[test]
    fn test_add_schedule() {
        let (mut board, vehicle) = board_with_vehicle();
        let id = board.add_schedule(vehicle, "2024-01-01T10:00", "2024-01-01T12:00").unwrap();

        let schedules = &board.vehicle(vehicle).unwrap().schedules;
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].id, id);
    }

    #[test]
    fn test_add_rejects_reversed_window() {
        let (mut board, vehicle) = board_with_vehicle();
        let err = board.add_schedule(vehicle, "2024-01-01T10:00", "2024-01-01T09:00").unwrap_err();
        assert!(matches!(err, ScheduleError::Validation(_)));
        // Length invariant: the failed mutation left nothing behind
        assert!(board.vehicle(vehicle).unwrap().schedules.is_empty());
    }

    #[test]
    fn test_add_rejects_equal_instants() {
        let (mut board, vehicle) = board_with_vehicle();
        let err = board.add_schedule(vehicle, "2024-01-01T10:00", "2024-01-01T10:00").unwrap_err();
        assert!(matches!(err, ScheduleError::Validation(_)));
    }

    #[test]
    fn test_add_rejects_unparseable_and_missing() {
        let (mut board, vehicle) = board_with_vehicle();
        assert!(matches!(
            board.add_schedule(vehicle, "soon", "2024-01-01T10:00"),
            Err(ScheduleError::Validation(_))
        ));
        assert!(matches!(
            board.add_schedule(vehicle, "", "2024-01-01T10:00"),
            Err(ScheduleError::Validation(_))
        ));
    }

    #[test]
    fn test_add_unknown_vehicle() {
        let (mut board, _) = board_with_vehicle();
        let err = board
            .add_schedule(VehicleId::new(), "2024-01-01T10:00", "2024-01-01T12:00")
            .unwrap_err();
        assert_eq!(err, ScheduleError::NotFound);
    }

    #[test]
    fn test_edit_overwrites_in_place() {
        let (mut board, vehicle) = board_with_vehicle();
        let first = board.add_schedule(vehicle, "2024-01-01T08:00", "2024-01-01T09:00").unwrap();
        let second = board.add_schedule(vehicle, "2024-01-02T08:00", "2024-01-02T09:00").unwrap();

        board.edit_schedule(vehicle, first, "2024-01-01T10:00", "2024-01-01T11:30").unwrap();

        let schedules = &board.vehicle(vehicle).unwrap().schedules;
        // Position and id preserved
        assert_eq!(schedules[0].id, first);
        assert_eq!(schedules[0].start, parse_timestamp("2024-01-01T10:00").unwrap());
        assert_eq!(schedules[1].id, second);
    }

    #[test]
    fn test_edit_unknown_schedule_is_not_found_without_mutation() {
        let (mut board, vehicle) = board_with_vehicle();
        board.add_schedule(vehicle, "2024-01-01T08:00", "2024-01-01T09:00").unwrap();

        let err = board
            .edit_schedule(vehicle, ScheduleId::new(), "2024-01-01T10:00", "2024-01-01T11:00")
            .unwrap_err();
        assert_eq!(err, ScheduleError::NotFound);

        let schedules = &board.vehicle(vehicle).unwrap().schedules;
        assert_eq!(schedules[0].start, parse_timestamp("2024-01-01T08:00").unwrap());
    }

    #[test]
    fn test_edit_validates_before_lookup() {
        let (mut board, vehicle) = board_with_vehicle();
        let err = board
            .edit_schedule(vehicle, ScheduleId::new(), "2024-01-01T10:00", "2024-01-01T09:00")
            .unwrap_err();
        assert!(matches!(err, ScheduleError::Validation(_)));
    }

    #[test]
    fn test_delete_shifts_later_positions_down() {
        let (mut board, vehicle) = board_with_vehicle();
        let first = board.add_schedule(vehicle, "2024-01-01T08:00", "2024-01-01T09:00").unwrap();
        let second = board.add_schedule(vehicle, "2024-01-02T08:00", "2024-01-02T09:00").unwrap();

        assert!(board.delete_schedule(vehicle, first));

        let schedules = &board.vehicle(vehicle).unwrap().schedules;
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].id, second);
        assert_eq!(board.schedule_at(vehicle, 0), Some(second));
    }

    #[test]
    fn test_delete_unknown_is_silent_noop() {
        let (mut board, vehicle) = board_with_vehicle();
        board.add_schedule(vehicle, "2024-01-01T08:00", "2024-01-01T09:00").unwrap();

        assert!(!board.delete_schedule(vehicle, ScheduleId::new()));
        assert!(!board.delete_schedule(VehicleId::new(), ScheduleId::new()));
        assert_eq!(board.vehicle(vehicle).unwrap().schedules.len(), 1);
    }

    #[test]
    fn test_overlap_allowed_by_default() {
        let (mut board, vehicle) = board_with_vehicle();
        board.add_schedule(vehicle, "2024-01-01T10:00", "2024-01-01T12:00").unwrap();
        // Identical window is accepted input, not an error
        board.add_schedule(vehicle, "2024-01-01T10:00", "2024-01-01T12:00").unwrap();
        assert_eq!(board.vehicle(vehicle).unwrap().schedules.len(), 2);
    }

    #[test]
    fn test_overlap_rejected_under_strict_policy() {
        let vehicle = Vehicle::new("A駅 - X - AA-1");
        let id = vehicle.id;
        let mut board = AreaBoard::new(AreaSlug::Yamato, vec![vehicle], OverlapPolicy::Reject);

        board.add_schedule(id, "2024-01-01T10:00", "2024-01-01T12:00").unwrap();
        let err = board.add_schedule(id, "2024-01-01T11:00", "2024-01-01T13:00").unwrap_err();
        assert!(matches!(err, ScheduleError::Validation(_)));

        // Editing a schedule against itself is fine
        let schedule = board.schedule_at(id, 0).unwrap();
        board.edit_schedule(id, schedule, "2024-01-01T10:30", "2024-01-01T12:30").unwrap();
    }

    #[test]
    fn test_index_accessors() {
        let (mut board, vehicle) = board_with_vehicle();
        let first = board.add_schedule(vehicle, "2024-01-01T08:00", "2024-01-01T09:00").unwrap();

        assert_eq!(board.vehicle_at(0), Some(vehicle));
        assert_eq!(board.vehicle_at(1), None);
        assert_eq!(board.schedule_at(vehicle, 0), Some(first));
        assert_eq!(board.schedule_at(vehicle, 1), None);
    }

    #[test]
    fn test_schedule_labels() {
        let (mut board, vehicle) = board_with_vehicle();
        board.add_schedule(vehicle, "2024-01-01T10:00", "2024-01-01T12:30").unwrap();
        let labels = board.schedule_labels(vehicle);
        assert_eq!(labels, vec!["2024-01-01 10:00 – 2024-01-01 12:30".to_string()]);
    }
}
