//! Area classifier - status filter and city→area mapping
//!
//! Turns normalized entries into per-area vehicle lists. Only entries whose
//! status is "standby" (case-insensitive) qualify; entries from cities
//! outside the covered areas are dropped silently.

use crate::domain::types::{AreaSlug, NormalizedEntry};
use crate::domain::vehicle::Vehicle;
use crate::infra::config::Config;
use std::collections::BTreeMap;
use tracing::debug;

/// The one status value that qualifies a record for display
const QUALIFYING_STATUS: &str = "standby";

/// Classify entries into per-area vehicle lists.
///
/// Every known area is present in the result, empty or not, so consumers
/// never deal with a missing key. Ordering within an area is stable with
/// respect to the input.
pub fn classify(entries: &[NormalizedEntry], config: &Config) -> BTreeMap<AreaSlug, Vec<Vehicle>> {
    let mut areas: BTreeMap<AreaSlug, Vec<Vehicle>> =
        AreaSlug::ALL.iter().map(|slug| (*slug, Vec::new())).collect();

    let mut dropped = 0usize;
    for entry in entries {
        if !entry.status.trim().eq_ignore_ascii_case(QUALIFYING_STATUS) {
            dropped += 1;
            continue;
        }

        let Some(slug) = config.area_for_city(entry.city.trim()) else {
            dropped += 1;
            continue;
        };

        let name = Vehicle::display_name(&entry.station, &entry.model, &entry.plate);
        if let Some(vehicles) = areas.get_mut(&slug) {
            vehicles.push(Vehicle::new(name));
        }
    }

    debug!(
        entries = entries.len(),
        dropped = dropped,
        vehicles = areas.values().map(Vec::len).sum::<usize>(),
        "entries_classified"
    );
    areas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(city: &str, status: &str) -> NormalizedEntry {
        NormalizedEntry {
            city: city.to_string(),
            station: "A駅".to_string(),
            model: "X".to_string(),
            plate: "AA-1".to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_standby_entry_classified() {
        let config = Config::default();
        let areas = classify(&[entry("大和市", "standby")], &config);

        assert_eq!(areas[&AreaSlug::Yamato].len(), 1);
        assert_eq!(areas[&AreaSlug::Yamato][0].name, "A駅 - X - AA-1");
        assert!(areas[&AreaSlug::Yamato][0].schedules.is_empty());
    }

    #[test]
    fn test_status_filter_case_variants() {
        let config = Config::default();
        let entries = vec![
            entry("大和市", "Standby"),
            entry("大和市", " STANDBY "),
            entry("大和市", "standby"),
            entry("大和市", "in use"),
            entry("大和市", ""),
        ];
        let areas = classify(&entries, &config);
        assert_eq!(areas[&AreaSlug::Yamato].len(), 3);
    }

    #[test]
    fn test_unmapped_city_dropped() {
        let config = Config::default();
        let areas = classify(&[entry("横浜市", "standby")], &config);
        assert!(areas.values().all(Vec::is_empty));
    }

    #[test]
    fn test_all_areas_present_even_when_empty() {
        let config = Config::default();
        let areas = classify(&[], &config);
        assert_eq!(areas.len(), AreaSlug::ALL.len());
        assert!(areas.values().all(Vec::is_empty));
    }

    #[test]
    fn test_ordering_is_stable() {
        let config = Config::default();
        let mut entries = Vec::new();
        for i in 0..5 {
            let mut e = entry("海老名市", "standby");
            e.plate = format!("EB-{i}");
            entries.push(e);
        }
        let areas = classify(&entries, &config);
        let names: Vec<&str> = areas[&AreaSlug::Ebina].iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            ["A駅 - X - EB-0", "A駅 - X - EB-1", "A駅 - X - EB-2", "A駅 - X - EB-3", "A駅 - X - EB-4"]
        );
    }

    #[test]
    fn test_empty_fields_used_verbatim_in_name() {
        let config = Config::default();
        let mut e = entry("調布市", "standby");
        e.model = String::new();
        e.plate = String::new();
        let areas = classify(&[e], &config);
        assert_eq!(areas[&AreaSlug::Chofu][0].name, "A駅 -  - ");
    }
}
