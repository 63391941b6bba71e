//! Persistence bridge - per-area vehicle lists in a local key→JSON store
//!
//! Keys follow the `vehicles:<slug>` convention; each key is one JSON file
//! under the cache directory. Reads never fail: a missing key or a malformed
//! value degrades to an empty list so the ingestion path can rebuild it.

use crate::domain::types::AreaSlug;
use crate::domain::vehicle::Vehicle;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct VehicleCache {
    dir: PathBuf,
}

impl VehicleCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache key for an area's vehicle list
    pub fn key(area: AreaSlug) -> String {
        format!("vehicles:{area}")
    }

    fn path(&self, area: AreaSlug) -> PathBuf {
        self.dir.join(format!("{}.json", Self::key(area)))
    }

    /// Write an area's vehicle list, replacing any previous value
    pub fn store(&self, area: AreaSlug, vehicles: &[Vehicle]) -> anyhow::Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .with_context(|| format!("Failed to create cache dir {}", self.dir.display()))?;
        }

        let path = self.path(area);
        let json = serde_json::to_string(vehicles)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write cache file {}", path.display()))?;

        info!(area = %area, vehicles = vehicles.len(), "vehicles_cached");
        Ok(())
    }

    /// Read an area's vehicle list; any failure degrades to an empty list
    pub fn load(&self, area: AreaSlug) -> Vec<Vehicle> {
        let path = self.path(area);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!(area = %area, error = %e, "cache_miss");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Vehicle>>(&content) {
            Ok(vehicles) => {
                debug!(area = %area, vehicles = vehicles.len(), "cache_hit");
                vehicles
            }
            Err(e) => {
                warn!(area = %area, error = %e, "cache_malformed");
                Vec::new()
            }
        }
    }

    #[allow(dead_code)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
