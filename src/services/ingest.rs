//! Ingestion orchestration - fetch, normalize, classify, cache
//!
//! One `Ingestor` owns the whole pipeline from the remote endpoint to the
//! per-area cache. Ingestion cycles are serialized per area: at most one
//! fetch is in progress for an area, and concurrent callers wait for the
//! in-flight cycle and then read its result from the cache instead of
//! starting a second fetch.

use crate::domain::types::AreaSlug;
use crate::domain::vehicle::Vehicle;
use crate::infra::config::Config;
use crate::io::cache::VehicleCache;
use crate::io::source::{self, PayloadSource};
use crate::services::classifier::classify;
use crate::services::normalizer::normalize;
use crate::services::store::AreaBoard;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Placeholder vehicles shown when an area has no data at all
const PLACEHOLDER_COUNT: usize = 3;

pub struct Ingestor {
    config: Arc<Config>,
    source: Arc<dyn PayloadSource>,
    cache: VehicleCache,
    inflight: BTreeMap<AreaSlug, Mutex<()>>,
}

impl Ingestor {
    pub fn new(config: Arc<Config>, source: Arc<dyn PayloadSource>) -> Self {
        let cache = VehicleCache::new(config.cache_dir());
        let inflight = AreaSlug::ALL.iter().map(|slug| (*slug, Mutex::new(()))).collect();
        Self { config, source, cache, inflight }
    }

    /// Run one full fetch→normalize→classify cycle
    async fn fetch_classified(&self) -> BTreeMap<AreaSlug, Vec<Vehicle>> {
        let payload = source::probe(self.source.as_ref(), self.config.query_variants()).await;
        let entries = normalize(&payload);
        classify(&entries, &self.config)
    }

    async fn area_guard(&self, slug: AreaSlug) -> Option<tokio::sync::MutexGuard<'_, ()>> {
        match self.inflight.get(&slug) {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }

    fn store_area(&self, slug: AreaSlug, vehicles: &[Vehicle]) {
        if let Err(e) = self.cache.store(slug, vehicles) {
            error!(area = %slug, error = %e, "cache_write_failed");
        }
    }

    /// Refresh every area from the remote source; returns per-area counts
    pub async fn refresh(&self) -> BTreeMap<AreaSlug, usize> {
        let areas = self.fetch_classified().await;
        for (slug, vehicles) in &areas {
            // Writes to an area's cache key happen only under that area's
            // guard, so a refresh never interleaves with an in-flight
            // `load_area` cycle for the same area
            let _guard = self.area_guard(*slug).await;
            self.store_area(*slug, vehicles);
        }

        let counts: BTreeMap<AreaSlug, usize> =
            areas.iter().map(|(slug, vehicles)| (*slug, vehicles.len())).collect();
        info!(?counts, "areas_refreshed");
        counts
    }

    /// Load one area's vehicles: cache first, re-fetch on miss, placeholder
    /// vehicles as the last resort.
    ///
    /// Placeholders are display-only and never written to the cache.
    pub async fn load_area(&self, slug: AreaSlug) -> Vec<Vehicle> {
        // Serialize ingestion per area; a waiting caller re-reads the cache
        // the in-flight cycle just filled
        let _guard = self.area_guard(slug).await;

        let cached = self.cache.load(slug);
        if !cached.is_empty() {
            return cached;
        }

        // The fetch classifies every area, but only the triggering area's
        // key is written back; this guard covers no other key, and a slow
        // cycle here must not clobber fresher writes elsewhere
        let mut areas = self.fetch_classified().await;
        let vehicles = areas.remove(&slug).unwrap_or_default();
        if !vehicles.is_empty() {
            self.store_area(slug, &vehicles);
            return vehicles;
        }

        warn!(area = %slug, "area_empty_using_placeholders");
        let label = self.config.area_label(slug);
        (1..=PLACEHOLDER_COUNT).map(|i| Vehicle::new(format!("{label} - {i}号車"))).collect()
    }

    /// Load an area into a mutable board for CRUD
    pub async fn board(&self, slug: AreaSlug) -> AreaBoard {
        let vehicles = self.load_area(slug).await;
        AreaBoard::new(slug, vehicles, self.config.overlap_policy())
    }

    /// Persist a board after mutations
    pub fn save_board(&self, board: AreaBoard) -> anyhow::Result<()> {
        let slug = board.area();
        self.cache.store(slug, &board.into_vehicles())
    }
}
