//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/dev.toml

use crate::domain::types::AreaSlug;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Policy for schedules sharing an interval on the same vehicle
///
/// The data source never rejected double-booking, so `Allow` is the default;
/// `Reject` is available for deployments that want the stricter rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    #[default]
    Allow,
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Query-string variants probed in order until one yields rows
    #[serde(default = "default_query_variants")]
    pub query_variants: Vec<String>,
    #[serde(default = "default_fetch_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            query_variants: default_query_variants(),
            timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

fn default_endpoint() -> String {
    "https://script.google.com/macros/s/example/exec".to_string()
}

fn default_query_variants() -> Vec<String> {
    // The sheet tab naming convention upstream is not settled; probe the
    // plausible spellings before falling back to the bare pull action.
    [
        "action=pullInspectionlog",
        "action=pullinspectionlog",
        "action=pull_inspectionlog",
        "action=pullLog",
        "action=inspectionlog",
        "action=pull&sheet=inspectionlog",
        "action=pull&tab=inspectionlog",
        "sheet=inspectionlog",
        "tab=inspectionlog",
        "action=pull",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct AreasConfig {
    /// City name → area slug, as spelled in the remote sheet
    #[serde(default = "default_cities")]
    pub cities: HashMap<String, String>,
}

impl Default for AreasConfig {
    fn default() -> Self {
        Self { cities: default_cities() }
    }
}

fn default_cities() -> HashMap<String, String> {
    let mut cities = HashMap::new();
    cities.insert("大和市".to_string(), "yamato".to_string());
    cities.insert("海老名市".to_string(), "ebina".to_string());
    cities.insert("調布市".to_string(), "chofu".to_string());
    cities
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,
    #[serde(default = "default_slot_width_px")]
    pub slot_width_px: f64,
    #[serde(default = "default_total_hours")]
    pub total_hours: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            slot_minutes: default_slot_minutes(),
            slot_width_px: default_slot_width_px(),
            total_hours: default_total_hours(),
        }
    }
}

fn default_slot_minutes() -> u32 {
    15
}

fn default_slot_width_px() -> f64 {
    25.0
}

fn default_total_hours() -> u32 {
    72
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { dir: default_cache_dir() }
    }
}

fn default_cache_dir() -> String {
    "cache".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub overlap_policy: OverlapPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub areas: AreasConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    endpoint: String,
    query_variants: Vec<String>,
    fetch_timeout_ms: u64,
    city_to_area: HashMap<String, AreaSlug>,
    slot_minutes: u32,
    slot_width_px: f64,
    total_hours: u32,
    cache_dir: String,
    overlap_policy: OverlapPolicy,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default_sections(), "default".to_string())
    }
}

impl TomlConfig {
    fn default_sections() -> Self {
        Self {
            source: SourceConfig::default(),
            areas: AreasConfig::default(),
            timeline: TimelineConfig::default(),
            cache: CacheConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Config {
    fn from_toml(toml_config: TomlConfig, config_file: String) -> Self {
        // Slug values that don't name a known area are dropped with a warning
        let mut city_to_area = HashMap::new();
        for (city, slug) in toml_config.areas.cities {
            match slug.parse::<AreaSlug>() {
                Ok(area) => {
                    city_to_area.insert(city, area);
                }
                Err(e) => {
                    tracing::warn!(city = %city, error = %e, "config_area_dropped");
                }
            }
        }

        Self {
            endpoint: toml_config.source.endpoint,
            query_variants: toml_config.source.query_variants,
            fetch_timeout_ms: toml_config.source.timeout_ms,
            city_to_area,
            slot_minutes: toml_config.timeline.slot_minutes.max(1),
            slot_width_px: toml_config.timeline.slot_width_px,
            total_hours: toml_config.timeline.total_hours,
            cache_dir: toml_config.cache.dir,
            overlap_policy: toml_config.schedule.overlap_policy,
            config_file,
        }
    }

    /// Config file path when none is given on the command line:
    /// CONFIG_FILE environment variable, else config/dev.toml
    pub fn default_config_path() -> String {
        env::var("CONFIG_FILE").unwrap_or_else(|_| "config/dev.toml".to_string())
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self::from_toml(toml_config, path.display().to_string()))
    }

    /// Load configuration - tries the TOML file first, falls back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "config_load_failed_using_defaults");
                Self::default()
            }
        }
    }

    /// Map a city name from the remote sheet to its area, if covered
    pub fn area_for_city(&self, city: &str) -> Option<AreaSlug> {
        self.city_to_area.get(city).copied()
    }

    /// Display label for an area - the city name it maps from, or the slug
    pub fn area_label(&self, area: AreaSlug) -> String {
        self.city_to_area
            .iter()
            .find(|(_, slug)| **slug == area)
            .map(|(city, _)| city.clone())
            .unwrap_or_else(|| area.as_str().to_string())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn query_variants(&self) -> &[String] {
        &self.query_variants
    }

    pub fn fetch_timeout_ms(&self) -> u64 {
        self.fetch_timeout_ms
    }

    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    pub fn slot_width_px(&self) -> f64 {
        self.slot_width_px
    }

    pub fn total_hours(&self) -> u32 {
        self.total_hours
    }

    /// Slot count over the whole timeline - constant for a given config
    pub fn total_slots(&self) -> u32 {
        self.total_hours * 60 / self.slot_minutes
    }

    pub fn cache_dir(&self) -> &str {
        &self.cache_dir
    }

    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.overlap_policy
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.slot_minutes(), 15);
        assert_eq!(config.slot_width_px(), 25.0);
        assert_eq!(config.total_hours(), 72);
        assert_eq!(config.total_slots(), 288);
        assert_eq!(config.overlap_policy(), OverlapPolicy::Allow);
        assert_eq!(config.query_variants().len(), 10);
        assert_eq!(config.query_variants()[0], "action=pullInspectionlog");
        assert_eq!(config.query_variants().last().unwrap(), "action=pull");
    }

    #[test]
    fn test_area_for_city() {
        let config = Config::default();
        assert_eq!(config.area_for_city("大和市"), Some(AreaSlug::Yamato));
        assert_eq!(config.area_for_city("海老名市"), Some(AreaSlug::Ebina));
        assert_eq!(config.area_for_city("調布市"), Some(AreaSlug::Chofu));
        assert_eq!(config.area_for_city("横浜市"), None);
    }

    #[test]
    fn test_area_label() {
        let config = Config::default();
        assert_eq!(config.area_label(AreaSlug::Yamato), "大和市");
    }

    #[test]
    fn test_default_config_path_env_override() {
        // Single test owns the variable so parallel runs don't race on it
        env::remove_var("CONFIG_FILE");
        assert_eq!(Config::default_config_path(), "config/dev.toml");
        env::set_var("CONFIG_FILE", "config/prod.toml");
        assert_eq!(Config::default_config_path(), "config/prod.toml");
        env::remove_var("CONFIG_FILE");
    }

    #[test]
    fn test_bad_area_slug_dropped() {
        let mut toml_config = TomlConfig::default_sections();
        toml_config.areas.cities.insert("横浜市".to_string(), "yokohama".to_string());
        let config = Config::from_toml(toml_config, "test".to_string());
        assert_eq!(config.area_for_city("横浜市"), None);
        assert_eq!(config.area_for_city("大和市"), Some(AreaSlug::Yamato));
    }
}
