use serde::Deserialize;
use std::path::PathBuf;

use crate::map::Filter;

/// Default search center: Kansas City, Missouri
pub const DEFAULT_CENTER: (f64, f64) = (39.0997, -94.5786);

/// Default search radius in meters (100km)
pub const DEFAULT_RADIUS_M: u32 = 100_000;

fn default_radius() -> u32 {
    DEFAULT_RADIUS_M
}
fn default_verbose() -> bool {
    false
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default = "default_radius")]
    pub radius: u32,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub filter: Option<Filter>,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub overpass: Option<OverpassConfig>,
}

fn default_overpass_urls() -> Vec<String> {
    vec![
        "https://overpass-api.de/api/interpreter".to_string(),
        "https://overpass.kumi.systems/api/interpreter".to_string(),
        "https://lz4.overpass-api.de/api/interpreter".to_string(),
    ]
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_backoff_ms() -> u64 {
    1200
}

fn default_backoff_jitter_ms() -> u64 {
    400
}

#[derive(Debug, Deserialize, Clone)]
pub struct OverpassConfig {
    /// Mirror list, tried in order
    #[serde(default = "default_overpass_urls")]
    pub urls: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Base wait after a 429 before moving to the next mirror
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Random extra wait on top of `backoff_ms`
    #[serde(default = "default_backoff_jitter_ms")]
    pub backoff_jitter_ms: u64,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            urls: default_overpass_urls(),
            timeout_secs: default_timeout_secs(),
            backoff_ms: default_backoff_ms(),
            backoff_jitter_ms: default_backoff_jitter_ms(),
        }
    }
}

impl FileConfig {
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("chapelmap.toml"));
    paths.push(PathBuf::from(".chapelmap.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("chapelmap").join("config.toml"));
        paths.push(config_dir.join("chapelmap.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".chapelmap.toml"));
        paths.push(home.join(".config").join("chapelmap").join("config.toml"));
    }

    paths
}
