// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! Persistent settings stored as TOML through `confy`: where the location
//! data comes from, which tile server renders the base map, the initial view
//! and how "my location" is resolved. Missing keys fall back to defaults so
//! older config files keep loading.

use serde::{Deserialize, Serialize};

const APP_NAME: &str = "poi-map";
const CONFIG_NAME: &str = "config";

/// Default location data, relative to the working directory
pub const DEFAULT_DATA_SOURCE: &str = "data/locations.json";

/// Default tile URL template (`{s}` subdomain, `{z}`/`{x}`/`{y}` tile id)
pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Configuration schema version
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Path or http(s) URL of the location JSON
    #[serde(default = "default_data_source")]
    pub data_source: String,

    /// Tile URL template
    #[serde(default = "default_tile_url")]
    pub tile_url: String,

    /// Values substituted for `{s}` in the tile URL, rotated per tile
    #[serde(default = "default_tile_subdomains")]
    pub tile_subdomains: Vec<String>,

    /// Attribution text shown on the map
    #[serde(default = "default_tile_attribution")]
    pub tile_attribution: String,

    /// Attribution link
    #[serde(default = "default_tile_attribution_url")]
    pub tile_attribution_url: String,

    /// Highest zoom level the tile server provides
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,

    /// Map center before the data set is fitted
    #[serde(default = "default_initial_latitude")]
    pub initial_latitude: f64,

    #[serde(default = "default_initial_longitude")]
    pub initial_longitude: f64,

    /// Zoom before the data set is fitted
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: f64,

    /// Sidebar width in pixels
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width: f32,

    /// Fixed latitude reported by "my location" (for devices without location services)
    #[serde(default)]
    pub override_latitude: Option<f64>,

    /// Fixed longitude reported by "my location"
    #[serde(default)]
    pub override_longitude: Option<f64>,

    /// Fall back to IP-based lookup when platform location services are missing
    #[serde(default = "default_true")]
    pub ip_geolocation: bool,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_data_source() -> String {
    DEFAULT_DATA_SOURCE.to_string()
}

fn default_tile_url() -> String {
    DEFAULT_TILE_URL.to_string()
}

fn default_tile_subdomains() -> Vec<String> {
    vec!["a".to_string(), "b".to_string(), "c".to_string()]
}

fn default_tile_attribution() -> String {
    "© OpenStreetMap contributors".to_string()
}

fn default_tile_attribution_url() -> String {
    "https://www.openstreetmap.org/copyright".to_string()
}

fn default_max_zoom() -> u8 {
    19
}

fn default_initial_latitude() -> f64 {
    40.7128
}

fn default_initial_longitude() -> f64 {
    -74.0060
}

fn default_initial_zoom() -> f64 {
    12.0
}

fn default_sidebar_width() -> f32 {
    320.0
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            data_source: default_data_source(),
            tile_url: default_tile_url(),
            tile_subdomains: default_tile_subdomains(),
            tile_attribution: default_tile_attribution(),
            tile_attribution_url: default_tile_attribution_url(),
            max_zoom: default_max_zoom(),
            initial_latitude: default_initial_latitude(),
            initial_longitude: default_initial_longitude(),
            initial_zoom: default_initial_zoom(),
            sidebar_width: default_sidebar_width(),
            override_latitude: None,
            override_longitude: None,
            ip_geolocation: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults on first run
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Fixed location override, only when both coordinates are set
    pub fn location_override(&self) -> Option<(f64, f64)> {
        self.override_latitude.zip(self.override_longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.data_source, "data/locations.json");
        assert_eq!(config.max_zoom, 19);
        assert!(config.ip_geolocation);
        assert!(config.location_override().is_none());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"data_source": "https://example.com/places.json"}"#).unwrap();
        assert_eq!(config.data_source, "https://example.com/places.json");
        assert_eq!(config.tile_url, DEFAULT_TILE_URL);
        assert_eq!(config.tile_subdomains.len(), 3);
        assert!((config.sidebar_width - 320.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_override_needs_both_coordinates() {
        let mut config = AppConfig {
            override_latitude: Some(51.5),
            ..Default::default()
        };
        assert!(config.location_override().is_none());
        config.override_longitude = Some(-0.12);
        assert_eq!(config.location_override(), Some((51.5, -0.12)));
    }
}
