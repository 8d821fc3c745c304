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

use walkers::sources::{Attribution, TileSource};
use walkers::TileId;

use crate::config::AppConfig;

/// Tile source built from a URL template such as
/// `https://{s}.tile.example.org/{z}/{x}/{y}.png`.
/// `{s}` rotates through the configured subdomains based on tile coordinates.
#[derive(Debug, Clone)]
pub struct TemplateTileSource {
    template: String,
    subdomains: Vec<String>,
    max_zoom: u8,
    // Attribution wants 'static strings; the source lives for the whole run.
    attribution_text: &'static str,
    attribution_url: &'static str,
}

impl TemplateTileSource {
    pub fn new(template: String, subdomains: Vec<String>, max_zoom: u8) -> Self {
        Self {
            template,
            subdomains,
            max_zoom,
            attribution_text: "",
            attribution_url: "",
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let mut source = Self::new(
            config.tile_url.clone(),
            config.tile_subdomains.clone(),
            config.max_zoom,
        );
        source.attribution_text = Box::leak(config.tile_attribution.clone().into_boxed_str());
        source.attribution_url = Box::leak(config.tile_attribution_url.clone().into_boxed_str());
        source
    }

    /// Expand the template for one tile
    pub fn url_for(&self, zoom: u8, x: u32, y: u32) -> String {
        let mut url = self
            .template
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string());
        if !self.subdomains.is_empty() {
            let index = (x as usize + y as usize) % self.subdomains.len();
            url = url.replace("{s}", &self.subdomains[index]);
        }
        url
    }
}

impl TileSource for TemplateTileSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        self.url_for(tile_id.zoom, tile_id.x, tile_id.y)
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: self.attribution_text,
            url: self.attribution_url,
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_expansion() {
        let source = TemplateTileSource::new(
            "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            Vec::new(),
            19,
        );
        assert_eq!(
            source.url_for(12, 1205, 1539),
            "https://tile.openstreetmap.org/12/1205/1539.png"
        );
    }

    #[test]
    fn test_subdomain_rotation() {
        let source = TemplateTileSource::new(
            "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png".to_string(),
            vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()],
            19,
        );
        assert!(source.url_for(3, 0, 0).starts_with("https://a."));
        assert!(source.url_for(3, 1, 0).starts_with("https://b."));
        assert!(source.url_for(3, 2, 1).starts_with("https://d."));
        assert!(source.url_for(3, 3, 1).starts_with("https://a."));
    }

    #[test]
    fn test_from_config_uses_attribution() {
        let config = AppConfig::default();
        let source = TemplateTileSource::from_config(&config);
        assert_eq!(source.attribution().text, "© OpenStreetMap contributors");
        assert_eq!(source.max_zoom(), 19);
    }
}
