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

//! Location data loading.
//!
//! One attempt, no retry: any I/O, HTTP or parse failure is returned to the
//! caller, which aborts startup.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::info;
use poi_core::{read_records, LoadError, LocationRecord};

/// Where the location JSON comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            Self::Url(source.to_string())
        } else {
            Self::File(PathBuf::from(source))
        }
    }

    /// Resolve a record's image reference against this source. URLs pass
    /// through, relative paths are taken relative to the data file.
    pub fn resolve_image(&self, image: &str) -> String {
        if image.contains("://") || Path::new(image).is_absolute() {
            return image.to_string();
        }
        match self {
            Self::File(path) => path
                .parent()
                .map_or_else(|| PathBuf::from(image), |dir| dir.join(image))
                .to_string_lossy()
                .into_owned(),
            Self::Url(url) => match url.rfind('/') {
                Some(slash) => format!("{}{}", &url[..=slash], image),
                None => image.to_string(),
            },
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Fetch and parse the record list.
pub fn load(source: &DataSource) -> Result<Vec<LocationRecord>, LoadError> {
    let records = match source {
        DataSource::File(path) => read_records(BufReader::new(File::open(path)?))?,
        DataSource::Url(url) => {
            let response =
                reqwest::blocking::get(url).map_err(|e| LoadError::Http(e.to_string()))?;
            if !response.status().is_success() {
                return Err(LoadError::Status(response.status().as_u16()));
            }
            read_records(response)?
        }
    };
    info!("Loaded {} locations from {}", records.len(), source);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source() {
        assert_eq!(
            DataSource::parse("https://example.com/data/locations.json"),
            DataSource::Url("https://example.com/data/locations.json".to_string())
        );
        assert_eq!(
            DataSource::parse("data/locations.json"),
            DataSource::File(PathBuf::from("data/locations.json"))
        );
    }

    #[test]
    fn test_resolve_image_relative_to_file() {
        let source = DataSource::parse("data/locations.json");
        assert_eq!(
            source.resolve_image("img/pier.jpg"),
            Path::new("data").join("img/pier.jpg").to_string_lossy()
        );
        assert_eq!(
            source.resolve_image("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_resolve_image_relative_to_url() {
        let source = DataSource::parse("https://example.com/data/locations.json");
        assert_eq!(source.resolve_image("a.png"), "https://example.com/data/a.png");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let source = DataSource::File(PathBuf::from("definitely/not/here.json"));
        assert!(matches!(load(&source), Err(LoadError::Io(_))));
    }

    #[test]
    fn test_load_bundled_sample() {
        let source = DataSource::File(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("data/locations.json"),
        );
        let records = load(&source).unwrap();
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| !r.name.is_empty()));
    }
}
