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

//! Point-of-interest records and the JSON data set they are loaded from.
//!
//! Records are immutable once loaded. A record is identified by its position
//! in the source array, which is also the order every derived view keeps.

use std::collections::BTreeSet;
use std::io::Read;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::view::GeoPoint;

/// Index of a record in the loaded data set.
pub type RecordId = usize;

/// Errors that can occur while fetching or parsing the data set.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("request failed: {0}")]
    Http(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("invalid location data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub name: String,
    pub category: String,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    /// Image URL or path, shown as thumbnail and in the popup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl LocationRecord {
    /// Map position of this record.
    #[must_use]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// Text the free-text search runs against.
    #[must_use]
    pub fn search_text(&self) -> String {
        format!("{}{}{}", self.name, self.category, self.description).to_lowercase()
    }
}

/// Parse a data set from raw JSON bytes.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<LocationRecord>, LoadError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Parse a data set from a reader (file, response body).
pub fn read_records<R: Read>(reader: R) -> Result<Vec<LocationRecord>, LoadError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Deduplicated, sorted category names of a data set.
#[must_use]
pub fn categories(records: &[LocationRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"name": "Harbor Light", "category": "Landmark", "description": "Old lighthouse", "lat": 40.7, "lng": -74.0},
        {"name": "Bean There", "category": "Cafe", "description": "Espresso bar", "lat": 40.71, "lng": -74.01,
         "image": "https://example.com/bean.jpg"}
    ]"#;

    #[test]
    fn test_parse_records() {
        let records = parse_records(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Harbor Light");
        assert!(records[0].image.is_none());
        assert_eq!(records[1].image.as_deref(), Some("https://example.com/bean.jpg"));
        assert_eq!(records[1].position(), GeoPoint::new(40.71, -74.01));
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let err = parse_records(br#"[{"name": "x", "category": "y", "lat": 1.0, "lng": 2.0}]"#)
            .unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_records(b"{\"name\": \"x\"}").is_err());
        assert!(parse_records(b"not json").is_err());
    }

    #[test]
    fn test_read_records_from_reader() {
        let records = read_records(std::io::Cursor::new(SAMPLE)).unwrap();
        assert_eq!(records[1].category, "Cafe");
    }

    #[test]
    fn test_categories_sorted_and_deduplicated() {
        let mut records = parse_records(SAMPLE.as_bytes()).unwrap();
        records.push(records[0].clone());
        assert_eq!(categories(&records), vec!["Cafe".to_string(), "Landmark".to_string()]);
        assert!(categories(&[]).is_empty());
    }

    #[test]
    fn test_search_text_is_lowercase_concatenation() {
        let records = parse_records(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records[0].search_text(), "harbor lightlandmarkold lighthouse");
    }
}
