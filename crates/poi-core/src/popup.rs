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

//! Popup content bound to a marker.

use std::fmt::Write as _;

use crate::escape::escape_html;
use crate::record::LocationRecord;
use crate::view::GeoPoint;

/// Link to an external map search for a coordinate.
#[must_use]
pub fn external_map_url(position: GeoPoint) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        position.lat, position.lng
    )
}

/// Everything a marker popup shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub name: String,
    pub category: String,
    pub description: String,
    pub image: Option<String>,
    pub link: String,
}

impl PopupContent {
    #[must_use]
    pub fn from_record(record: &LocationRecord) -> Self {
        Self {
            name: record.name.clone(),
            category: record.category.clone(),
            description: record.description.clone(),
            image: record.image.clone(),
            link: external_map_url(record.position()),
        }
    }

    /// HTML fragment of the popup with every record-supplied value escaped.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::from("<div class=\"popup\">");
        let _ = write!(
            html,
            "<strong>{}</strong><br><span class=\"category\">{}</span><p>{}</p>",
            escape_html(&self.name),
            escape_html(&self.category),
            escape_html(&self.description),
        );
        if let Some(image) = &self.image {
            let _ = write!(
                html,
                "<img src=\"{}\" alt=\"{}\">",
                escape_html(image),
                escape_html(&self.name),
            );
        }
        let _ = write!(
            html,
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">Open in Google Maps</a></div>",
            escape_html(&self.link),
        );
        html
    }
}
