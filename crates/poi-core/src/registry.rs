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

//! Marker registry: one marker per record plus the visible layer group.
//!
//! Markers are created once at load time and never mutated. Filtering only
//! changes which of them are attached to the visible layer.

use log::debug;

use crate::popup::PopupContent;
use crate::record::{LocationRecord, RecordId};
use crate::view::{GeoBounds, GeoPoint};

/// Padding ratio applied when fitting the viewport to a subset.
pub const FIT_PADDING: f64 = 0.12;

/// Visual marker owned by an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: GeoPoint,
    pub popup: PopupContent,
}

/// A record paired with its marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerEntry {
    pub record: RecordId,
    pub marker: Marker,
}

/// All markers in source order and the subset currently on the map.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    entries: Vec<MarkerEntry>,
    visible: Vec<RecordId>,
}

impl MarkerRegistry {
    /// Build one marker per record. Nothing is visible until
    /// [`show_subset`](Self::show_subset) is called.
    #[must_use]
    pub fn new(records: &[LocationRecord]) -> Self {
        let entries = records
            .iter()
            .enumerate()
            .map(|(record, r)| MarkerEntry {
                record,
                marker: Marker {
                    position: r.position(),
                    popup: PopupContent::from_record(r),
                },
            })
            .collect();
        Self {
            entries,
            visible: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entry(&self, id: RecordId) -> Option<&MarkerEntry> {
        self.entries.get(id)
    }

    /// Replace the visible layer with exactly `subset`, keeping its order.
    /// Ids without a marker are ignored.
    pub fn show_subset(&mut self, subset: &[RecordId]) {
        let len = self.entries.len();
        self.visible = subset.iter().copied().filter(|&id| id < len).collect();
        debug!("Visible layer now holds {} of {} markers", self.visible.len(), len);
    }

    /// Ids on the visible layer, in display order.
    #[must_use]
    pub fn visible(&self) -> &[RecordId] {
        &self.visible
    }

    #[must_use]
    pub fn is_visible(&self, id: RecordId) -> bool {
        self.visible.contains(&id)
    }

    /// Visible entries in display order.
    pub fn visible_entries(&self) -> impl Iterator<Item = &MarkerEntry> + '_ {
        self.visible.iter().filter_map(|&id| self.entries.get(id))
    }

    /// Padded bounds over the markers of `subset`; `None` when `subset` is
    /// empty so the caller keeps its current view.
    #[must_use]
    pub fn fit_viewport(&self, subset: &[RecordId]) -> Option<GeoBounds> {
        GeoBounds::from_points(
            subset
                .iter()
                .filter_map(|&id| self.entries.get(id))
                .map(|e| e.marker.position),
        )
        .map(|b| b.pad(FIT_PADDING))
    }
}
