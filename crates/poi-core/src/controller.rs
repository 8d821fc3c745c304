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

//! Map controller owning all interaction state.
//!
//! The controller is created once from the loaded records and is the only
//! place UI state lives: the marker registry, the category set, the current
//! filter, the open popup, the geolocation control and any view change the
//! map still has to apply. UI handlers call into it and render from it, which
//! keeps the sidebar list and the marker layer on the same subset.

use std::time::Instant;

use log::debug;

use crate::filter::{filter_records, Filter};
use crate::locate::{LocateControl, LocateError, PressOutcome};
use crate::popup::PopupContent;
use crate::record::{categories, LocationRecord, RecordId};
use crate::registry::{MarkerEntry, MarkerRegistry};
use crate::view::{GeoPoint, ViewRequest};

/// Zoom used when a list entry is selected.
pub const SELECT_ZOOM: f64 = 15.0;

/// One row of the sidebar list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListEntry<'a> {
    pub id: RecordId,
    pub name: &'a str,
    pub category: &'a str,
    pub image: Option<&'a str>,
}

/// Owner of records, markers, filter and view state.
#[derive(Debug)]
pub struct MapController {
    records: Vec<LocationRecord>,
    categories: Vec<String>,
    registry: MarkerRegistry,
    filter: Filter,
    open_popup: Option<RecordId>,
    pending_view: Option<ViewRequest>,
    locate: LocateControl,
}

impl MapController {
    /// Build markers for `records`, show all of them and queue a fit.
    #[must_use]
    pub fn new(records: Vec<LocationRecord>) -> Self {
        let categories = categories(&records);
        let registry = MarkerRegistry::new(&records);
        let mut controller = Self {
            records,
            categories,
            registry,
            filter: Filter::default(),
            open_popup: None,
            pending_view: None,
            locate: LocateControl::new(),
        };
        controller.refresh();
        controller
    }

    #[must_use]
    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    /// Sorted, deduplicated category names.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
        self.refresh();
    }

    /// Select a category; an empty string means all categories.
    pub fn set_category(&mut self, category: impl Into<String>) {
        self.filter.category = category.into();
        self.refresh();
    }

    /// Re-run the filter and push the result to the marker layer.
    pub fn refresh(&mut self) {
        let subset = filter_records(&self.records, &self.filter);
        debug!(
            "Filter {:?}/{:?} matched {} of {} places",
            self.filter.query,
            self.filter.category,
            subset.len(),
            self.records.len()
        );
        self.registry.show_subset(&subset);
        if let Some(bounds) = self.registry.fit_viewport(&subset) {
            self.pending_view = Some(ViewRequest::Fit { bounds });
        }
        if let Some(id) = self.open_popup {
            if !self.registry.is_visible(id) {
                self.open_popup = None;
            }
        }
    }

    /// Markers on the map, in display order.
    pub fn visible_markers(&self) -> impl Iterator<Item = &MarkerEntry> + '_ {
        self.registry.visible_entries()
    }

    /// Sidebar rows for the visible subset.
    #[must_use]
    pub fn list_entries(&self) -> Vec<ListEntry<'_>> {
        self.registry
            .visible()
            .iter()
            .filter_map(|&id| {
                self.records.get(id).map(|r| ListEntry {
                    id,
                    name: &r.name,
                    category: &r.category,
                    image: r.image.as_deref(),
                })
            })
            .collect()
    }

    /// `(visible, total)` counts.
    #[must_use]
    pub fn counts(&self) -> (usize, usize) {
        (self.registry.visible().len(), self.records.len())
    }

    /// List entry clicked: open its popup and zoom the map onto it.
    pub fn select(&mut self, id: RecordId) {
        let Some(entry) = self.registry.entry(id) else {
            return;
        };
        let center = entry.marker.position;
        self.open_popup = Some(id);
        self.pending_view = Some(ViewRequest::SetView {
            center,
            zoom: SELECT_ZOOM,
            animate: true,
        });
    }

    /// Marker clicked: open its popup, view unchanged.
    pub fn open_popup(&mut self, id: RecordId) {
        if self.registry.is_visible(id) {
            self.open_popup = Some(id);
        }
    }

    pub fn close_popup(&mut self) {
        self.open_popup = None;
    }

    /// The open popup and the record it belongs to.
    #[must_use]
    pub fn popup(&self) -> Option<(RecordId, &PopupContent)> {
        let id = self.open_popup?;
        self.registry.entry(id).map(|e| (id, &e.marker.popup))
    }

    /// Take the view change the map still has to apply.
    pub fn take_view_request(&mut self) -> Option<ViewRequest> {
        self.pending_view.take()
    }

    #[must_use]
    pub fn locate(&self) -> &LocateControl {
        &self.locate
    }

    pub fn press_locate(&mut self, available: bool) -> PressOutcome {
        self.locate.press(available)
    }

    /// Position fix arrived: center on it and show the temporary marker.
    pub fn location_found(&mut self, position: GeoPoint, now: Instant) {
        if let Some(zoom) = self.locate.succeed(position, now) {
            self.pending_view = Some(ViewRequest::SetView {
                center: position,
                zoom,
                animate: true,
            });
        }
    }

    /// Position request failed; returns the notice to show.
    pub fn location_failed(&mut self, error: &LocateError) -> Option<String> {
        self.locate.fail(error)
    }

    /// Advance timers. Returns `true` if something visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.locate.tick(now)
    }
}
