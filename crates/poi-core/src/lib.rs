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

//! Core logic of the points-of-interest map viewer.
//!
//! Nothing in this crate touches a window, a map widget or the network, so
//! every piece can be exercised headless:
//!
//! - **Records**: the JSON data set and its category set
//! - **Filter**: free-text + category filtering, source order preserved
//! - **Registry**: one marker per record and the visible layer group
//! - **Popup**: popup content with HTML escaping of record text
//! - **View**: bounds, viewport fitting and animated transitions
//! - **Locate**: the "my location" button state machine
//! - **Controller**: the single owner of all interaction state
//!
//! # Quick Start
//!
//! ```
//! use poi_core::{parse_records, MapController, ViewRequest};
//!
//! let json = br#"[
//!     {"name": "Harbor Light", "category": "Landmark",
//!      "description": "Old lighthouse", "lat": 40.70, "lng": -74.01}
//! ]"#;
//! let mut controller = MapController::new(parse_records(json).unwrap());
//!
//! controller.set_query("lighthouse");
//! assert_eq!(controller.list_entries().len(), 1);
//! assert!(matches!(controller.take_view_request(), Some(ViewRequest::Fit { .. })));
//! ```

pub mod controller;
pub mod escape;
pub mod filter;
pub mod locate;
pub mod popup;
pub mod record;
pub mod registry;
pub mod view;

pub use controller::{ListEntry, MapController, SELECT_ZOOM};
pub use escape::escape_html;
pub use filter::{filter_records, Filter};
pub use locate::{LocateControl, LocateError, LocateOptions, LocateState, PressOutcome};
pub use popup::{external_map_url, PopupContent};
pub use record::{categories, parse_records, read_records, LoadError, LocationRecord, RecordId};
pub use registry::{Marker, MarkerEntry, MarkerRegistry, FIT_PADDING};
pub use view::{fit_bounds, GeoBounds, GeoPoint, ViewAnimation, ViewDriver, ViewRequest};
