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

//! Marker layer plugin for the `walkers` map.
//!
//! Draws the visible markers in display order, the temporary "my location"
//! circle, and reports clicks and the screen anchor of the open popup back
//! to the app through [`MarkerLayerOutput`].

use egui::{Color32, Pos2, Stroke};
use poi_core::{GeoPoint, RecordId};
use walkers::{MapMemory, Plugin, Position, Projector};

const PIN_RADIUS: f32 = 7.0;
const PIN_HEIGHT: f32 = 12.0;
const HIT_RADIUS: f32 = 12.0;
const LOCATION_RADIUS: f32 = 10.0;

const PIN_COLOR: Color32 = Color32::from_rgb(38, 120, 210);
const PIN_SELECTED_COLOR: Color32 = Color32::from_rgb(230, 80, 60);
const LOCATION_COLOR: Color32 = Color32::from_rgb(30, 136, 229);

pub fn to_position(p: GeoPoint) -> Position {
    walkers::lat_lon(p.lat, p.lng)
}

pub fn from_position(p: Position) -> GeoPoint {
    GeoPoint::new(p.y(), p.x())
}

/// What happened on the map this frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkerLayerOutput {
    /// Marker clicked this frame
    pub clicked: Option<RecordId>,
    /// Map clicked away from any marker
    pub clicked_background: bool,
    /// Screen position of the marker whose popup is open
    pub popup_anchor: Option<Pos2>,
}

/// Plugin drawing one pin per visible marker.
#[derive(Debug)]
pub struct MarkerLayer<'a> {
    markers: Vec<(RecordId, Position)>,
    selected: Option<RecordId>,
    location: Option<Position>,
    output: &'a mut MarkerLayerOutput,
}

impl<'a> MarkerLayer<'a> {
    pub fn new(
        markers: Vec<(RecordId, Position)>,
        selected: Option<RecordId>,
        location: Option<Position>,
        output: &'a mut MarkerLayerOutput,
    ) -> Self {
        *output = MarkerLayerOutput::default();
        Self {
            markers,
            selected,
            location,
            output,
        }
    }
}

/// Topmost marker within the hit radius of `click`. Later markers are drawn
/// over earlier ones, so the search runs back to front.
pub fn hit_test(screen: &[(RecordId, Pos2)], click: Pos2) -> Option<RecordId> {
    screen
        .iter()
        .rev()
        // pins are drawn above their anchor point
        .find(|(_, pos)| (*pos - egui::vec2(0.0, PIN_HEIGHT)).distance(click) <= HIT_RADIUS)
        .map(|(id, _)| *id)
}

fn draw_pin(painter: &egui::Painter, anchor: Pos2, color: Color32) {
    let head = anchor - egui::vec2(0.0, PIN_HEIGHT);
    painter.add(egui::Shape::convex_polygon(
        vec![
            anchor,
            head + egui::vec2(-PIN_RADIUS * 0.7, PIN_RADIUS * 0.5),
            head + egui::vec2(PIN_RADIUS * 0.7, PIN_RADIUS * 0.5),
        ],
        color,
        Stroke::NONE,
    ));
    painter.circle_filled(anchor + egui::vec2(1.0, 1.0), 2.0, Color32::from_black_alpha(80));
    painter.circle_filled(head, PIN_RADIUS, color);
    painter.circle_stroke(head, PIN_RADIUS, Stroke::new(1.5, Color32::WHITE));
    painter.circle_filled(head, 2.5, Color32::WHITE);
}

impl Plugin for MarkerLayer<'_> {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &MapMemory,
    ) {
        let MarkerLayer {
            markers,
            selected,
            location,
            output,
        } = *self;
        let painter = ui.painter().with_clip_rect(response.rect);

        let screen: Vec<(RecordId, Pos2)> = markers
            .iter()
            .map(|(id, pos)| (*id, projector.project(*pos).to_pos2()))
            .collect();

        for (id, pos) in &screen {
            if selected == Some(*id) {
                continue;
            }
            draw_pin(&painter, *pos, PIN_COLOR);
        }
        // selected pin on top
        if let Some((_, pos)) = screen.iter().find(|(id, _)| selected == Some(*id)) {
            draw_pin(&painter, *pos, PIN_SELECTED_COLOR);
            output.popup_anchor = Some(*pos - egui::vec2(0.0, PIN_HEIGHT + PIN_RADIUS));
        }

        if let Some(location) = location {
            let center = projector.project(location).to_pos2();
            painter.circle_filled(
                center,
                LOCATION_RADIUS,
                Color32::from_rgba_unmultiplied(30, 136, 229, 90),
            );
            painter.circle_stroke(center, LOCATION_RADIUS, Stroke::new(2.0, LOCATION_COLOR));
        }

        if response.clicked() {
            if let Some(click) = response.interact_pointer_pos() {
                match hit_test(&screen, click) {
                    Some(id) => output.clicked = Some(id),
                    None => output.clicked_background = true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_conversion() {
        let p = GeoPoint::new(40.7, -74.0);
        let pos = to_position(p);
        assert!((pos.y() - 40.7).abs() < 1e-12);
        assert!((pos.x() + 74.0).abs() < 1e-12);
        assert_eq!(from_position(pos), p);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let screen = vec![(0, egui::pos2(100.0, 100.0)), (1, egui::pos2(104.0, 100.0))];
        let click = egui::pos2(102.0, 100.0 - PIN_HEIGHT);
        assert_eq!(hit_test(&screen, click), Some(1));
    }

    #[test]
    fn test_hit_test_misses_far_clicks() {
        let screen = vec![(3, egui::pos2(100.0, 100.0))];
        assert_eq!(hit_test(&screen, egui::pos2(100.0, 88.0)), Some(3));
        assert_eq!(hit_test(&screen, egui::pos2(150.0, 150.0)), None);
        assert_eq!(hit_test(&[], egui::pos2(0.0, 0.0)), None);
    }
}
