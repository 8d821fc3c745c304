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

//! Marker popup drawn above the selected pin.

use egui::{Color32, RichText};
use log::{info, warn};
use poi_core::PopupContent;

use crate::thumbnails::{ImageTextureManager, PREVIEW_SIZE};

const POPUP_WIDTH: f32 = 260.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupAction {
    Close,
}

/// Popup card for one marker.
#[derive(Debug, Default)]
pub struct PopupView;

impl PopupView {
    /// Draw `content` with its bottom edge centered on `anchor`.
    pub fn render(
        &self,
        ctx: &egui::Context,
        anchor: egui::Pos2,
        content: &PopupContent,
        images: &ImageTextureManager,
    ) -> Option<PopupAction> {
        let mut action = None;

        egui::Area::new(egui::Id::new("marker_popup"))
            .order(egui::Order::Foreground)
            .pivot(egui::Align2::CENTER_BOTTOM)
            .fixed_pos(anchor)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .fill(Color32::from_rgba_unmultiplied(25, 30, 35, 240))
                    .stroke(egui::Stroke::new(1.0, Color32::from_rgb(60, 80, 100)))
                    .corner_radius(6.0)
                    .show(ui, |ui| {
                        ui.set_max_width(POPUP_WIDTH);

                        ui.horizontal(|ui| {
                            ui.label(RichText::new(&content.name).strong().size(14.0));
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                                if ui.small_button("✕").clicked() {
                                    action = Some(PopupAction::Close);
                                }
                            });
                        });
                        ui.label(
                            RichText::new(&content.category)
                                .small()
                                .color(Color32::from_rgb(150, 200, 220)),
                        );
                        ui.add_space(4.0);
                        ui.label(content.description.as_str());

                        if let Some(textures) = content
                            .image
                            .as_deref()
                            .and_then(|img| images.get_or_load(ctx, img))
                        {
                            ui.add_space(4.0);
                            ui.add(egui::Image::new(&textures.preview).max_size(egui::vec2(
                                PREVIEW_SIZE[0] as f32,
                                PREVIEW_SIZE[1] as f32,
                            )));
                        }

                        ui.add_space(6.0);
                        ui.horizontal(|ui| {
                            if ui.link("Open in Google Maps").clicked() {
                                if let Err(e) = webbrowser::open(&content.link) {
                                    warn!("Failed to open {}: {e}", content.link);
                                }
                            }
                            if ui.small_button("Copy HTML").clicked() {
                                ctx.copy_text(content.to_html());
                                info!("Copied popup HTML for {}", content.name);
                            }
                        });
                    });
            });

        action
    }
}
