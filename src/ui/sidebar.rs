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

use egui::{Color32, RichText};
use poi_core::{MapController, RecordId};

use crate::thumbnails::{ImageTextureManager, THUMBNAIL_SIZE};

const SEARCH_ID: &str = "poi_search";
const ALL_CATEGORIES: &str = "All categories";
const ROW_HEIGHT: f32 = 40.0;

/// Id of the search field, used by the "/" shortcut
pub fn search_id() -> egui::Id {
    egui::Id::new(SEARCH_ID)
}

/// What the user asked for in the sidebar this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarAction {
    Select(RecordId),
    Locate,
}

/// Left panel: filters, locate button and the place list.
#[derive(Debug)]
pub struct Sidebar {
    pub width: f32,
}

impl Sidebar {
    pub fn new(width: f32) -> Self {
        Self { width }
    }

    /// Render the sidebar. Filter edits are applied to `controller`
    /// immediately; selection and locate presses are returned.
    pub fn render(
        &self,
        ctx: &egui::Context,
        controller: &mut MapController,
        images: &ImageTextureManager,
    ) -> Option<SidebarAction> {
        let mut action = None;

        egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(self.width)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.heading("Places");
                ui.add_space(4.0);

                let mut query = controller.filter().query.clone();
                let search = ui.add(
                    egui::TextEdit::singleline(&mut query)
                        .id(search_id())
                        .hint_text("Search places… ( / )")
                        .desired_width(f32::INFINITY),
                );
                if search.changed() {
                    controller.set_query(query);
                }

                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    let mut category = controller.filter().category.clone();
                    let selected_text = if category.is_empty() {
                        ALL_CATEGORIES.to_string()
                    } else {
                        category.clone()
                    };
                    egui::ComboBox::from_id_salt("category_filter")
                        .selected_text(selected_text)
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut category, String::new(), ALL_CATEGORIES);
                            for name in controller.categories() {
                                ui.selectable_value(&mut category, name.clone(), name.as_str());
                            }
                        });
                    if category != controller.filter().category {
                        controller.set_category(category);
                    }

                    let locate = controller.locate();
                    if ui
                        .add_enabled(locate.is_enabled(), egui::Button::new(locate.label()))
                        .clicked()
                    {
                        action = Some(SidebarAction::Locate);
                    }
                });

                ui.separator();

                let entries = controller.list_entries();
                if entries.is_empty() {
                    ui.label(RichText::new("No places match.").italics().weak());
                }

                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for entry in &entries {
                            let row = ui.horizontal(|ui| {
                                ui.set_min_height(ROW_HEIGHT);
                                let size = egui::vec2(
                                    THUMBNAIL_SIZE[0] as f32,
                                    THUMBNAIL_SIZE[1] as f32,
                                );
                                match entry.image.and_then(|img| images.get_or_load(ctx, img)) {
                                    Some(textures) => {
                                        ui.add(egui::Image::new(&textures.thumbnail).max_size(size));
                                    }
                                    None => {
                                        let (rect, _) =
                                            ui.allocate_exact_size(size, egui::Sense::hover());
                                        ui.painter().rect_filled(
                                            rect,
                                            4.0,
                                            Color32::from_gray(60),
                                        );
                                    }
                                }
                                ui.vertical(|ui| {
                                    ui.label(RichText::new(entry.name).strong());
                                    ui.label(RichText::new(entry.category).small().weak());
                                });
                            });

                            let response = ui.interact(
                                row.response.rect,
                                ui.id().with(("place_row", entry.id)),
                                egui::Sense::click(),
                            );
                            if response.hovered() {
                                ui.painter().rect_stroke(
                                    row.response.rect.expand(2.0),
                                    4.0,
                                    egui::Stroke::new(1.0, Color32::from_rgb(60, 80, 100)),
                                    egui::StrokeKind::Outside,
                                );
                            }
                            if response.clicked() {
                                action = Some(SidebarAction::Select(entry.id));
                            }
                            ui.separator();
                        }
                    });
            });

        action
    }
}
