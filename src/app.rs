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

//! The eframe application: owns the controller and the map widget state and
//! applies the controller's view requests to the map each frame.

use std::time::Instant;

use chrono::Datelike;
use egui::{Color32, RichText};
use log::{debug, info, warn};
use poi_core::{GeoPoint, LocationRecord, MapController, PressOutcome, ViewDriver};
use walkers::{HttpOptions, HttpTiles, Map, MapMemory, Position};

use crate::config::AppConfig;
use crate::geolocation::{build_providers, LocateWorker};
use crate::map::layer::{from_position, to_position};
use crate::map::{MarkerLayer, MarkerLayerOutput, TemplateTileSource};
use crate::thumbnails::ImageTextureManager;
use crate::ui::{search_id, Notice, PopupAction, PopupView, Sidebar, SidebarAction};

const MIN_FIT_ZOOM: f64 = 1.0;

pub struct PoiMapApp {
    config: AppConfig,
    controller: MapController,
    tiles: HttpTiles,
    map_memory: MapMemory,
    home: Position,
    view: ViewDriver,
    layer_output: MarkerLayerOutput,
    sidebar: Sidebar,
    popup: PopupView,
    notice: Notice,
    images: ImageTextureManager,
    locator: LocateWorker,
    year: i32,
}

impl std::fmt::Debug for PoiMapApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoiMapApp")
            .field("controller", &self.controller)
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

impl PoiMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, records: Vec<LocationRecord>) -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| std::path::PathBuf::from(".cache"))
            .join("poi-map")
            .join("tiles");
        let http_options = HttpOptions {
            cache: Some(cache_dir),
            ..Default::default()
        };
        let tiles = HttpTiles::with_options(
            TemplateTileSource::from_config(&config),
            http_options,
            cc.egui_ctx.clone(),
        );

        let home = walkers::lat_lon(config.initial_latitude, config.initial_longitude);
        let mut map_memory = MapMemory::default();
        map_memory.center_at(home);
        if let Err(e) = map_memory.set_zoom(config.initial_zoom) {
            warn!("Initial zoom {} rejected: {e:?}", config.initial_zoom);
        }

        let controller = MapController::new(records);
        let (visible, total) = controller.counts();
        info!("Showing {visible} of {total} places");

        let locator = LocateWorker::new(build_providers(&config));
        let view = ViewDriver::new(MIN_FIT_ZOOM, f64::from(config.max_zoom));

        Self {
            sidebar: Sidebar::new(config.sidebar_width),
            config,
            controller,
            tiles,
            map_memory,
            home,
            view,
            layer_output: MarkerLayerOutput::default(),
            popup: PopupView,
            notice: Notice::default(),
            images: ImageTextureManager::new(),
            locator,
            year: chrono::Local::now().year(),
        }
    }

    fn current_view(&self) -> (GeoPoint, f64) {
        let center = self.map_memory.detached().unwrap_or(self.home);
        (from_position(center), self.map_memory.zoom())
    }

    fn set_view(&mut self, center: GeoPoint, zoom: f64) {
        self.map_memory.center_at(to_position(center));
        if let Err(e) = self.map_memory.set_zoom(zoom) {
            warn!("Zoom {zoom} rejected by the map: {e:?}");
        }
    }

    /// Hand the controller's pending view change to the driver and apply
    /// this frame's view. `map_size` is the size of the map widget in points.
    fn apply_view(&mut self, map_size: egui::Vec2, now: Instant) {
        if let Some(request) = self.controller.take_view_request() {
            debug!("View request {request:?}");
            let current = self.current_view();
            self.view.request(request, current, now);
        }
        if let Some((center, zoom)) = self.view.step(map_size.x, map_size.y, now) {
            self.set_view(center, zoom);
        }
    }

    fn handle_locate_press(&mut self, ctx: &egui::Context) {
        match self.controller.press_locate(self.locator.is_available()) {
            PressOutcome::Request(options) => self.locator.start(ctx, options),
            PressOutcome::Notify(message) => self.notice.show(message),
            PressOutcome::Ignored => {}
        }
    }

    fn poll_locator(&mut self, now: Instant) {
        match self.locator.poll() {
            Some(Ok(position)) => self.controller.location_found(position, now),
            Some(Err(error)) => {
                if let Some(message) = self.controller.location_failed(&error) {
                    self.notice.show(message);
                }
            }
            None => {}
        }
    }

    /// "/" moves focus to the search field unless a text field has it.
    fn handle_shortcuts(&self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.notice.is_open() {
            return;
        }
        if ctx.input_mut(|i| take_slash(&mut i.events)) {
            ctx.memory_mut(|m| m.request_focus(search_id()));
        }
    }

    fn render_footer(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("© {} POI Map", self.year)).small().weak());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (visible, total) = self.controller.counts();
                    ui.label(RichText::new(format!("{visible} of {total} places")).small());
                });
            });
        });
    }

    fn render_map(&mut self, ctx: &egui::Context, now: Instant) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let map_rect = ui.available_rect_before_wrap();
                self.apply_view(map_rect.size(), now);

                let markers: Vec<_> = self
                    .controller
                    .visible_markers()
                    .map(|entry| (entry.record, to_position(entry.marker.position)))
                    .collect();
                let selected = self.controller.popup().map(|(id, _)| id);
                let location = self.controller.locate().marker().map(to_position);

                let layer = MarkerLayer::new(markers, selected, location, &mut self.layer_output);
                let map = Map::new(Some(&mut self.tiles), &mut self.map_memory, self.home)
                    .with_plugin(layer);
                let response = ui.add(map);

                // the user took over the view
                if response.dragged() {
                    self.view.cancel_animation();
                }

                let attribution_rect = egui::Rect::from_min_max(
                    map_rect.right_bottom() - egui::vec2(240.0, 20.0),
                    map_rect.right_bottom() - egui::vec2(4.0, 2.0),
                );
                ui.put(
                    attribution_rect,
                    egui::Hyperlink::from_label_and_url(
                        RichText::new(&self.config.tile_attribution)
                            .small()
                            .color(Color32::from_gray(60))
                            .background_color(Color32::from_white_alpha(180)),
                        &self.config.tile_attribution_url,
                    ),
                );

                let output = self.layer_output;
                if let Some(id) = output.clicked {
                    self.controller.open_popup(id);
                } else if output.clicked_background {
                    self.controller.close_popup();
                }

                if let (Some((_, content)), Some(anchor)) =
                    (self.controller.popup(), output.popup_anchor)
                {
                    if map_rect.contains(anchor) {
                        let action = self.popup.render(ctx, anchor, content, &self.images);
                        if action == Some(PopupAction::Close) {
                            self.controller.close_popup();
                        }
                    }
                }
            });
    }
}

impl eframe::App for PoiMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.poll_locator(now);
        if self.controller.tick(now) {
            debug!("Location marker expired");
        }
        self.handle_shortcuts(ctx);

        self.render_footer(ctx);

        match self.sidebar.render(ctx, &mut self.controller, &self.images) {
            Some(SidebarAction::Select(id)) => self.controller.select(id),
            Some(SidebarAction::Locate) => self.handle_locate_press(ctx),
            None => {}
        }

        self.render_map(ctx, now);
        self.notice.render(ctx);

        if self.view.is_animating() {
            ctx.request_repaint();
        }
        if let Some(deadline) = self.controller.locate().next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }
}

/// Remove typed "/" characters from `events`; `true` if there were any.
/// Matching the typed text works on layouts where "/" needs a modifier.
fn take_slash(events: &mut Vec<egui::Event>) -> bool {
    let before = events.len();
    events.retain(|e| !matches!(e, egui::Event::Text(t) if t == "/"));
    events.len() != before
}
