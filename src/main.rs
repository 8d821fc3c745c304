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

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod app;
mod config;
mod data;
mod geolocation;
mod map;
mod thumbnails;
mod ui;

use clap::Parser;
use log::{error, info, warn};
use poi_core::LoadError;

use app::PoiMapApp;
use config::AppConfig;
use data::DataSource;

/// Desktop map of points of interest
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Location data: a JSON file path or an http(s) URL
    #[arg(short, long)]
    data: Option<String>,

    /// Tile URL template, e.g. https://{s}.tile.example.org/{z}/{x}/{y}.png
    #[arg(long)]
    tile_url: Option<String>,

    /// Print the configuration file path and exit
    #[arg(long)]
    print_config_path: bool,
}

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("failed to load locations from {source_name}: {error}")]
    Data {
        source_name: String,
        #[source]
        error: LoadError,
    },

    #[error("failed to start the window: {0}")]
    Window(#[from] eframe::Error),

    #[error("failed to locate config file: {0}")]
    Config(#[from] confy::ConfyError),
}

fn run(args: Args) -> Result<(), StartupError> {
    if args.print_config_path {
        println!("{}", AppConfig::get_config_path()?.display());
        return Ok(());
    }

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {e}");
        AppConfig::default()
    });
    if let Some(data) = args.data {
        config.data_source = data;
    }
    if let Some(tile_url) = args.tile_url {
        config.tile_url = tile_url;
    }

    let source = DataSource::parse(&config.data_source);
    let mut records = data::load(&source).map_err(|error| StartupError::Data {
        source_name: source.to_string(),
        error,
    })?;
    for record in &mut records {
        if let Some(image) = record.image.as_mut() {
            *image = source.resolve_image(image);
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0])
            .with_title("POI Map"),
        ..Default::default()
    };

    info!("Initializing window...");
    eframe::run_native(
        "POI Map",
        options,
        Box::new(move |cc| Ok(Box::new(PoiMapApp::new(cc, config, records)))),
    )?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["poi-map", "--data", "https://example.com/p.json"]).unwrap();
        assert_eq!(args.data.as_deref(), Some("https://example.com/p.json"));
        assert!(args.tile_url.is_none());
        assert!(!args.print_config_path);
    }

    #[test]
    fn test_startup_error_message() {
        let err = StartupError::Data {
            source_name: "data/missing.json".to_string(),
            error: LoadError::Status(404),
        };
        assert!(err.to_string().starts_with("failed to load locations from data/missing.json"));
    }
}
