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

//! Position providers for the "my location" button.
//!
//! Providers are tried in order: a configured fixed location, platform
//! location services (macOS), then IP-based lookup. A request runs on a
//! worker thread and is bounded by the timeout in its [`LocateOptions`].

#[cfg(target_os = "macos")]
mod corelocation;
mod ip;

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use log::{debug, info, warn};
use poi_core::{GeoPoint, LocateError, LocateOptions};

use crate::config::AppConfig;

pub use ip::IpProvider;

/// A source of the device position.
pub trait LocationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Blocking position request.
    fn locate(&self, options: &LocateOptions) -> Result<GeoPoint, LocateError>;
}

/// Always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedProvider {
    position: GeoPoint,
}

impl FixedProvider {
    pub fn new(position: GeoPoint) -> Self {
        Self { position }
    }
}

impl LocationProvider for FixedProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn locate(&self, _options: &LocateOptions) -> Result<GeoPoint, LocateError> {
        Ok(self.position)
    }
}

/// Ordered list of providers; the first success wins.
#[derive(Default)]
pub struct ProviderChain {
    providers: Vec<Box<dyn LocationProvider>>,
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.name()))
            .finish()
    }
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn LocationProvider>>) -> Self {
        Self { providers }
    }

    /// Whether geolocation is supported at all.
    pub fn is_available(&self) -> bool {
        !self.providers.is_empty()
    }

    pub fn locate(&self, options: &LocateOptions) -> Result<GeoPoint, LocateError> {
        let mut last_error = LocateError::Unavailable("no location provider".to_string());
        for provider in &self.providers {
            match provider.locate(options) {
                Ok(position) => {
                    info!(
                        "Location found via {}: {}, {}",
                        provider.name(),
                        position.lat,
                        position.lng
                    );
                    return Ok(position);
                }
                Err(e) => {
                    debug!("Location provider {} failed: {e}", provider.name());
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}

/// Providers enabled by `config`, in priority order.
pub fn build_providers(config: &AppConfig) -> ProviderChain {
    let mut providers: Vec<Box<dyn LocationProvider>> = Vec::new();

    if let Some((lat, lng)) = config.location_override() {
        providers.push(Box::new(FixedProvider::new(GeoPoint::new(lat, lng))));
    }

    #[cfg(target_os = "macos")]
    providers.push(Box::new(corelocation::CoreLocationProvider));

    if config.ip_geolocation {
        providers.push(Box::new(IpProvider::default()));
    }

    let chain = ProviderChain::new(providers);
    info!("Location providers: {chain:?}");
    chain
}

/// Runs position requests off the UI thread, one at a time.
#[derive(Debug)]
pub struct LocateWorker {
    chain: Arc<ProviderChain>,
    pending: Option<Receiver<Result<GeoPoint, LocateError>>>,
}

impl LocateWorker {
    pub fn new(chain: ProviderChain) -> Self {
        Self {
            chain: Arc::new(chain),
            pending: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.chain.is_available()
    }

    /// Start a request; ignored while one is in flight.
    pub fn start(&mut self, ctx: &egui::Context, options: LocateOptions) {
        if self.pending.is_some() {
            return;
        }
        let (tx, rx) = mpsc::channel();
        let chain = Arc::clone(&self.chain);
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            let result = match tokio::runtime::Runtime::new() {
                Ok(rt) => {
                    let result = rt.block_on(locate_with_timeout(chain, options));
                    // do not wait for a provider still running past the timeout
                    rt.shutdown_background();
                    result
                }
                Err(e) => Err(LocateError::Unavailable(e.to_string())),
            };
            if tx.send(result).is_err() {
                warn!("Location result dropped: receiver gone");
            }
            ctx.request_repaint();
        });

        self.pending = Some(rx);
    }

    /// Result of the in-flight request, once it has arrived.
    pub fn poll(&mut self) -> Option<Result<GeoPoint, LocateError>> {
        let rx = self.pending.as_ref()?;
        match rx.try_recv() {
            Ok(result) => {
                self.pending = None;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                Some(Err(LocateError::Unavailable("location worker stopped".to_string())))
            }
        }
    }
}

async fn locate_with_timeout(
    chain: Arc<ProviderChain>,
    options: LocateOptions,
) -> Result<GeoPoint, LocateError> {
    let task = tokio::task::spawn_blocking(move || chain.locate(&options));
    match tokio::time::timeout(options.timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(LocateError::Unavailable(join_error.to_string())),
        Err(_) => {
            warn!("Location request timed out after {:?}", options.timeout);
            Err(LocateError::Timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    struct Failing(LocateError);

    impl LocationProvider for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn locate(&self, _options: &LocateOptions) -> Result<GeoPoint, LocateError> {
            Err(self.0.clone())
        }
    }

    struct Slow;

    impl LocationProvider for Slow {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn locate(&self, _options: &LocateOptions) -> Result<GeoPoint, LocateError> {
            std::thread::sleep(Duration::from_millis(500));
            Ok(GeoPoint::new(0.0, 0.0))
        }
    }

    #[test]
    fn test_empty_chain_is_unavailable() {
        let chain = ProviderChain::default();
        assert!(!chain.is_available());
        assert!(matches!(
            chain.locate(&LocateOptions::default()),
            Err(LocateError::Unavailable(_))
        ));
    }

    #[test]
    fn test_chain_falls_through_to_next_provider() {
        let chain = ProviderChain::new(vec![
            Box::new(Failing(LocateError::PermissionDenied)),
            Box::new(FixedProvider::new(GeoPoint::new(40.70, -74.00))),
        ]);
        assert_eq!(
            chain.locate(&LocateOptions::default()),
            Ok(GeoPoint::new(40.70, -74.00))
        );
    }

    #[test]
    fn test_chain_reports_last_error() {
        let chain = ProviderChain::new(vec![
            Box::new(Failing(LocateError::Unavailable("gps".to_string()))),
            Box::new(Failing(LocateError::PermissionDenied)),
        ]);
        assert_eq!(
            chain.locate(&LocateOptions::default()),
            Err(LocateError::PermissionDenied)
        );
    }

    #[test]
    fn test_override_comes_first() {
        let config = AppConfig {
            override_latitude: Some(48.85),
            override_longitude: Some(2.35),
            ip_geolocation: false,
            ..Default::default()
        };
        let chain = build_providers(&config);
        assert!(chain.is_available());
        assert_eq!(
            chain.locate(&LocateOptions::default()),
            Ok(GeoPoint::new(48.85, 2.35))
        );
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_no_providers_without_override_or_ip() {
        let config = AppConfig {
            ip_geolocation: false,
            ..Default::default()
        };
        assert!(!build_providers(&config).is_available());
    }

    #[test]
    fn test_timeout_maps_to_timeout_error() {
        let chain = Arc::new(ProviderChain::new(vec![Box::new(Slow)]));
        let options = LocateOptions {
            high_accuracy: true,
            timeout: Duration::from_millis(20),
        };
        let rt = tokio::runtime::Runtime::new().unwrap();
        let result = rt.block_on(locate_with_timeout(chain, options));
        rt.shutdown_background();
        assert_eq!(result, Err(LocateError::Timeout));
    }

    #[test]
    fn test_worker_delivers_result() {
        let ctx = egui::Context::default();
        let mut worker = LocateWorker::new(ProviderChain::new(vec![Box::new(
            FixedProvider::new(GeoPoint::new(1.0, 2.0)),
        )]));
        worker.start(&ctx, LocateOptions::default());
        assert!(worker.pending.is_some());

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        let result = loop {
            if let Some(result) = worker.poll() {
                break result;
            }
            assert!(std::time::Instant::now() < deadline, "worker never answered");
            std::thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(result, Ok(GeoPoint::new(1.0, 2.0)));
        assert!(worker.pending.is_none());
    }
}
