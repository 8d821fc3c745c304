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

//! macOS location services through CoreLocation.

use std::time::{Duration, Instant};

use log::debug;
use objc2::rc::Retained;
use objc2_core_location::{
    kCLLocationAccuracyBest, kCLLocationAccuracyKilometer, CLAuthorizationStatus, CLLocationManager,
};
use poi_core::{GeoPoint, LocateError, LocateOptions};

use super::LocationProvider;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Position from the system location manager.
#[derive(Debug, Clone, Copy)]
pub struct CoreLocationProvider;

impl LocationProvider for CoreLocationProvider {
    fn name(&self) -> &'static str {
        "corelocation"
    }

    fn locate(&self, options: &LocateOptions) -> Result<GeoPoint, LocateError> {
        // SAFETY: creating a location manager has no preconditions; it lives
        // and dies on this thread.
        let manager: Retained<CLLocationManager> = unsafe { CLLocationManager::new() };

        // SAFETY: plain property reads/writes on a valid manager; the
        // accuracy constants are immutable framework statics.
        let status = unsafe {
            let accuracy = if options.high_accuracy {
                kCLLocationAccuracyBest
            } else {
                kCLLocationAccuracyKilometer
            };
            manager.setDesiredAccuracy(accuracy);
            manager.authorizationStatus()
        };

        if status == CLAuthorizationStatus::Denied || status == CLAuthorizationStatus::Restricted {
            return Err(LocateError::PermissionDenied);
        }
        if status == CLAuthorizationStatus::NotDetermined {
            debug!("Requesting location authorization");
            // SAFETY: valid manager, no arguments.
            unsafe { manager.requestWhenInUseAuthorization() };
        }

        // SAFETY: valid manager, no arguments.
        unsafe { manager.startUpdatingLocation() };

        let deadline = Instant::now() + options.timeout;
        let result = loop {
            // SAFETY: reading the last known location of a valid manager.
            if let Some(location) = unsafe { manager.location() } {
                // SAFETY: `location` is a valid CLLocation.
                let coord = unsafe { location.coordinate() };
                break Ok(GeoPoint::new(coord.latitude, coord.longitude));
            }
            // SAFETY: valid manager, no arguments.
            if unsafe { manager.authorizationStatus() } == CLAuthorizationStatus::Denied {
                break Err(LocateError::PermissionDenied);
            }
            if Instant::now() >= deadline {
                break Err(LocateError::Timeout);
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        // SAFETY: valid manager, no arguments.
        unsafe { manager.stopUpdatingLocation() };
        result
    }
}
