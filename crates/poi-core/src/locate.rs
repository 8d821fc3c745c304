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

//! "My location" control.
//!
//! A one-shot lookup with three phases: idle, waiting for a fix, and showing
//! the fix as a temporary marker. The button is disabled outside of idle.
//! Time is passed in by the caller so transitions are deterministic.

use std::time::{Duration, Instant};

use log::{info, warn};
use thiserror::Error;

use crate::view::GeoPoint;

/// How long a position request may take.
pub const LOCATE_TIMEOUT: Duration = Duration::from_secs(10);
/// How long the temporary location marker stays on the map.
pub const MARKER_LIFETIME: Duration = Duration::from_secs(6);
/// Zoom level used when centering on the user's position.
pub const LOCATE_ZOOM: f64 = 14.0;

pub const IDLE_LABEL: &str = "📍 My location";
pub const BUSY_LABEL: &str = "Locating...";

/// Message shown when no location provider exists at all.
pub const UNSUPPORTED_MESSAGE: &str = "Geolocation is not supported on this system.";

/// Why a position request failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("User denied Geolocation")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    Unavailable(String),

    #[error("Timeout expired")]
    Timeout,
}

/// Options for a position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocateOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: LOCATE_TIMEOUT,
        }
    }
}

/// Control state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocateState {
    Idle,
    /// Waiting for the provider to answer.
    Locating,
    /// Fix received; temporary marker shown until `expires_at`.
    Marked { position: GeoPoint, expires_at: Instant },
}

/// Result of pressing the button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressOutcome {
    /// A request must be issued with these options.
    Request(LocateOptions),
    /// Show a blocking notice; state is unchanged.
    Notify(String),
    /// The control is busy and ignored the press.
    Ignored,
}

/// Geolocation button state machine.
#[derive(Debug)]
pub struct LocateControl {
    state: LocateState,
    options: LocateOptions,
    marker_lifetime: Duration,
}

impl Default for LocateControl {
    fn default() -> Self {
        Self::new()
    }
}

impl LocateControl {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: LocateState::Idle,
            options: LocateOptions::default(),
            marker_lifetime: MARKER_LIFETIME,
        }
    }

    #[must_use]
    pub fn state(&self) -> LocateState {
        self.state
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state == LocateState::Idle
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        if self.is_enabled() {
            IDLE_LABEL
        } else {
            BUSY_LABEL
        }
    }

    /// Temporary marker position, if one is shown.
    #[must_use]
    pub fn marker(&self) -> Option<GeoPoint> {
        match self.state {
            LocateState::Marked { position, .. } => Some(position),
            _ => None,
        }
    }

    /// Button pressed. `available` tells whether any location capability exists.
    pub fn press(&mut self, available: bool) -> PressOutcome {
        if !self.is_enabled() {
            return PressOutcome::Ignored;
        }
        if !available {
            warn!("Location requested but no provider is available");
            return PressOutcome::Notify(UNSUPPORTED_MESSAGE.to_string());
        }
        self.state = LocateState::Locating;
        PressOutcome::Request(self.options)
    }

    /// Position received. Returns the zoom to center on, or `None` if no
    /// request was outstanding.
    pub fn succeed(&mut self, position: GeoPoint, now: Instant) -> Option<f64> {
        if self.state != LocateState::Locating {
            return None;
        }
        info!("Located user at {:.5}, {:.5}", position.lat, position.lng);
        self.state = LocateState::Marked {
            position,
            expires_at: now + self.marker_lifetime,
        };
        Some(LOCATE_ZOOM)
    }

    /// Request failed. Returns the notice text, or `None` if no request was
    /// outstanding.
    pub fn fail(&mut self, error: &LocateError) -> Option<String> {
        if self.state != LocateState::Locating {
            return None;
        }
        warn!("Location request failed: {error}");
        self.state = LocateState::Idle;
        Some(format!("Unable to get your location: {error}"))
    }

    /// Advance timers. Returns `true` when the temporary marker was removed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let LocateState::Marked { expires_at, .. } = self.state {
            if now >= expires_at {
                self.state = LocateState::Idle;
                return true;
            }
        }
        false
    }

    /// When the next timer fires, so the UI can schedule a repaint.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            LocateState::Marked { expires_at, .. } => Some(expires_at),
            _ => None,
        }
    }
}
