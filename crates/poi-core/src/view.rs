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

//! Map view geometry: coordinates, bounds, viewport fitting and animated
//! view transitions.
//!
//! All projection math is Web Mercator with 256 px tiles, the same tiling
//! scheme the map widget renders.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

const TILE_SIZE: f64 = 256.0;
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Duration of an animated view change.
pub const ANIMATION_DURATION: Duration = Duration::from_millis(350);

/// A coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Axis-aligned lat/lng rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl GeoBounds {
    /// Smallest bounds containing every point, `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            south_west: first,
            north_east: first,
        };
        for p in iter {
            bounds.south_west.lat = bounds.south_west.lat.min(p.lat);
            bounds.south_west.lng = bounds.south_west.lng.min(p.lng);
            bounds.north_east.lat = bounds.north_east.lat.max(p.lat);
            bounds.north_east.lng = bounds.north_east.lng.max(p.lng);
        }
        Some(bounds)
    }

    /// Grow the bounds on every side by `ratio` of their height and width.
    #[must_use]
    pub fn pad(self, ratio: f64) -> Self {
        let lat_buffer = (self.north_east.lat - self.south_west.lat).abs() * ratio;
        let lng_buffer = (self.north_east.lng - self.south_west.lng).abs() * ratio;
        Self {
            south_west: GeoPoint::new(
                self.south_west.lat - lat_buffer,
                self.south_west.lng - lng_buffer,
            ),
            north_east: GeoPoint::new(
                self.north_east.lat + lat_buffer,
                self.north_east.lng + lng_buffer,
            ),
        }
    }
}

/// Project to world pixel coordinates at zoom 0 (0..256 on both axes).
fn project(p: GeoPoint) -> (f64, f64) {
    let lat = p.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (p.lng + 180.0) / 360.0 * TILE_SIZE;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * TILE_SIZE;
    (x, y)
}

fn unproject(x: f64, y: f64) -> GeoPoint {
    let lng = x / TILE_SIZE * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y / TILE_SIZE);
    let lat = n.sinh().atan().to_degrees();
    GeoPoint::new(lat, lng)
}

/// Center and zoom that show `bounds` inside a `width` x `height` pixel
/// viewport. Zoom is snapped down to an integer and clamped to
/// `min_zoom..=max_zoom`; degenerate bounds (a single point) get `max_zoom`.
/// Returns `None` while the viewport has no area.
#[must_use]
pub fn fit_bounds(
    bounds: GeoBounds,
    width: f32,
    height: f32,
    min_zoom: f64,
    max_zoom: f64,
) -> Option<(GeoPoint, f64)> {
    if !(width > 0.0 && height > 0.0) {
        return None;
    }
    let (x0, y1) = project(bounds.south_west);
    let (x1, y0) = project(bounds.north_east);
    let center = unproject((x0 + x1) / 2.0, (y0 + y1) / 2.0);

    let span_x = (x1 - x0).abs();
    let span_y = (y1 - y0).abs();
    let scale_x = if span_x > f64::EPSILON { f64::from(width) / span_x } else { f64::INFINITY };
    let scale_y = if span_y > f64::EPSILON { f64::from(height) / span_y } else { f64::INFINITY };
    let scale = scale_x.min(scale_y);

    let zoom = if scale.is_finite() {
        scale.log2().floor().clamp(min_zoom, max_zoom)
    } else {
        max_zoom
    };
    Some((center, zoom))
}

/// A pending change of the map view, produced by the controller and applied
/// by whatever owns the map widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewRequest {
    /// Center on a point at a fixed zoom.
    SetView {
        center: GeoPoint,
        zoom: f64,
        animate: bool,
    },
    /// Show the whole (already padded) region.
    Fit { bounds: GeoBounds },
}

/// Interpolated transition between two views.
#[derive(Debug, Clone, Copy)]
pub struct ViewAnimation {
    from: (GeoPoint, f64),
    to: (GeoPoint, f64),
    started: Instant,
    duration: Duration,
}

impl ViewAnimation {
    #[must_use]
    pub fn new(from: (GeoPoint, f64), to: (GeoPoint, f64), started: Instant) -> Self {
        Self {
            from,
            to,
            started,
            duration: ANIMATION_DURATION,
        }
    }

    /// View at `now` and whether the animation has finished.
    #[must_use]
    pub fn sample(&self, now: Instant) -> (GeoPoint, f64, bool) {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed >= self.duration {
            return (self.to.0, self.to.1, true);
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        // ease-out cubic
        let k = 1.0 - (1.0 - t).powi(3);
        let lerp = |a: f64, b: f64| a + (b - a) * k;
        let center = GeoPoint::new(
            lerp(self.from.0.lat, self.to.0.lat),
            lerp(self.from.0.lng, self.to.0.lng),
        );
        (center, lerp(self.from.1, self.to.1), false)
    }
}

/// Turns [`ViewRequest`]s into the view the map shows each frame.
///
/// Fits wait until the viewport has a size; animated changes run from the
/// view current when they were requested. Output zoom is clamped to the
/// configured range.
#[derive(Debug, Clone)]
pub struct ViewDriver {
    min_zoom: f64,
    max_zoom: f64,
    jump: Option<(GeoPoint, f64)>,
    fit: Option<GeoBounds>,
    animation: Option<ViewAnimation>,
}

impl ViewDriver {
    #[must_use]
    pub fn new(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom: max_zoom.max(min_zoom),
            jump: None,
            fit: None,
            animation: None,
        }
    }

    /// Queue `request`; `current` is the view on screen at `now`. A new
    /// request replaces whatever was still pending.
    pub fn request(&mut self, request: ViewRequest, current: (GeoPoint, f64), now: Instant) {
        self.jump = None;
        self.fit = None;
        self.animation = None;
        match request {
            ViewRequest::SetView {
                center,
                zoom,
                animate: true,
            } => {
                self.animation = Some(ViewAnimation::new(current, (center, self.clamp(zoom)), now));
            }
            ViewRequest::SetView { center, zoom, .. } => self.jump = Some((center, self.clamp(zoom))),
            ViewRequest::Fit { bounds } => self.fit = Some(bounds),
        }
    }

    /// View to apply this frame for a `width` x `height` viewport, if any.
    pub fn step(&mut self, width: f32, height: f32, now: Instant) -> Option<(GeoPoint, f64)> {
        if let Some(bounds) = self.fit {
            let view = fit_bounds(bounds, width, height, self.min_zoom, self.max_zoom)?;
            self.fit = None;
            return Some(view);
        }
        if let Some(view) = self.jump.take() {
            return Some(view);
        }
        let animation = self.animation?;
        let (center, zoom, done) = animation.sample(now);
        if done {
            self.animation = None;
        }
        Some((center, zoom))
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Stop a running animation where it is, e.g. when the user drags.
    pub fn cancel_animation(&mut self) {
        self.animation = None;
    }

    fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_bounds_from_points() {
        let b = GeoBounds::from_points([
            GeoPoint::new(40.0, -74.0),
            GeoPoint::new(41.0, -75.0),
            GeoPoint::new(40.5, -73.0),
        ])
        .unwrap();
        assert_eq!(b.south_west, GeoPoint::new(40.0, -75.0));
        assert_eq!(b.north_east, GeoPoint::new(41.0, -73.0));
        assert!(GeoBounds::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_pad_grows_each_side() {
        let b = GeoBounds::from_points([GeoPoint::new(0.0, 0.0), GeoPoint::new(10.0, 20.0)])
            .unwrap()
            .pad(0.12);
        assert!(approx(b.south_west.lat, -1.2));
        assert!(approx(b.south_west.lng, -2.4));
        assert!(approx(b.north_east.lat, 11.2));
        assert!(approx(b.north_east.lng, 22.4));
    }

    #[test]
    fn test_projection_round_trip_at_origin() {
        let (x, y) = project(GeoPoint::new(0.0, 0.0));
        assert!(approx(x, 128.0));
        assert!(approx(y, 128.0));
        let p = unproject(x, y);
        assert!(approx(p.lat, 0.0) && approx(p.lng, 0.0));
    }

    #[test]
    fn test_fit_whole_world_in_one_tile() {
        let bounds = GeoBounds {
            south_west: GeoPoint::new(-80.0, -180.0),
            north_east: GeoPoint::new(80.0, 180.0),
        };
        let (center, zoom) = fit_bounds(bounds, 256.0, 256.0, 0.0, 19.0).unwrap();
        assert!(approx(center.lng, 0.0));
        assert!(center.lat.abs() < 1e-6);
        assert!(approx(zoom, 0.0));
    }

    #[test]
    fn test_fit_zoom_increases_with_viewport() {
        let bounds = GeoBounds::from_points([GeoPoint::new(40.6, -74.1), GeoPoint::new(40.8, -73.9)])
            .unwrap();
        let (_, small) = fit_bounds(bounds, 200.0, 200.0, 0.0, 19.0).unwrap();
        let (_, large) = fit_bounds(bounds, 1600.0, 1600.0, 0.0, 19.0).unwrap();
        assert!(large > small);
        assert!(approx(large - small, 3.0));
    }

    #[test]
    fn test_fit_single_point_uses_max_zoom() {
        let p = GeoPoint::new(40.7, -74.0);
        let bounds = GeoBounds::from_points([p]).unwrap().pad(0.12);
        let (center, zoom) = fit_bounds(bounds, 800.0, 600.0, 0.0, 18.0).unwrap();
        assert!(approx(center.lat, 40.7) && approx(center.lng, -74.0));
        assert!(approx(zoom, 18.0));
    }

    #[test]
    fn test_animation_reaches_target() {
        let start = Instant::now();
        let anim = ViewAnimation::new(
            (GeoPoint::new(0.0, 0.0), 5.0),
            (GeoPoint::new(10.0, 20.0), 15.0),
            start,
        );
        let (c, z, done) = anim.sample(start);
        assert!(!done);
        assert!(approx(c.lat, 0.0) && approx(z, 5.0));

        let (c, z, done) = anim.sample(start + Duration::from_millis(175));
        assert!(!done);
        assert!(c.lat > 5.0 && c.lat < 10.0);
        assert!(z > 10.0 && z < 15.0);

        let (c, z, done) = anim.sample(start + ANIMATION_DURATION);
        assert!(done);
        assert_eq!(c, GeoPoint::new(10.0, 20.0));
        assert!(approx(z, 15.0));
    }

    fn spread_bounds() -> GeoBounds {
        GeoBounds {
            south_west: GeoPoint::new(40.0, -74.5),
            north_east: GeoPoint::new(41.0, -73.0),
        }
    }

    #[test]
    fn test_fit_needs_a_viewport_with_area() {
        let bounds = spread_bounds();
        assert!(fit_bounds(bounds, 0.0, 0.0, 1.0, 19.0).is_none());
        assert!(fit_bounds(bounds, 800.0, 0.0, 1.0, 19.0).is_none());
        assert!(fit_bounds(bounds, -5.0, 600.0, 1.0, 19.0).is_none());
        let (_, zoom) = fit_bounds(bounds, 800.0, 600.0, 1.0, 19.0).unwrap();
        assert!(approx(zoom, 9.0));
    }

    #[test]
    fn test_driver_holds_fit_until_viewport_has_size() {
        let now = Instant::now();
        let mut driver = ViewDriver::new(1.0, 19.0);
        driver.request(
            ViewRequest::Fit {
                bounds: spread_bounds(),
            },
            (GeoPoint::new(0.0, 0.0), 3.0),
            now,
        );
        assert!(driver.step(0.0, 0.0, now).is_none());
        assert!(driver.step(0.0, 0.0, now).is_none());
        let (center, zoom) = driver.step(800.0, 600.0, now).unwrap();
        assert!(approx(zoom, 9.0));
        assert!(center.lat > 40.0 && center.lat < 41.0);
        assert!(approx(center.lng, -73.75));
        // applied once
        assert!(driver.step(800.0, 600.0, now).is_none());
    }

    #[test]
    fn test_driver_animates_to_located_position() {
        let start = Instant::now();
        let mut driver = ViewDriver::new(1.0, 19.0);
        driver.request(
            ViewRequest::SetView {
                center: GeoPoint::new(40.70, -74.00),
                zoom: 14.0,
                animate: true,
            },
            (GeoPoint::new(40.0, -73.0), 10.0),
            start,
        );
        assert!(driver.is_animating());

        let (mid, mid_zoom) = driver.step(800.0, 600.0, start + ANIMATION_DURATION / 2).unwrap();
        assert!(mid.lat > 40.0 && mid.lat < 40.70);
        assert!(mid_zoom > 10.0 && mid_zoom < 14.0);

        let (center, zoom) = driver.step(800.0, 600.0, start + ANIMATION_DURATION).unwrap();
        assert_eq!(center, GeoPoint::new(40.70, -74.00));
        assert!(approx(zoom, 14.0));
        assert!(!driver.is_animating());
        assert!(driver.step(800.0, 600.0, start + ANIMATION_DURATION * 2).is_none());
    }

    #[test]
    fn test_driver_jumps_and_clamps_zoom() {
        let now = Instant::now();
        let mut driver = ViewDriver::new(1.0, 18.0);
        driver.request(
            ViewRequest::SetView {
                center: GeoPoint::new(51.5, -0.12),
                zoom: 30.0,
                animate: false,
            },
            (GeoPoint::new(0.0, 0.0), 3.0),
            now,
        );
        assert!(!driver.is_animating());
        let (center, zoom) = driver.step(800.0, 600.0, now).unwrap();
        assert_eq!(center, GeoPoint::new(51.5, -0.12));
        assert!(approx(zoom, 18.0));
        assert!(driver.step(800.0, 600.0, now).is_none());
    }

    #[test]
    fn test_driver_cancel_and_replace() {
        let now = Instant::now();
        let mut driver = ViewDriver::new(1.0, 19.0);
        let set = ViewRequest::SetView {
            center: GeoPoint::new(1.0, 1.0),
            zoom: 15.0,
            animate: true,
        };
        driver.request(set, (GeoPoint::new(0.0, 0.0), 5.0), now);
        driver.cancel_animation();
        assert!(driver.step(800.0, 600.0, now).is_none());

        driver.request(set, (GeoPoint::new(0.0, 0.0), 5.0), now);
        driver.request(
            ViewRequest::Fit {
                bounds: spread_bounds(),
            },
            (GeoPoint::new(0.0, 0.0), 5.0),
            now,
        );
        assert!(!driver.is_animating());
        let (_, zoom) = driver.step(800.0, 600.0, now).unwrap();
        assert!(approx(zoom, 9.0));
    }
}
