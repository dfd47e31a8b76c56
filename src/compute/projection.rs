//! Spherical-mercator projection.
//!
//! Cluster indexes work in unit space, where the world maps onto
//! `[0, 1] x [0, 1]` with `y` growing southwards. Zoom estimation works in
//! tile-pixel space at a given zoom level.

use std::f64::consts::PI;

/// Latitudes beyond this sine are clamped to keep mercator `y` finite.
const MAX_SIN_LATITUDE: f64 = 0.9999;

/// Longitude to unit-space x.
pub fn lng_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

/// Latitude to unit-space y, clamped to `[0, 1]`.
pub fn lat_y(lat: f64) -> f64 {
    let sin = (lat * PI / 180.0).sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    y.clamp(0.0, 1.0)
}

/// Unit-space x back to longitude.
pub fn x_lng(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

/// Unit-space y back to latitude.
pub fn y_lat(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0) * PI / 180.0;
    360.0 * y2.exp().atan() / PI - 90.0
}

/// Project a coordinate to pixel space for square tiles of `tile_size`
/// pixels at `zoom`.
pub fn tile_pixel(lng: f64, lat: f64, zoom: f64, tile_size: f64) -> (f64, f64) {
    let size = tile_size * 2f64.powf(zoom);
    let half = size / 2.0;
    let f = (lat * PI / 180.0)
        .sin()
        .clamp(-MAX_SIN_LATITUDE, MAX_SIN_LATITUDE);

    let x = half + lng * size / 360.0;
    let y = half - 0.5 * ((1.0 + f) / (1.0 - f)).ln() * size / (2.0 * PI);
    (x.min(size), y.min(size))
}
