use crate::bbox::BoundingBox;
use geo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// The visible area of a map, expressed as a center plus latitude and
/// longitude spans.
///
/// A negative `longitude_delta` denotes a region wrapped across the
/// antimeridian; consumers add 360° to recover the real span.
///
/// # Examples
///
/// ```
/// use clustermap_types::region::Region;
///
/// let region = Region::new(51.5074, -0.1278, 0.2, 0.3);
/// assert_eq!(region.center().x(), -0.1278);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Center latitude in degrees
    pub latitude: f64,
    /// Center longitude in degrees
    pub longitude: f64,
    /// Latitudinal span in degrees
    pub latitude_delta: f64,
    /// Longitudinal span in degrees
    pub longitude_delta: f64,
}

impl Region {
    pub fn new(latitude: f64, longitude: f64, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            latitude,
            longitude,
            latitude_delta,
            longitude_delta,
        }
    }

    /// Smallest region covering a rectangle (x = longitude, y = latitude).
    pub fn from_rect(rect: Rect) -> Self {
        let center = rect.center();
        Self::new(center.y, center.x, rect.height(), rect.width())
    }

    /// The region center as a point (x = longitude, y = latitude).
    pub fn center(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }

    /// Whether the center and both spans are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude_delta.is_finite()
            && self.longitude_delta.is_finite()
    }

    /// Longitudinal span with antimeridian wrapping undone.
    pub fn unwrapped_longitude_delta(&self) -> f64 {
        if self.longitude_delta < 0.0 {
            self.longitude_delta + 360.0
        } else {
            self.longitude_delta
        }
    }

    /// The area actually on screen: half a span on each side of the center.
    pub fn visible_bounds(&self) -> BoundingBox {
        let half_lng = self.unwrapped_longitude_delta() / 2.0;
        let half_lat = self.latitude_delta / 2.0;
        BoundingBox::new(
            self.longitude - half_lng,
            self.latitude - half_lat,
            self.longitude + half_lng,
            self.latitude + half_lat,
        )
    }
}
