use geo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees.
///
/// Unlike `geo::Rect`, the corners are not normalised: `west > east` is a
/// valid box that crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude
    pub west: f64,
    /// Southern latitude
    pub south: f64,
    /// Eastern longitude
    pub east: f64,
    /// Northern latitude
    pub north: f64,
}

impl BoundingBox {
    /// Create a bounding box from its four edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustermap_types::bbox::BoundingBox;
    ///
    /// let manhattan = BoundingBox::new(-74.02, 40.70, -73.93, 40.80);
    /// assert!(manhattan.width() > 0.0);
    /// ```
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// The whole world, `[-180, -90, 180, 90]`.
    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Longitudinal extent in degrees. Negative for a box crossing the antimeridian.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitudinal extent in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Whether every edge is a finite number.
    pub fn is_finite(&self) -> bool {
        self.west.is_finite()
            && self.south.is_finite()
            && self.east.is_finite()
            && self.north.is_finite()
    }

    /// Check if a point (x = longitude, y = latitude) lies inside the box.
    ///
    /// Boxes crossing the antimeridian are handled.
    pub fn contains_point(&self, point: &Point) -> bool {
        let in_lat = point.y() >= self.south && point.y() <= self.north;
        let in_lng = if self.west <= self.east {
            point.x() >= self.west && point.x() <= self.east
        } else {
            point.x() >= self.west || point.x() <= self.east
        };
        in_lat && in_lng
    }

    /// Convert to a normalised `geo::Rect`.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            geo::coord! { x: self.west, y: self.south },
            geo::coord! { x: self.east, y: self.north },
        )
    }
}

impl From<Rect> for BoundingBox {
    fn from(rect: Rect) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_point_across_antimeridian() {
        let bbox = BoundingBox::new(170.0, -10.0, -170.0, 10.0);
        assert!(bbox.contains_point(&Point::new(175.0, 0.0)));
        assert!(bbox.contains_point(&Point::new(-175.0, 0.0)));
        assert!(!bbox.contains_point(&Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_rect_roundtrip_normalises() {
        let bbox: BoundingBox = BoundingBox::new(10.0, 5.0, -10.0, -5.0).to_rect().into();
        assert_eq!(bbox, BoundingBox::new(-10.0, -5.0, 10.0, 5.0));
    }
}
