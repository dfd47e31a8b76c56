//! Markers supplied by the host and the features the engine produces from them.

use geo::Point;

/// A point marker declared by the host map.
///
/// Markers carrying a `marker_type` are clustered together with the other
/// markers of the same type; untyped markers are passed through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker<T> {
    /// Stable identity of the marker
    pub id: String,
    /// Position (x = longitude, y = latitude)
    pub coordinate: Point,
    /// Clustering partition this marker belongs to
    pub marker_type: Option<String>,
    /// Arbitrary display payload, never inspected by the engine
    pub payload: T,
}

impl<T> Marker<T> {
    /// Create an untyped marker.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustermap::{Marker, Point};
    ///
    /// let marker = Marker::new("nyc", Point::new(-74.0060, 40.7128), "New York")
    ///     .with_type("city");
    /// assert_eq!(marker.marker_type.as_deref(), Some("city"));
    /// ```
    pub fn new(id: impl Into<String>, coordinate: Point, payload: T) -> Self {
        Self {
            id: id.into(),
            coordinate,
            marker_type: None,
            payload,
        }
    }

    pub fn with_type(mut self, marker_type: impl Into<String>) -> Self {
        self.marker_type = Some(marker_type.into());
        self
    }

    /// The type tag, if the marker takes part in clustering.
    ///
    /// An empty tag counts as no tag.
    pub fn cluster_type(&self) -> Option<&str> {
        self.marker_type.as_deref().filter(|t| !t.is_empty())
    }

    /// Build the point feature that stands for this marker at `index`.
    pub fn to_feature(&self, index: usize) -> Feature {
        Feature::point(index, self.coordinate)
    }
}

/// A point or cluster returned by a cluster index.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Position (x = longitude, y = latitude); the weighted centroid for clusters
    pub geometry: Point,
    /// Cluster id, or the source marker index for points
    pub id: usize,
    /// Number of aggregated points; 0 for a raw point
    pub point_count: usize,
    /// Source marker index, set only for raw points
    pub index: Option<usize>,
}

impl Feature {
    pub fn point(index: usize, geometry: Point) -> Self {
        Self {
            geometry,
            id: index,
            point_count: 0,
            index: Some(index),
        }
    }

    pub fn cluster(cluster_id: usize, geometry: Point, point_count: usize) -> Self {
        Self {
            geometry,
            id: cluster_id,
            point_count,
            index: None,
        }
    }

    pub fn is_cluster(&self) -> bool {
        self.point_count > 0
    }

    /// Number of markers this feature stands for.
    pub fn weight(&self) -> usize {
        self.point_count.max(1)
    }

    /// Short label for a cluster count: `950`, `1.2k`, `15k`.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustermap::{Feature, Point};
    ///
    /// let origin = Point::new(0.0, 0.0);
    /// assert_eq!(Feature::cluster(1, origin, 950).point_count_abbreviated(), "950");
    /// assert_eq!(Feature::cluster(1, origin, 1234).point_count_abbreviated(), "1.2k");
    /// assert_eq!(Feature::cluster(1, origin, 15_300).point_count_abbreviated(), "15k");
    /// ```
    pub fn point_count_abbreviated(&self) -> String {
        let count = self.point_count;
        if count >= 10_000 {
            format!("{}k", (count as f64 / 1000.0).round())
        } else if count >= 1000 {
            let tenths = (count as f64 / 100.0).round() / 10.0;
            format!("{}k", tenths)
        } else {
            count.to_string()
        }
    }
}

/// A feature selected for display, tagged with the index it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedFeature {
    /// Type of the index that produced the feature; `None` for passthrough markers
    pub marker_type: Option<String>,
    pub feature: Feature,
}

impl DisplayedFeature {
    pub fn new(marker_type: Option<String>, feature: Feature) -> Self {
        Self {
            marker_type,
            feature,
        }
    }

    pub fn is_cluster(&self) -> bool {
        self.feature.is_cluster()
    }

    pub fn is_passthrough(&self) -> bool {
        self.marker_type.is_none()
    }
}
