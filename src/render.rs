//! Turns the displayed feature list into a render list for the host.
//!
//! Points render as the host's own markers. Clusters render as a
//! [`ClusterMarker`] description, either the default one or whatever the
//! `render_cluster` hook returns.

use crate::marker::{DisplayedFeature, Marker};
use geo::Point;

/// Dimensions of a default cluster glyph, growing with the point count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    /// Outer halo width in pixels
    pub width: f64,
    /// Outer halo height in pixels
    pub height: f64,
    /// Inner bubble diameter in pixels
    pub size: f64,
    pub font_size: f64,
}

impl MarkerStyle {
    pub fn for_point_count(point_count: usize) -> Self {
        let (outer, size, font_size) = match point_count {
            50.. => (84.0, 64.0, 20.0),
            25.. => (78.0, 58.0, 19.0),
            15.. => (72.0, 54.0, 18.0),
            10.. => (66.0, 50.0, 17.0),
            8.. => (60.0, 46.0, 17.0),
            4.. => (54.0, 40.0, 16.0),
            _ => (48.0, 36.0, 15.0),
        };
        Self {
            width: outer,
            height: outer,
            size,
            font_size,
        }
    }
}

/// Everything needed to draw one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterMarker {
    /// Stable key for the host's reconciliation
    pub key: String,
    /// The cluster; hand it back to `ClusteredMap::press_cluster` on tap
    pub feature: DisplayedFeature,
    pub coordinate: Point,
    pub label: String,
    pub color: String,
    pub text_color: String,
    pub style: MarkerStyle,
}

/// Input handed to a `render_cluster` hook.
#[derive(Debug, Clone, Copy)]
pub struct ClusterRenderProps<'a> {
    pub key: &'a str,
    pub feature: &'a DisplayedFeature,
    pub cluster_color: &'a str,
    pub cluster_text_color: &'a str,
}

impl ClusterRenderProps<'_> {
    /// The glyph that is drawn when no hook is installed.
    pub fn default_marker(&self) -> ClusterMarker {
        let feature = &self.feature.feature;
        ClusterMarker {
            key: self.key.to_string(),
            feature: self.feature.clone(),
            coordinate: feature.geometry,
            label: feature.point_count_abbreviated(),
            color: self.cluster_color.to_string(),
            text_color: self.cluster_text_color.to_string(),
            style: MarkerStyle::for_point_count(feature.point_count),
        }
    }
}

/// One entry of the render list.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderItem<'a, T> {
    /// A host marker drawn unchanged: an unclustered point or a passthrough marker
    Marker(&'a Marker<T>),
    Cluster(ClusterMarker),
}

/// Key for the cluster at `position` in the displayed list.
pub fn cluster_key(feature: &DisplayedFeature, position: usize) -> String {
    format!("cluster-{}-{}", feature.feature.id, position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::Feature;

    #[test]
    fn test_style_thresholds() {
        assert_eq!(MarkerStyle::for_point_count(2).size, 36.0);
        assert_eq!(MarkerStyle::for_point_count(4).size, 40.0);
        assert_eq!(MarkerStyle::for_point_count(9).width, 60.0);
        assert_eq!(MarkerStyle::for_point_count(24).font_size, 18.0);
        assert_eq!(MarkerStyle::for_point_count(5000).width, 84.0);
    }

    #[test]
    fn test_default_marker() {
        let feature = DisplayedFeature::new(
            Some("shop".to_string()),
            Feature::cluster(1234, Point::new(1.0, 2.0), 1500),
        );
        let key = cluster_key(&feature, 3);
        let props = ClusterRenderProps {
            key: &key,
            feature: &feature,
            cluster_color: "#00B386",
            cluster_text_color: "#FFFFFF",
        };

        let marker = props.default_marker();
        assert_eq!(marker.key, "cluster-1234-3");
        assert_eq!(marker.label, "1.5k");
        assert_eq!(marker.coordinate, Point::new(1.0, 2.0));
        assert_eq!(marker.style, MarkerStyle::for_point_count(1500));
    }
}
