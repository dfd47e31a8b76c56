//! Configuration for clustering, cluster presses and viewport transitions.
//!
//! Serializable settings live in [`Config`]; host callbacks are attached
//! through [`crate::builder::ClusteredMapBuilder`].
use serde::de::Error;

pub use clustermap_types::config::{AnimationKind, EdgePadding, LayoutAnimation, ViewportSize};

/// Highest zoom level an index may be built for.
///
/// Cluster ids pack `zoom + 1` into five bits, so this must stay below 31.
pub const MAX_SUPPORTED_ZOOM: u8 = 24;

/// Clustering configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// When false every marker is rendered as-is and no index is built
    #[serde(default = "Config::default_true")]
    pub clustering_enabled: bool,

    /// Cluster radius in pixels, relative to `extent`
    #[serde(default = "Config::default_radius")]
    pub radius: f64,

    #[serde(default = "Config::default_min_zoom")]
    pub min_zoom: u8,

    #[serde(default = "Config::default_max_zoom")]
    pub max_zoom: u8,

    /// Tile extent the radius is measured against
    #[serde(default = "Config::default_extent")]
    pub extent: f64,

    /// Target fanout of the per-zoom R-trees
    #[serde(default = "Config::default_node_size")]
    pub node_size: usize,

    /// Minimum number of points that form a cluster
    #[serde(default = "Config::default_min_points")]
    pub min_points: usize,

    /// When true a cluster press only notifies; otherwise the map is fitted to the leaves first
    #[serde(default)]
    pub preserve_cluster_press_behavior: bool,

    #[serde(default = "Config::default_true")]
    pub animation_enabled: bool,

    #[serde(default = "Config::default_cluster_color")]
    pub cluster_color: String,

    #[serde(default = "Config::default_cluster_text_color")]
    pub cluster_text_color: String,

    #[serde(default)]
    pub edge_padding: EdgePadding,

    #[serde(default)]
    pub layout_animation: LayoutAnimation,

    /// Map surface size used to derive zoom levels from regions
    #[serde(default)]
    pub viewport_size: ViewportSize,
}

impl Config {
    const fn default_true() -> bool {
        true
    }

    fn default_radius() -> f64 {
        ViewportSize::default().width * 0.06
    }

    const fn default_min_zoom() -> u8 {
        1
    }

    const fn default_max_zoom() -> u8 {
        20
    }

    const fn default_extent() -> f64 {
        512.0
    }

    const fn default_node_size() -> usize {
        64
    }

    const fn default_min_points() -> usize {
        2
    }

    fn default_cluster_color() -> String {
        "#00B386".to_string()
    }

    fn default_cluster_text_color() -> String {
        "#FFFFFF".to_string()
    }

    pub fn with_clustering_enabled(mut self, enabled: bool) -> Self {
        self.clustering_enabled = enabled;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_extent(mut self, extent: f64) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_node_size(mut self, node_size: usize) -> Self {
        self.node_size = node_size;
        self
    }

    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    pub fn with_preserve_cluster_press_behavior(mut self, preserve: bool) -> Self {
        self.preserve_cluster_press_behavior = preserve;
        self
    }

    pub fn with_edge_padding(mut self, padding: EdgePadding) -> Self {
        self.edge_padding = padding;
        self
    }

    pub fn with_animation(mut self, enabled: bool, animation: LayoutAnimation) -> Self {
        self.animation_enabled = enabled;
        self.layout_animation = animation;
        self
    }

    pub fn with_cluster_colors(
        mut self,
        color: impl Into<String>,
        text_color: impl Into<String>,
    ) -> Self {
        self.cluster_color = color.into();
        self.cluster_text_color = text_color.into();
        self
    }

    /// Set the map surface size. The default radius does not follow this
    /// change; set it explicitly if it should scale with the surface.
    pub fn with_viewport_size(mut self, size: ViewportSize) -> Self {
        if size.width > 2000.0 {
            log::warn!(
                "Viewport width of {} px is unusually large; zoom levels may be overestimated",
                size.width
            );
        }
        self.viewport_size = size;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min_zoom > self.max_zoom {
            return Err(format!(
                "min_zoom ({}) must be <= max_zoom ({})",
                self.min_zoom, self.max_zoom
            ));
        }

        if self.max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(format!(
                "max_zoom ({}) must be <= {}",
                self.max_zoom, MAX_SUPPORTED_ZOOM
            ));
        }

        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(format!("radius must be positive, got: {}", self.radius));
        }

        if !self.extent.is_finite() || self.extent <= 0.0 {
            return Err(format!("extent must be positive, got: {}", self.extent));
        }

        if self.node_size < 4 {
            return Err(format!("node_size must be >= 4, got: {}", self.node_size));
        }

        if self.min_points < 2 {
            return Err(format!("min_points must be >= 2, got: {}", self.min_points));
        }

        if !self.edge_padding.is_valid() {
            return Err("edge_padding values must be finite and non-negative".to_string());
        }

        let size = self.viewport_size;
        if !(size.width.is_finite() && size.height.is_finite())
            || size.width <= 0.0
            || size.height <= 0.0
        {
            return Err(format!(
                "viewport_size must be positive, got: {}x{}",
                size.width, size.height
            ));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clustering_enabled: true,
            radius: Self::default_radius(),
            min_zoom: Self::default_min_zoom(),
            max_zoom: Self::default_max_zoom(),
            extent: Self::default_extent(),
            node_size: Self::default_node_size(),
            min_points: Self::default_min_points(),
            preserve_cluster_press_behavior: false,
            edge_padding: EdgePadding::default(),
            animation_enabled: true,
            layout_animation: LayoutAnimation::default(),
            cluster_color: Self::default_cluster_color(),
            cluster_text_color: Self::default_cluster_text_color(),
            viewport_size: ViewportSize::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.clustering_enabled);
        assert_eq!(config.min_zoom, 1);
        assert_eq!(config.max_zoom, 20);
        assert_eq!(config.node_size, 64);
        assert!((config.radius - 22.5).abs() < 1e-9);
    }

    #[test]
    fn test_validate_rejects_inverted_zoom_range() {
        let config = Config::default().with_zoom_range(10, 5);
        assert!(config.validate().unwrap_err().contains("min_zoom"));
    }

    #[test]
    fn test_validate_rejects_bad_tuning() {
        assert!(Config::default().with_radius(0.0).validate().is_err());
        assert!(Config::default().with_radius(f64::NAN).validate().is_err());
        assert!(Config::default().with_extent(-1.0).validate().is_err());
        assert!(Config::default().with_node_size(2).validate().is_err());
        assert!(Config::default().with_min_points(1).validate().is_err());
        assert!(
            Config::default()
                .with_zoom_range(0, MAX_SUPPORTED_ZOOM + 1)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let config = Config::default()
            .with_radius(60.0)
            .with_zoom_range(2, 16)
            .with_cluster_colors("#FF0000", "#000000");

        let json = config.to_json().unwrap();
        let parsed = Config::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let config = Config::from_json(r#"{"radius": 40.0, "max_zoom": 16}"#).unwrap();
        assert_eq!(config.radius, 40.0);
        assert_eq!(config.max_zoom, 16);
        assert_eq!(config.extent, 512.0);
        assert_eq!(config.edge_padding, EdgePadding::uniform(50.0));
    }

    #[test]
    fn test_json_rejects_invalid_and_unknown() {
        assert!(Config::from_json(r#"{"min_zoom": 12, "max_zoom": 3}"#).is_err());
        assert!(Config::from_json(r#"{"cluster_radius": 40.0}"#).is_err());
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default().with_node_size(16);
        let text = config.to_toml().unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }
}
