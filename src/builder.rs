//! Builder for a [`ClusteredMap`] with markers, region and host hooks.

use crate::config::Config;
use crate::error::Result;
use crate::map::{Callbacks, ClusteredMap};
use crate::marker::{DisplayedFeature, Feature, Marker};
use crate::render::{ClusterMarker, ClusterRenderProps};
use clustermap_types::region::Region;
use std::fmt;

/// Builder for a clustered map with its initial markers, region and callbacks.
pub struct ClusteredMapBuilder<T> {
    config: Config,
    markers: Vec<Marker<T>>,
    region: Option<Region>,
    initial_region: Option<Region>,
    callbacks: Callbacks,
}

impl<T> ClusteredMapBuilder<T> {
    /// Create a builder with the default configuration and no markers.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            markers: Vec::new(),
            region: None,
            initial_region: None,
            callbacks: Callbacks::default(),
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn markers(mut self, markers: Vec<Marker<T>>) -> Self {
        self.markers = markers;
        self
    }

    /// Set the controlled region. Takes precedence over `initial_region`.
    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Region to start from when no controlled region is given.
    pub fn initial_region(mut self, region: Region) -> Self {
        self.initial_region = Some(region);
        self
    }

    /// Called after a cluster press has been resolved to its leaves.
    pub fn on_cluster_press<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&DisplayedFeature, &[Feature]) + 'static,
    {
        self.callbacks.on_cluster_press = Some(Box::new(callback));
        self
    }

    /// Called when the host map settles on a new region, before the rebuild.
    pub fn on_region_change_complete<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Region, &[DisplayedFeature]) + 'static,
    {
        self.callbacks.on_region_change_complete = Some(Box::new(callback));
        self
    }

    /// Replace the default cluster glyph.
    pub fn render_cluster<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ClusterRenderProps<'_>) -> ClusterMarker + 'static,
    {
        self.callbacks.render_cluster = Some(Box::new(hook));
        self
    }

    /// Choose the cluster color per feature.
    pub fn cluster_color_with<F>(mut self, color: F) -> Self
    where
        F: Fn(&DisplayedFeature) -> String + 'static,
    {
        self.callbacks.cluster_color = Some(Box::new(color));
        self
    }

    /// Validate the configuration and run the first build.
    pub fn build(self) -> Result<ClusteredMap<T>> {
        let region = self.region.or(self.initial_region);
        ClusteredMap::from_parts(self.config, self.markers, region, self.callbacks)
    }
}

impl<T> Default for ClusteredMapBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ClusteredMapBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusteredMapBuilder")
            .field("config", &self.config)
            .field("markers", &self.markers.len())
            .field("region", &self.region)
            .field("initial_region", &self.initial_region)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}
