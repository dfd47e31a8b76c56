//! Resolves a pressed cluster back to its leaf points and, optionally,
//! fits the map to them.

use crate::config::{Config, EdgePadding, LayoutAnimation};
use crate::error::{ClusterError, Result};
use crate::marker::{DisplayedFeature, Feature};
use crate::partition::TypeIndexes;
use clustermap_types::region::Region;
use geo::{BoundingRect, MultiPoint};

/// Commands the engine issues to the host map surface.
pub trait MapSurface {
    /// Move the camera so `region` is visible with `edge_padding` pixels to spare.
    fn fit_to_region(&mut self, region: &Region, edge_padding: &EdgePadding, animated: bool);

    /// Animate the marker layout change that follows the next update.
    fn configure_layout_animation(&mut self, _animation: &LayoutAnimation) {}
}

/// What happens when a cluster is pressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressMode {
    /// Only report the cluster and its leaves
    Notify,
    /// Fit the map to the leaves, then report
    FitToLeaves {
        edge_padding: EdgePadding,
        animated: bool,
    },
}

impl PressMode {
    pub fn from_config(config: &Config) -> Self {
        if config.preserve_cluster_press_behavior {
            Self::Notify
        } else {
            Self::FitToLeaves {
                edge_padding: config.edge_padding,
                animated: config.animation_enabled,
            }
        }
    }
}

/// A pressed cluster together with everything it expanded to.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterExpansion {
    pub feature: DisplayedFeature,
    pub leaves: Vec<Feature>,
    /// Region the map was asked to fit, if any
    pub fitted_region: Option<Region>,
}

/// Expands cluster features through the index of their type.
#[derive(Debug, Clone, Copy)]
pub struct PressResolver<'a> {
    indexes: &'a TypeIndexes,
    mode: PressMode,
}

impl<'a> PressResolver<'a> {
    pub fn new(indexes: &'a TypeIndexes, mode: PressMode) -> Self {
        Self { indexes, mode }
    }

    /// All leaf points under a displayed cluster.
    ///
    /// Fails with `NotACluster` for points and `IndexNotFound` when the
    /// feature's type has no index, e.g. a stale feature after a rebuild.
    /// A stale id that now names a cluster of a different size fails with
    /// `ClusterNotFound`.
    pub fn leaves(&self, feature: &DisplayedFeature) -> Result<Vec<Feature>> {
        if !feature.is_cluster() {
            return Err(ClusterError::NotACluster(feature.feature.id));
        }

        let marker_type = feature.marker_type.as_deref().unwrap_or_default();
        let index = self
            .indexes
            .get(marker_type)
            .ok_or_else(|| ClusterError::IndexNotFound(marker_type.to_string()))?;

        let leaves = index.all_leaves(feature.feature.id)?;
        if leaves.len() != feature.feature.point_count {
            log::debug!(
                "Cluster {} expands to {} leaves, feature expects {}",
                feature.feature.id,
                leaves.len(),
                feature.feature.point_count
            );
            return Err(ClusterError::ClusterNotFound(feature.feature.id));
        }
        Ok(leaves)
    }

    /// Expand a pressed cluster and, in `FitToLeaves` mode, ask the surface
    /// to fit the leaves.
    pub fn resolve(
        &self,
        feature: &DisplayedFeature,
        surface: &mut dyn MapSurface,
    ) -> Result<ClusterExpansion> {
        let leaves = self.leaves(feature)?;

        let fitted_region = match self.mode {
            PressMode::Notify => None,
            PressMode::FitToLeaves {
                edge_padding,
                animated,
            } => {
                let region = leaves_region(&leaves);
                if let Some(region) = &region {
                    surface.fit_to_region(region, &edge_padding, animated);
                }
                region
            }
        };

        Ok(ClusterExpansion {
            feature: feature.clone(),
            leaves,
            fitted_region,
        })
    }
}

/// Smallest region covering every feature position.
pub fn leaves_region(leaves: &[Feature]) -> Option<Region> {
    let points: MultiPoint = leaves.iter().map(|leaf| leaf.geometry).collect();
    points.bounding_rect().map(Region::from_rect)
}
