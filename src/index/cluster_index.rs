//! Hierarchical greedy point clustering.
//!
//! Points are projected to spherical-mercator unit space and stored as the
//! level above `max_zoom`. Each lower level is derived from the one above
//! it by merging every unprocessed item with its unprocessed neighbours
//! within `radius / (extent * 2^zoom)`. Every merge records the new
//! cluster id on the merged items, so any cluster can be walked back down
//! to its leaves.

use super::tree::LevelTree;
use crate::compute::projection::{lat_y, lng_x, x_lng, y_lat};
use crate::compute::validation::validate_features;
use crate::config::{Config, MAX_SUPPORTED_ZOOM};
use crate::error::{ClusterError, Result};
use crate::marker::Feature;
use clustermap_types::bbox::BoundingBox;
use geo::Point;

/// Cluster ids reserve the low five bits for the zoom level they were formed at.
const ZOOM_BITS: usize = 5;
const ZOOM_MASK: usize = (1 << ZOOM_BITS) - 1;

/// Tuning parameters for a [`ClusterIndex`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexOptions {
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Cluster radius in pixels
    pub radius: f64,
    /// Tile extent the radius is relative to
    pub extent: f64,
    /// R-tree node capacity hint
    pub node_size: usize,
    /// Minimum number of points to form a cluster
    pub min_points: usize,
}

impl IndexOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            radius: config.radius,
            extent: config.extent,
            node_size: config.node_size,
            min_points: config.min_points,
        }
    }

    /// Neighbourhood radius in unit space at `zoom`.
    fn radius_at(&self, zoom: i32) -> f64 {
        self.radius / (self.extent * 2f64.powi(zoom))
    }

    fn validate(&self) -> Result<()> {
        if self.min_zoom > self.max_zoom || self.max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(ClusterError::InvalidConfig(format!(
                "zoom range {}..={} is not within 0..={}",
                self.min_zoom, self.max_zoom, MAX_SUPPORTED_ZOOM
            )));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ClusterError::InvalidConfig(format!(
                "radius must be positive, got: {}",
                self.radius
            )));
        }
        if !(self.extent.is_finite() && self.extent > 0.0) {
            return Err(ClusterError::InvalidConfig(format!(
                "extent must be positive, got: {}",
                self.extent
            )));
        }
        if self.min_points < 2 {
            return Err(ClusterError::InvalidConfig(format!(
                "min_points must be >= 2, got: {}",
                self.min_points
            )));
        }
        Ok(())
    }
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// An item in one zoom level: a point or a cluster.
#[derive(Debug, Clone)]
struct LevelNode {
    x: f64,
    y: f64,
    /// Set once the item has been visited while building the level below
    processed: bool,
    /// Leaf index for points, cluster id for clusters
    id: usize,
    /// Cluster that absorbed this item in the level below
    parent: Option<usize>,
    num_points: usize,
}

impl LevelNode {
    fn carried(&self) -> Self {
        Self {
            processed: false,
            parent: None,
            ..self.clone()
        }
    }
}

#[derive(Debug)]
struct Level {
    nodes: Vec<LevelNode>,
    tree: LevelTree,
}

impl Level {
    fn new(nodes: Vec<LevelNode>, node_size: usize) -> Self {
        let tree = LevelTree::bulk_load(nodes.iter().map(|n| [n.x, n.y]), node_size);
        Self { nodes, tree }
    }
}

/// Immutable multi-zoom cluster index over one set of point features.
#[derive(Debug)]
pub struct ClusterIndex {
    options: IndexOptions,
    points: Vec<Feature>,
    /// Indexed by zoom; `None` below `min_zoom`
    levels: Vec<Option<Level>>,
}

impl ClusterIndex {
    /// Build the index. Fails on an empty set, invalid options or a point
    /// with out-of-range coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustermap::index::{ClusterIndex, IndexOptions};
    /// use clustermap::{BoundingBox, Feature, Point};
    ///
    /// let points = vec![
    ///     Feature::point(0, Point::new(0.0, 0.0)),
    ///     Feature::point(1, Point::new(0.0001, 0.0)),
    /// ];
    /// let index = ClusterIndex::load(points, IndexOptions::default())?;
    ///
    /// let world = index.clusters(&BoundingBox::world(), 1);
    /// assert_eq!(world.len(), 1);
    /// assert_eq!(world[0].point_count, 2);
    /// # Ok::<(), clustermap::ClusterError>(())
    /// ```
    pub fn load(points: Vec<Feature>, options: IndexOptions) -> Result<Self> {
        options.validate()?;
        if points.is_empty() {
            return Err(ClusterError::EmptyIndex);
        }
        validate_features(&points)?;

        let leaf_nodes: Vec<LevelNode> = points
            .iter()
            .enumerate()
            .map(|(i, p)| LevelNode {
                x: lng_x(p.geometry.x()),
                y: lat_y(p.geometry.y()),
                processed: false,
                id: i,
                parent: None,
                num_points: 1,
            })
            .collect();

        let top = usize::from(options.max_zoom) + 1;
        let mut levels: Vec<Option<Level>> = (0..=top).map(|_| None).collect();
        let mut above = Level::new(leaf_nodes, options.node_size);

        for zoom in (options.min_zoom..=options.max_zoom).rev() {
            let nodes = cluster_level(&mut above, zoom, &options, points.len());
            let below = Level::new(nodes, options.node_size);
            levels[usize::from(zoom) + 1] = Some(above);
            above = below;
        }
        levels[usize::from(options.min_zoom)] = Some(above);

        log::debug!(
            "Built cluster index over {} points for zooms {}..={}",
            points.len(),
            options.min_zoom,
            options.max_zoom
        );

        Ok(Self {
            options,
            points,
            levels,
        })
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// Number of leaf points in the index. Never zero.
    pub fn leaf_count(&self) -> usize {
        self.points.len()
    }

    /// Number of items (points and clusters) at `zoom` across the whole world.
    pub fn level_size(&self, zoom: u8) -> usize {
        self.level(self.limit_zoom(zoom))
            .map_or(0, |level| level.nodes.len())
    }

    /// Points and clusters inside `bbox` at `zoom`.
    ///
    /// `zoom` is clamped to `min_zoom..=max_zoom + 1`; at `max_zoom + 1`
    /// every result is a raw point. A box crossing the antimeridian is
    /// answered as its eastern half followed by its western half.
    pub fn clusters(&self, bbox: &BoundingBox, zoom: u8) -> Vec<Feature> {
        if !bbox.is_finite() {
            log::warn!("Rejecting cluster query with non-finite bounding box");
            return Vec::new();
        }

        let mut min_lng = normalize_lng(bbox.west);
        let min_lat = bbox.south.clamp(-90.0, 90.0);
        let mut max_lng = if bbox.east == 180.0 {
            180.0
        } else {
            normalize_lng(bbox.east)
        };
        let max_lat = bbox.north.clamp(-90.0, 90.0);

        if bbox.east - bbox.west >= 360.0 {
            min_lng = -180.0;
            max_lng = 180.0;
        } else if min_lng > max_lng {
            let mut eastern =
                self.clusters(&BoundingBox::new(min_lng, min_lat, 180.0, max_lat), zoom);
            let western =
                self.clusters(&BoundingBox::new(-180.0, min_lat, max_lng, max_lat), zoom);
            eastern.extend(western);
            return eastern;
        }

        let Some(level) = self.level(self.limit_zoom(zoom)) else {
            return Vec::new();
        };

        level
            .tree
            .range(lng_x(min_lng), lat_y(max_lat), lng_x(max_lng), lat_y(min_lat))
            .into_iter()
            .map(|slot| self.node_feature(&level.nodes[slot]))
            .collect()
    }

    /// Immediate children of a cluster, one zoom level down. Children may
    /// themselves be clusters.
    pub fn children(&self, cluster_id: usize) -> Result<Vec<Feature>> {
        let (origin_slot, origin_zoom) = self
            .decode(cluster_id)
            .ok_or(ClusterError::ClusterNotFound(cluster_id))?;
        let level = self
            .level(origin_zoom)
            .ok_or(ClusterError::ClusterNotFound(cluster_id))?;
        let origin = level
            .nodes
            .get(origin_slot)
            .ok_or(ClusterError::ClusterNotFound(cluster_id))?;

        let radius = self.options.radius_at(i32::from(origin_zoom) - 1);
        let children: Vec<Feature> = level
            .tree
            .within(origin.x, origin.y, radius)
            .into_iter()
            .map(|slot| &level.nodes[slot])
            .filter(|node| node.parent == Some(cluster_id))
            .map(|node| self.node_feature(node))
            .collect();

        if children.is_empty() {
            return Err(ClusterError::ClusterNotFound(cluster_id));
        }
        Ok(children)
    }

    /// Raw points under a cluster, depth first, skipping `offset` and
    /// returning at most `limit`.
    pub fn leaves(&self, cluster_id: usize, limit: usize, offset: usize) -> Result<Vec<Feature>> {
        let mut leaves = Vec::new();
        if limit > 0 {
            self.append_leaves(&mut leaves, cluster_id, limit, offset, 0)?;
        }
        Ok(leaves)
    }

    /// Every raw point under a cluster.
    pub fn all_leaves(&self, cluster_id: usize) -> Result<Vec<Feature>> {
        self.leaves(cluster_id, usize::MAX, 0)
    }

    /// Lowest zoom at which the cluster breaks up into more than one item.
    pub fn cluster_expansion_zoom(&self, cluster_id: usize) -> Result<u8> {
        let (_, origin_zoom) = self
            .decode(cluster_id)
            .ok_or(ClusterError::ClusterNotFound(cluster_id))?;

        let mut cluster_id = cluster_id;
        let mut expansion_zoom = origin_zoom - 1;
        while expansion_zoom <= self.options.max_zoom {
            let children = self.children(cluster_id)?;
            expansion_zoom += 1;
            match children.as_slice() {
                [only] if only.is_cluster() => cluster_id = only.id,
                _ => break,
            }
        }
        Ok(expansion_zoom)
    }

    fn append_leaves(
        &self,
        leaves: &mut Vec<Feature>,
        cluster_id: usize,
        limit: usize,
        offset: usize,
        mut skipped: usize,
    ) -> Result<usize> {
        for child in self.children(cluster_id)? {
            if child.is_cluster() {
                if skipped + child.point_count <= offset {
                    skipped += child.point_count;
                } else {
                    skipped = self.append_leaves(leaves, child.id, limit, offset, skipped)?;
                }
            } else if skipped < offset {
                skipped += 1;
            } else {
                leaves.push(child);
            }

            if leaves.len() == limit {
                break;
            }
        }
        Ok(skipped)
    }

    fn level(&self, zoom: u8) -> Option<&Level> {
        self.levels.get(usize::from(zoom)).and_then(Option::as_ref)
    }

    fn limit_zoom(&self, zoom: u8) -> u8 {
        zoom.clamp(self.options.min_zoom, self.options.max_zoom + 1)
    }

    /// Split a cluster id into (slot in origin level, origin zoom).
    fn decode(&self, cluster_id: usize) -> Option<(usize, u8)> {
        let packed = cluster_id.checked_sub(self.points.len())?;
        let zoom = u8::try_from(packed & ZOOM_MASK).ok()?;
        if zoom == 0 {
            return None;
        }
        Some((packed >> ZOOM_BITS, zoom))
    }

    fn node_feature(&self, node: &LevelNode) -> Feature {
        if node.num_points > 1 {
            Feature::cluster(
                node.id,
                Point::new(x_lng(node.x), y_lat(node.y)),
                node.num_points,
            )
        } else {
            self.points[node.id].clone()
        }
    }
}

/// Derive the items of level `zoom` from the level above it, marking the
/// merged items of `above` with their new parent.
fn cluster_level(
    above: &mut Level,
    zoom: u8,
    options: &IndexOptions,
    leaf_count: usize,
) -> Vec<LevelNode> {
    let radius = options.radius_at(i32::from(zoom));
    let Level { nodes, tree } = above;
    let mut next = Vec::with_capacity(nodes.len());

    for slot in 0..nodes.len() {
        if nodes[slot].processed {
            continue;
        }
        nodes[slot].processed = true;

        let (x, y) = (nodes[slot].x, nodes[slot].y);
        let neighbours = tree.within(x, y, radius);

        let own_points = nodes[slot].num_points;
        let num_points = own_points
            + neighbours
                .iter()
                .map(|&n| &nodes[n])
                .filter(|node| !node.processed)
                .map(|node| node.num_points)
                .sum::<usize>();

        if num_points > own_points && num_points >= options.min_points {
            let cluster_id = (slot << ZOOM_BITS) + usize::from(zoom) + 1 + leaf_count;
            let mut wx = x * own_points as f64;
            let mut wy = y * own_points as f64;

            for &n in &neighbours {
                let node = &mut nodes[n];
                if node.processed {
                    continue;
                }
                node.processed = true;
                node.parent = Some(cluster_id);
                wx += node.x * node.num_points as f64;
                wy += node.y * node.num_points as f64;
            }
            nodes[slot].parent = Some(cluster_id);

            next.push(LevelNode {
                x: wx / num_points as f64,
                y: wy / num_points as f64,
                processed: false,
                id: cluster_id,
                parent: None,
                num_points,
            });
        } else {
            next.push(nodes[slot].carried());
            if num_points > own_points {
                for &n in &neighbours {
                    let node = &mut nodes[n];
                    if node.processed {
                        continue;
                    }
                    node.processed = true;
                    next.push(node.carried());
                }
            }
        }
    }

    next
}

fn normalize_lng(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}
