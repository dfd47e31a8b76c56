//! Type partitioning and per-type index construction.
//!
//! Markers with a type tag are grouped by that tag, in first-seen order,
//! and each group gets its own [`ClusterIndex`]. Untyped markers are never
//! indexed; they are carried as passthrough point features.

use crate::config::Config;
use crate::error::Result;
use crate::index::{ClusterIndex, IndexOptions};
use crate::marker::{Feature, Marker};
use rustc_hash::FxHashMap;

/// Markers split into per-type feature lists plus passthrough features.
#[derive(Debug, Default)]
pub struct Partition {
    /// Type tags in first-seen order
    pub types: Vec<String>,
    pub features: FxHashMap<String, Vec<Feature>>,
    pub passthrough: Vec<Feature>,
}

/// Split markers by type tag. Every feature keeps the marker's position in
/// `markers` as its index.
///
/// # Examples
///
/// ```
/// use clustermap::partition::partition_markers;
/// use clustermap::{Marker, Point};
///
/// let markers = vec![
///     Marker::new("a", Point::new(0.0, 0.0), ()).with_type("shop"),
///     Marker::new("b", Point::new(1.0, 1.0), ()),
///     Marker::new("c", Point::new(2.0, 2.0), ()).with_type("cafe"),
///     Marker::new("d", Point::new(3.0, 3.0), ()).with_type("shop"),
/// ];
///
/// let partition = partition_markers(&markers);
/// assert_eq!(partition.types, vec!["shop", "cafe"]);
/// assert_eq!(partition.features["shop"].len(), 2);
/// assert_eq!(partition.passthrough[0].index, Some(1));
/// ```
pub fn partition_markers<T>(markers: &[Marker<T>]) -> Partition {
    let mut partition = Partition::default();

    for (index, marker) in markers.iter().enumerate() {
        let feature = marker.to_feature(index);
        match marker.cluster_type() {
            Some(marker_type) => {
                if !partition.features.contains_key(marker_type) {
                    partition.types.push(marker_type.to_string());
                }
                partition
                    .features
                    .entry(marker_type.to_string())
                    .or_default()
                    .push(feature);
            }
            None => partition.passthrough.push(feature),
        }
    }

    partition
}

/// Cluster indexes keyed by marker type, iterated in first-seen order.
#[derive(Debug, Default)]
pub struct TypeIndexes {
    order: Vec<String>,
    indexes: FxHashMap<String, ClusterIndex>,
}

impl TypeIndexes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the index built for `marker_type`.
    pub fn get(&self, marker_type: &str) -> Option<&ClusterIndex> {
        self.indexes.get(marker_type)
    }

    pub fn contains(&self, marker_type: &str) -> bool {
        self.indexes.contains_key(marker_type)
    }

    /// Types with an index, in first-seen order.
    pub fn types(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClusterIndex)> {
        self.order.iter().filter_map(|marker_type| {
            self.indexes
                .get(marker_type)
                .map(|index| (marker_type.as_str(), index))
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn insert(&mut self, marker_type: String, index: ClusterIndex) {
        if self.indexes.insert(marker_type.clone(), index).is_none() {
            self.order.push(marker_type);
        }
    }
}

/// Output of one index build: the per-type indexes and the markers that
/// bypass clustering.
#[derive(Debug, Default)]
pub struct BuiltIndexes {
    pub indexes: TypeIndexes,
    pub passthrough: Vec<Feature>,
}

/// Builds a fresh set of per-type indexes from a marker set.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    options: IndexOptions,
    clustering_enabled: bool,
}

impl IndexBuilder {
    pub fn new(options: IndexOptions, clustering_enabled: bool) -> Self {
        Self {
            options,
            clustering_enabled,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(IndexOptions::from_config(config), config.clustering_enabled)
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// Partition `markers` and build one index per type.
    ///
    /// With clustering disabled every marker becomes passthrough and no
    /// index is built. A failure on any type fails the whole build.
    pub fn build<T>(&self, markers: &[Marker<T>]) -> Result<BuiltIndexes> {
        if !self.clustering_enabled {
            let passthrough = markers
                .iter()
                .enumerate()
                .map(|(index, marker)| marker.to_feature(index))
                .collect();
            return Ok(BuiltIndexes {
                indexes: TypeIndexes::new(),
                passthrough,
            });
        }

        let Partition {
            types,
            mut features,
            passthrough,
        } = partition_markers(markers);

        let mut indexes = TypeIndexes::new();
        for marker_type in types {
            let Some(points) = features.remove(&marker_type) else {
                continue;
            };
            if points.is_empty() {
                continue;
            }

            let count = points.len();
            let index = ClusterIndex::load(points, self.options)?;
            log::debug!("Indexed {} markers of type '{}'", count, marker_type);
            indexes.insert(marker_type, index);
        }

        Ok(BuiltIndexes {
            indexes,
            passthrough,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClusterError;
    use geo::Point;

    fn marker(id: &str, lng: f64, lat: f64, marker_type: Option<&str>) -> Marker<()> {
        let marker = Marker::new(id, Point::new(lng, lat), ());
        match marker_type {
            Some(t) => marker.with_type(t),
            None => marker,
        }
    }

    #[test]
    fn test_builds_one_index_per_type_in_first_seen_order() {
        let markers = vec![
            marker("1", 0.0, 0.0, Some("b")),
            marker("2", 1.0, 0.0, Some("a")),
            marker("3", 2.0, 0.0, None),
            marker("4", 3.0, 0.0, Some("b")),
        ];

        let built = IndexBuilder::new(IndexOptions::default(), true)
            .build(&markers)
            .unwrap();

        assert_eq!(built.indexes.types(), &["b".to_string(), "a".to_string()]);
        assert_eq!(built.indexes.get("b").unwrap().leaf_count(), 2);
        assert_eq!(built.indexes.get("a").unwrap().leaf_count(), 1);
        assert!(built.indexes.get("c").is_none());
        assert_eq!(built.passthrough.len(), 1);
        assert_eq!(built.passthrough[0].index, Some(2));

        let order: Vec<&str> = built.indexes.iter().map(|(t, _)| t).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_disabled_clustering_passes_everything_through() {
        let markers = vec![
            marker("1", 0.0, 0.0, Some("a")),
            marker("2", 0.0, 0.0, Some("a")),
            marker("3", 0.0, 0.0, None),
        ];

        let built = IndexBuilder::new(IndexOptions::default(), false)
            .build(&markers)
            .unwrap();

        assert!(built.indexes.is_empty());
        let indices: Vec<_> = built.passthrough.iter().filter_map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_marker_set_builds_nothing() {
        let built = IndexBuilder::new(IndexOptions::default(), true)
            .build::<()>(&[])
            .unwrap();
        assert!(built.indexes.is_empty());
        assert!(built.passthrough.is_empty());
    }

    #[test]
    fn test_malformed_geometry_fails_build() {
        let markers = vec![
            marker("1", 0.0, 0.0, Some("a")),
            marker("2", f64::INFINITY, 0.0, Some("a")),
        ];

        let err = IndexBuilder::new(IndexOptions::default(), true)
            .build(&markers)
            .unwrap_err();
        assert!(matches!(err, ClusterError::InvalidInput(_)));
    }

    #[test]
    fn test_untyped_malformed_marker_is_not_indexed() {
        let markers = vec![
            marker("1", 0.0, 0.0, Some("a")),
            marker("2", f64::NAN, 0.0, None),
        ];

        let built = IndexBuilder::new(IndexOptions::default(), true)
            .build(&markers)
            .unwrap();
        assert_eq!(built.indexes.len(), 1);
        assert_eq!(built.passthrough.len(), 1);
    }
}
