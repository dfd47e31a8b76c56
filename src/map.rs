//! Host-facing clustering state.
//!
//! [`ClusteredMap`] owns the marker set and the current region, rebuilds
//! the per-type indexes whenever either changes, and answers cluster
//! presses. Everything runs synchronously on the caller's thread.

use crate::builder::ClusteredMapBuilder;
use crate::config::Config;
use crate::error::{ClusterError, Result};
use crate::marker::{DisplayedFeature, Feature, Marker};
use crate::partition::{BuiltIndexes, IndexBuilder, TypeIndexes};
use crate::press::{ClusterExpansion, MapSurface, PressMode, PressResolver};
use crate::projector::project_clusters;
use crate::render::{ClusterMarker, ClusterRenderProps, RenderItem, cluster_key};
use crate::viewport::{Viewport, ViewportResolver};
use clustermap_types::region::Region;
use std::fmt;
use std::sync::Arc;

/// Called with the pressed cluster and all of its leaves.
pub type ClusterPressCallback = Box<dyn FnMut(&DisplayedFeature, &[Feature])>;

/// Called with the new region and the features displayed before it was applied.
pub type RegionChangeCallback = Box<dyn FnMut(&Region, &[DisplayedFeature])>;

/// Replaces the default cluster glyph.
pub type RenderClusterHook = Box<dyn Fn(&ClusterRenderProps<'_>) -> ClusterMarker>;

/// Picks a cluster color per feature instead of the configured constant.
pub type ClusterColorFn = Box<dyn Fn(&DisplayedFeature) -> String>;

#[derive(Default)]
pub(crate) struct Callbacks {
    pub(crate) on_cluster_press: Option<ClusterPressCallback>,
    pub(crate) on_region_change_complete: Option<RegionChangeCallback>,
    pub(crate) render_cluster: Option<RenderClusterHook>,
    pub(crate) cluster_color: Option<ClusterColorFn>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_cluster_press", &self.on_cluster_press.is_some())
            .field(
                "on_region_change_complete",
                &self.on_region_change_complete.is_some(),
            )
            .field("render_cluster", &self.render_cluster.is_some())
            .field("cluster_color", &self.cluster_color.is_some())
            .finish()
    }
}

/// Result of one rebuild. Replaced as a whole, never modified.
#[derive(Debug)]
pub struct ClusterSnapshot {
    pub indexes: TypeIndexes,
    pub displayed: Vec<DisplayedFeature>,
    pub viewport: Viewport,
}

/// Clustered marker layer over a host map.
///
/// # Examples
///
/// ```rust
/// use clustermap::{ClusteredMap, Config, Marker, Point, Region};
///
/// let markers = vec![
///     Marker::new("a", Point::new(0.0, 0.0), ()).with_type("poi"),
///     Marker::new("b", Point::new(0.0001, 0.0), ()).with_type("poi"),
///     Marker::new("c", Point::new(0.0002, 0.0), ()).with_type("poi"),
/// ];
///
/// let map = ClusteredMap::builder()
///     .config(Config::default())
///     .markers(markers)
///     .region(Region::new(0.0, 0.0, 60.0, 60.0))
///     .build()?;
///
/// assert_eq!(map.displayed().len(), 1);
/// assert_eq!(map.displayed()[0].feature.point_count, 3);
/// # Ok::<(), clustermap::ClusterError>(())
/// ```
pub struct ClusteredMap<T> {
    config: Config,
    index_builder: IndexBuilder,
    resolver: ViewportResolver,
    markers: Vec<Marker<T>>,
    region: Option<Region>,
    snapshot: Arc<ClusterSnapshot>,
    callbacks: Callbacks,
}

impl<T> ClusteredMap<T> {
    /// Create an empty map with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> ClusteredMapBuilder<T> {
        ClusteredMapBuilder::new()
    }

    pub(crate) fn from_parts(
        config: Config,
        markers: Vec<Marker<T>>,
        region: Option<Region>,
        callbacks: Callbacks,
    ) -> Result<Self> {
        config.validate().map_err(ClusterError::InvalidConfig)?;

        let index_builder = IndexBuilder::from_config(&config);
        let resolver = ViewportResolver::from_config(&config);
        let snapshot = rebuild(&index_builder, &resolver, &markers, region.as_ref())?;

        Ok(Self {
            config,
            index_builder,
            resolver,
            markers,
            region,
            snapshot: Arc::new(snapshot),
            callbacks,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn markers(&self) -> &[Marker<T>] {
        &self.markers
    }

    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// The current snapshot. Later rebuilds never alter a snapshot already
    /// handed out.
    pub fn snapshot(&self) -> Arc<ClusterSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Features to display: clusters and points per type, then passthrough markers.
    pub fn displayed(&self) -> &[DisplayedFeature] {
        &self.snapshot.displayed
    }

    pub fn viewport(&self) -> Viewport {
        self.snapshot.viewport
    }

    pub fn indexes(&self) -> &TypeIndexes {
        &self.snapshot.indexes
    }

    /// Replace the marker set and rebuild.
    ///
    /// On failure the previous markers and snapshot stay in place.
    pub fn set_markers(&mut self, markers: Vec<Marker<T>>) -> Result<()> {
        let snapshot = self.try_rebuild(&markers, self.region.as_ref())?;
        self.markers = markers;
        self.snapshot = Arc::new(snapshot);
        Ok(())
    }

    /// Replace the region and rebuild.
    pub fn set_region(&mut self, region: Region) -> Result<()> {
        let snapshot = self.try_rebuild(&self.markers, Some(&region))?;
        self.region = Some(region);
        self.snapshot = Arc::new(snapshot);
        Ok(())
    }

    /// Handle the end of a camera move on the host map.
    ///
    /// Configures the next layout transition when animations are enabled,
    /// notifies the region-change callback with the features displayed so
    /// far, then rebuilds for the new region.
    pub fn on_region_change_complete(
        &mut self,
        region: Region,
        surface: &mut dyn MapSurface,
    ) -> Result<()> {
        if self.config.animation_enabled {
            surface.configure_layout_animation(&self.config.layout_animation);
        }

        let previous = Arc::clone(&self.snapshot);
        if let Some(callback) = self.callbacks.on_region_change_complete.as_mut() {
            callback(&region, &previous.displayed);
        }

        self.set_region(region)
    }

    /// Expand a pressed cluster.
    ///
    /// Unless `preserve_cluster_press_behavior` is set, the surface is first
    /// asked to fit all leaves. The press callback fires only on success; a
    /// stale or non-cluster feature is logged and returned as an error.
    pub fn press_cluster(
        &mut self,
        feature: &DisplayedFeature,
        surface: &mut dyn MapSurface,
    ) -> Result<ClusterExpansion> {
        let snapshot = Arc::clone(&self.snapshot);
        let resolver = PressResolver::new(&snapshot.indexes, PressMode::from_config(&self.config));

        let expansion = resolver.resolve(feature, surface).inspect_err(|e| {
            log::warn!("Ignoring cluster press: {}", e);
        })?;

        if let Some(callback) = self.callbacks.on_cluster_press.as_mut() {
            callback(&expansion.feature, &expansion.leaves);
        }
        Ok(expansion)
    }

    /// All leaves of a displayed cluster, without side effects.
    pub fn cluster_leaves(&self, feature: &DisplayedFeature) -> Result<Vec<Feature>> {
        PressResolver::new(&self.snapshot.indexes, PressMode::Notify).leaves(feature)
    }

    /// Zoom at which a displayed cluster breaks apart.
    pub fn cluster_expansion_zoom(&self, feature: &DisplayedFeature) -> Result<u8> {
        if !feature.is_cluster() {
            return Err(ClusterError::NotACluster(feature.feature.id));
        }
        let marker_type = feature.marker_type.as_deref().unwrap_or_default();
        self.snapshot
            .indexes
            .get(marker_type)
            .ok_or_else(|| ClusterError::IndexNotFound(marker_type.to_string()))?
            .cluster_expansion_zoom(feature.feature.id)
    }

    /// The ordered render list for the current snapshot.
    pub fn render(&self) -> Vec<RenderItem<'_, T>> {
        self.snapshot
            .displayed
            .iter()
            .enumerate()
            .filter_map(|(position, displayed)| {
                if displayed.is_cluster() {
                    Some(RenderItem::Cluster(self.render_cluster(displayed, position)))
                } else {
                    displayed
                        .feature
                        .index
                        .and_then(|index| self.markers.get(index))
                        .map(RenderItem::Marker)
                }
            })
            .collect()
    }

    fn render_cluster(&self, displayed: &DisplayedFeature, position: usize) -> ClusterMarker {
        let key = cluster_key(displayed, position);
        let color = match &self.callbacks.cluster_color {
            Some(color_fn) => color_fn(displayed),
            None => self.config.cluster_color.clone(),
        };
        let props = ClusterRenderProps {
            key: &key,
            feature: displayed,
            cluster_color: &color,
            cluster_text_color: &self.config.cluster_text_color,
        };

        match &self.callbacks.render_cluster {
            Some(hook) => hook(&props),
            None => props.default_marker(),
        }
    }

    fn try_rebuild(
        &self,
        markers: &[Marker<T>],
        region: Option<&Region>,
    ) -> Result<ClusterSnapshot> {
        rebuild(&self.index_builder, &self.resolver, markers, region).inspect_err(|e| {
            log::error!("Rebuild failed, keeping previous clusters: {}", e);
        })
    }
}

impl<T> fmt::Debug for ClusteredMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusteredMap")
            .field("markers", &self.markers.len())
            .field("region", &self.region)
            .field("types", &self.snapshot.indexes.types())
            .field("displayed", &self.snapshot.displayed.len())
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

fn rebuild<T>(
    index_builder: &IndexBuilder,
    resolver: &ViewportResolver,
    markers: &[Marker<T>],
    region: Option<&Region>,
) -> Result<ClusterSnapshot> {
    let BuiltIndexes {
        indexes,
        passthrough,
    } = index_builder.build(markers)?;
    let viewport = resolver.resolve(region);
    let displayed = project_clusters(&indexes, &passthrough, &viewport);

    log::debug!(
        "Rebuilt {} type indexes; displaying {} features at zoom {}",
        indexes.len(),
        displayed.len(),
        viewport.zoom
    );

    Ok(ClusterSnapshot {
        indexes,
        displayed,
        viewport,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EdgePadding, LayoutAnimation};
    use geo::Point;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Surface {
        fits: Vec<Region>,
        animations: Vec<LayoutAnimation>,
    }

    impl MapSurface for Surface {
        fn fit_to_region(&mut self, region: &Region, _padding: &EdgePadding, _animated: bool) {
            self.fits.push(*region);
        }

        fn configure_layout_animation(&mut self, animation: &LayoutAnimation) {
            self.animations.push(*animation);
        }
    }

    fn tight_markers() -> Vec<Marker<&'static str>> {
        vec![
            Marker::new("a", Point::new(0.0, 0.0), "first").with_type("a"),
            Marker::new("b", Point::new(0.0001, 0.0), "second").with_type("a"),
            Marker::new("c", Point::new(0.0002, 0.0), "third").with_type("a"),
            Marker::new("d", Point::new(30.0, 30.0), "free"),
        ]
    }

    fn wide() -> Region {
        Region::new(0.0, 0.0, 60.0, 60.0)
    }

    #[test]
    fn test_render_resolves_points_and_clusters() {
        let map = ClusteredMap::builder()
            .markers(tight_markers())
            .region(wide())
            .build()
            .unwrap();

        let items = map.render();
        assert_eq!(items.len(), 2);
        match &items[0] {
            RenderItem::Cluster(cluster) => {
                assert_eq!(cluster.label, "3");
                assert_eq!(cluster.color, "#00B386");
                assert_eq!(cluster.key, format!("cluster-{}-0", cluster.feature.feature.id));
            }
            other => panic!("expected cluster, got {:?}", other),
        }
        match &items[1] {
            RenderItem::Marker(marker) => assert_eq!(marker.payload, "free"),
            other => panic!("expected marker, got {:?}", other),
        }
    }

    #[test]
    fn test_render_hooks() {
        let map = ClusteredMap::builder()
            .markers(tight_markers())
            .region(wide())
            .cluster_color_with(|f| {
                if f.feature.point_count > 2 {
                    "#FF0000".to_string()
                } else {
                    "#0000FF".to_string()
                }
            })
            .render_cluster(|props| {
                let mut marker = props.default_marker();
                marker.label = format!("{} pts", props.feature.feature.point_count);
                marker
            })
            .build()
            .unwrap();

        let RenderItem::Cluster(cluster) = &map.render()[0] else {
            panic!("expected cluster");
        };
        assert_eq!(cluster.color, "#FF0000");
        assert_eq!(cluster.label, "3 pts");
    }

    #[test]
    fn test_region_change_notifies_with_previous_features() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut map = ClusteredMap::builder()
            .markers(tight_markers())
            .region(wide())
            .on_region_change_complete(move |region, displayed| {
                sink.borrow_mut().push((*region, displayed.len()));
            })
            .build()
            .unwrap();

        let mut surface = Surface::default();
        let close = Region::new(0.0, 0.0001, 0.0002, 0.0002);
        map.on_region_change_complete(close, &mut surface).unwrap();

        assert_eq!(seen.borrow().as_slice(), &[(close, 2)]);
        assert_eq!(surface.animations, vec![LayoutAnimation::spring()]);
        assert_eq!(map.region(), Some(&close));
        assert!(map.displayed().iter().all(|d| !d.is_cluster()));
    }

    #[test]
    fn test_animation_disabled_skips_layout_animation() {
        let config = Config::default().with_animation(false, LayoutAnimation::linear());
        let mut map = ClusteredMap::<()>::new(config).unwrap();
        let mut surface = Surface::default();

        map.on_region_change_complete(wide(), &mut surface).unwrap();
        assert!(surface.animations.is_empty());
    }

    #[test]
    fn test_press_fits_and_notifies() {
        let pressed = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&pressed);

        let mut map = ClusteredMap::builder()
            .markers(tight_markers())
            .region(wide())
            .on_cluster_press(move |feature, leaves| {
                *sink.borrow_mut() = Some((feature.feature.point_count, leaves.len()));
            })
            .build()
            .unwrap();

        let cluster = map.displayed()[0].clone();
        let mut surface = Surface::default();
        let expansion = map.press_cluster(&cluster, &mut surface).unwrap();

        assert_eq!(*pressed.borrow(), Some((3, 3)));
        assert_eq!(surface.fits.len(), 1);
        assert_eq!(expansion.fitted_region, Some(surface.fits[0]));
    }

    #[test]
    fn test_preserved_press_behavior_does_not_fit() {
        let config = Config::default().with_preserve_cluster_press_behavior(true);
        let mut map = ClusteredMap::builder()
            .config(config)
            .markers(tight_markers())
            .region(wide())
            .build()
            .unwrap();

        let cluster = map.displayed()[0].clone();
        let mut surface = Surface::default();
        let expansion = map.press_cluster(&cluster, &mut surface).unwrap();

        assert_eq!(expansion.leaves.len(), 3);
        assert!(surface.fits.is_empty());
    }

    #[test]
    fn test_stale_press_after_rebuild_is_recoverable() {
        let calls = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&calls);

        let mut map = ClusteredMap::builder()
            .markers(tight_markers())
            .region(wide())
            .on_cluster_press(move |_, _| *sink.borrow_mut() += 1)
            .build()
            .unwrap();
        let stale = map.displayed()[0].clone();

        let retyped = tight_markers()
            .into_iter()
            .map(|m| match m.marker_type {
                Some(_) => m.with_type("b"),
                None => m,
            })
            .collect();
        map.set_markers(retyped).unwrap();

        let mut surface = Surface::default();
        let err = map.press_cluster(&stale, &mut surface).unwrap_err();
        assert!(matches!(err, ClusterError::IndexNotFound(_)));
        assert_eq!(*calls.borrow(), 0);
        assert!(surface.fits.is_empty());
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_snapshot() {
        let mut map = ClusteredMap::builder()
            .markers(tight_markers())
            .region(wide())
            .build()
            .unwrap();
        let before = map.snapshot();

        let broken = vec![Marker::new("x", Point::new(f64::NAN, 0.0), "bad").with_type("a")];
        assert!(map.set_markers(broken).is_err());

        assert!(Arc::ptr_eq(&before, &map.snapshot()));
        assert_eq!(map.markers().len(), 4);
    }

    #[test]
    fn test_snapshots_are_replaced_not_mutated() {
        let mut map = ClusteredMap::builder()
            .markers(tight_markers())
            .region(wide())
            .build()
            .unwrap();
        let before = map.snapshot();

        map.set_region(Region::new(0.0, 0.0001, 0.0002, 0.0002))
            .unwrap();

        assert_eq!(before.displayed.len(), 2);
        assert_eq!(map.displayed().len(), 4);
        assert!(!Arc::ptr_eq(&before, &map.snapshot()));
    }

    #[test]
    fn test_expansion_zoom_through_map() {
        let map = ClusteredMap::builder()
            .markers(tight_markers())
            .region(wide())
            .build()
            .unwrap();

        let cluster = &map.displayed()[0];
        let zoom = map.cluster_expansion_zoom(cluster).unwrap();
        assert!(zoom > map.viewport().zoom);
        assert!(matches!(
            map.cluster_expansion_zoom(&map.displayed()[1]),
            Err(ClusterError::NotACluster(_))
        ));
    }
}
