use clustermap::{
    ClusterError, ClusteredMap, Config, EdgePadding, Feature, LayoutAnimation, MapSurface,
    Marker, Point, Region,
};
use clustermap::{DisplayedFeature, RenderItem};
use std::sync::Arc;

struct NullSurface;

impl MapSurface for NullSurface {
    fn fit_to_region(&mut self, _region: &Region, _padding: &EdgePadding, _animated: bool) {}
}

fn close_pair(marker_type: &str) -> Vec<Marker<()>> {
    vec![
        Marker::new("p", Point::new(5.0, 5.0), ()).with_type(marker_type),
        Marker::new("q", Point::new(5.0001, 5.0), ()).with_type(marker_type),
    ]
}

#[test]
fn test_empty_marker_set() {
    let map = ClusteredMap::<()>::builder()
        .region(Region::new(0.0, 0.0, 10.0, 10.0))
        .build()
        .unwrap();

    assert!(map.indexes().is_empty());
    assert!(map.displayed().is_empty());
    assert!(map.render().is_empty());
}

#[test]
fn test_empty_type_tag_is_passthrough() {
    let markers = vec![
        Marker::new("blank", Point::new(1.0, 1.0), ()).with_type(""),
        Marker::new("none", Point::new(1.0, 1.0), ()),
    ];
    let map = ClusteredMap::builder().markers(markers).build().unwrap();

    assert!(map.indexes().is_empty());
    assert_eq!(map.displayed().len(), 2);
    assert!(map.displayed().iter().all(DisplayedFeature::is_passthrough));
}

#[test]
fn test_malformed_region_falls_back_to_world() {
    let mut map = ClusteredMap::builder()
        .markers(close_pair("a"))
        .build()
        .unwrap();
    let unset = map.displayed().to_vec();

    for region in [
        Region::new(f64::NAN, 0.0, 1.0, 1.0),
        Region::new(0.0, 0.0, f64::INFINITY, 1.0),
        Region::new(95.0, 0.0, 1.0, 1.0),
        Region::new(0.0, 0.0, 1.0, -1000.0),
    ] {
        map.set_region(region).unwrap();
        assert_eq!(map.viewport().zoom, map.config().min_zoom);
        assert_eq!(map.displayed(), unset.as_slice());
    }
}

#[test]
fn test_zero_span_region_is_bounded_zoom() {
    let map = ClusteredMap::builder()
        .markers(close_pair("a"))
        .region(Region::new(5.0, 5.0, 0.0, 0.0))
        .build()
        .unwrap();

    assert!(map.viewport().zoom <= 20);
    assert!(map.viewport().zoom >= map.config().min_zoom);
}

#[test]
fn test_zoom_never_below_min_zoom() {
    let map = ClusteredMap::builder()
        .config(Config::default().with_zoom_range(5, 16))
        .markers(close_pair("a"))
        .region(Region::new(0.0, 0.0, 170.0, 359.0))
        .build()
        .unwrap();

    assert_eq!(map.viewport().zoom, 5);
}

#[test]
fn test_pressing_a_point_is_rejected() {
    let map_config = Config::default().with_radius(1.0);
    let mut map = ClusteredMap::builder()
        .config(map_config)
        .markers(close_pair("a"))
        .region(Region::new(5.0, 5.0001, 0.001, 0.001))
        .build()
        .unwrap();

    let point = map
        .displayed()
        .iter()
        .find(|f| !f.is_cluster())
        .cloned()
        .unwrap();
    let err = map.press_cluster(&point, &mut NullSurface).unwrap_err();
    assert!(matches!(err, ClusterError::NotACluster(_)));
}

#[test]
fn test_stale_press_after_types_change() {
    let mut map = ClusteredMap::builder()
        .markers(close_pair("old"))
        .build()
        .unwrap();
    let stale = map.displayed()[0].clone();
    assert!(stale.is_cluster());

    map.set_markers(close_pair("new")).unwrap();

    let err = map.press_cluster(&stale, &mut NullSurface).unwrap_err();
    assert!(matches!(err, ClusterError::IndexNotFound(ref t) if t == "old"));
}

#[test]
fn test_unknown_cluster_id_is_reported() {
    let mut map = ClusteredMap::builder()
        .markers(close_pair("a"))
        .build()
        .unwrap();

    let bogus = DisplayedFeature::new(
        Some("a".to_string()),
        Feature::cluster(9_999_999, Point::new(0.0, 0.0), 4),
    );
    let err = map.press_cluster(&bogus, &mut NullSurface).unwrap_err();
    assert!(matches!(err, ClusterError::ClusterNotFound(9_999_999)));
}

#[test]
fn test_bad_geometry_keeps_previous_display() {
    let mut map = ClusteredMap::builder()
        .markers(close_pair("a"))
        .build()
        .unwrap();
    let before = map.snapshot();

    let mut markers = close_pair("a");
    markers.push(Marker::new("broken", Point::new(0.0, f64::NAN), ()).with_type("a"));
    assert!(matches!(
        map.set_markers(markers),
        Err(ClusterError::InvalidInput(_))
    ));

    assert!(Arc::ptr_eq(&before, &map.snapshot()));
    assert_eq!(map.markers().len(), 2);
}

#[test]
fn test_bad_geometry_on_passthrough_is_tolerated() {
    let markers = vec![Marker::new("free", Point::new(f64::NAN, 0.0), ())];
    let map = ClusteredMap::builder().markers(markers).build().unwrap();
    assert_eq!(map.displayed().len(), 1);
}

#[test]
fn test_antimeridian_region() {
    let markers = vec![
        Marker::new("east", Point::new(179.5, 0.0), ()).with_type("a"),
        Marker::new("west", Point::new(-179.5, 0.0), ()).with_type("b"),
        Marker::new("far", Point::new(0.0, 0.0), ()).with_type("c"),
    ];

    // Center on the antimeridian; the host reports a wrapped negative span.
    let map = ClusteredMap::builder()
        .config(Config::default().with_radius(1.0))
        .markers(markers)
        .region(Region::new(0.0, 180.0, 2.0, -358.0))
        .build()
        .unwrap();

    let mut types: Vec<_> = map
        .displayed()
        .iter()
        .filter_map(|f| f.marker_type.clone())
        .collect();
    types.sort();
    assert_eq!(types, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_render_list_matches_displayed() {
    let mut markers = close_pair("a");
    markers.push(Marker::new("free", Point::new(-20.0, 10.0), ()));

    let map = ClusteredMap::builder()
        .config(Config::default().with_animation(false, LayoutAnimation::linear()))
        .markers(markers)
        .build()
        .unwrap();

    let rendered = map.render();
    assert_eq!(rendered.len(), map.displayed().len());
    assert!(matches!(rendered[0], RenderItem::Cluster(_)));
    assert!(matches!(rendered[1], RenderItem::Marker(m) if m.id == "free"));
}
