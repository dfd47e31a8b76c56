//! GeoJSON export of displayed features.
//!
//! Clusters carry `cluster`, `cluster_id`, `point_count` and
//! `point_count_abbreviated` properties; points carry the `index` of their
//! marker. Both carry the marker `type` when they have one.

use crate::error::{ClusterError, Result};
use crate::marker::{DisplayedFeature, Feature};
use geo::Point;
use geojson::{FeatureCollection, Geometry, JsonObject, Value, feature::Id};
use serde_json::json;

/// Converts one displayed feature to a GeoJSON feature.
pub fn to_geojson_feature(displayed: &DisplayedFeature) -> geojson::Feature {
    let feature = &displayed.feature;
    let mut properties = JsonObject::new();

    if feature.is_cluster() {
        properties.insert("cluster".to_string(), json!(true));
        properties.insert("cluster_id".to_string(), json!(feature.id));
        properties.insert("point_count".to_string(), json!(feature.point_count));
        properties.insert(
            "point_count_abbreviated".to_string(),
            json!(feature.point_count_abbreviated()),
        );
    } else if let Some(index) = feature.index {
        properties.insert("index".to_string(), json!(index));
    }

    if let Some(marker_type) = &displayed.marker_type {
        properties.insert("type".to_string(), json!(marker_type));
    }

    geojson::Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            feature.geometry.x(),
            feature.geometry.y(),
        ]))),
        id: feature
            .is_cluster()
            .then(|| Id::Number(serde_json::Number::from(feature.id))),
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn to_feature_collection(displayed: &[DisplayedFeature]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: displayed.iter().map(to_geojson_feature).collect(),
        foreign_members: None,
    }
}

/// Serializes displayed features as a GeoJSON FeatureCollection string.
pub fn to_geojson_string(displayed: &[DisplayedFeature]) -> Result<String> {
    Ok(serde_json::to_string(&to_feature_collection(displayed))?)
}

/// Parses a GeoJSON feature produced by [`to_geojson_feature`] back into a
/// displayed feature, e.g. one a host handed back after a tap.
pub fn from_geojson_feature(json: &str) -> Result<DisplayedFeature> {
    let parsed: geojson::Feature = serde_json::from_str(json)?;

    let coordinate = match parsed.geometry.map(|g| g.value) {
        Some(Value::Point(coords)) if coords.len() >= 2 => Point::new(coords[0], coords[1]),
        _ => {
            return Err(ClusterError::InvalidInput(
                "GeoJSON feature geometry is not a Point".to_string(),
            ));
        }
    };

    let properties = parsed.properties.unwrap_or_default();
    let marker_type = properties
        .get("type")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let as_usize = |key: &str| {
        properties
            .get(key)
            .and_then(|v| v.as_u64())
            .and_then(|v| usize::try_from(v).ok())
    };

    let is_cluster = properties
        .get("cluster")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let feature = if is_cluster {
        let (Some(cluster_id), Some(point_count)) = (as_usize("cluster_id"), as_usize("point_count"))
        else {
            return Err(ClusterError::InvalidInput(
                "Cluster feature needs cluster_id and point_count".to_string(),
            ));
        };
        Feature::cluster(cluster_id, coordinate, point_count)
    } else {
        let Some(index) = as_usize("index") else {
            return Err(ClusterError::InvalidInput(
                "Point feature needs an index".to_string(),
            ));
        };
        Feature::point(index, coordinate)
    };

    Ok(DisplayedFeature::new(marker_type, feature))
}
