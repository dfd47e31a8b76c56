//! Validation for marker coordinates and map regions.

use crate::error::{ClusterError, Result};
use crate::marker::Feature;
use clustermap_types::region::Region;
use geo::Point;

const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;
const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Check that a marker coordinate (x = longitude, y = latitude) lies on the globe.
///
/// NaN and infinities fail the range checks as well.
///
/// # Examples
///
/// ```
/// use clustermap::compute::validation::validate_coordinate;
/// use clustermap::Point;
///
/// assert!(validate_coordinate(&Point::new(2.3522, 48.8566)).is_ok());
/// assert!(validate_coordinate(&Point::new(48.8566, 190.0)).is_err());
/// assert!(validate_coordinate(&Point::new(f64::NAN, 0.0)).is_err());
/// ```
pub fn validate_coordinate(coordinate: &Point) -> Result<()> {
    let (lng, lat) = coordinate.x_y();
    if !LONGITUDE_RANGE.contains(&lng) {
        return Err(ClusterError::InvalidInput(format!(
            "longitude {} outside [-180, 180]",
            lng
        )));
    }
    if !LATITUDE_RANGE.contains(&lat) {
        return Err(ClusterError::InvalidInput(format!(
            "latitude {} outside [-90, 90]",
            lat
        )));
    }
    Ok(())
}

/// Check every feature an index is about to be built from. The error names
/// the marker the first bad feature came from.
pub fn validate_features(features: &[Feature]) -> Result<()> {
    features.iter().try_for_each(|feature| {
        validate_coordinate(&feature.geometry).map_err(|e| {
            let marker = feature.index.unwrap_or(feature.id);
            ClusterError::InvalidInput(format!("marker {}: {}", marker, e))
        })
    })
}

/// Check a map region before resolving a viewport from it.
///
/// The center must lie on the globe and the latitude span must be
/// non-negative. A negative longitude span marks a region wrapped across
/// the antimeridian; it must still unwrap to a positive span, so anything
/// at or below -360 is rejected.
///
/// # Examples
///
/// ```
/// use clustermap::compute::validation::validate_region;
/// use clustermap::Region;
///
/// assert!(validate_region(&Region::new(40.7, -74.0, 0.1, 0.1)).is_ok());
/// assert!(validate_region(&Region::new(0.0, 179.0, 10.0, -350.0)).is_ok());
/// assert!(validate_region(&Region::new(40.7, -74.0, -0.1, 0.1)).is_err());
/// assert!(validate_region(&Region::new(0.0, 0.0, 1.0, -1000.0)).is_err());
/// ```
pub fn validate_region(region: &Region) -> Result<()> {
    if !region.is_finite() {
        return Err(ClusterError::InvalidInput(format!(
            "region has non-finite values: {:?}",
            region
        )));
    }

    validate_coordinate(&region.center())
        .map_err(|e| ClusterError::InvalidInput(format!("region center: {}", e)))?;

    if region.latitude_delta < 0.0 {
        return Err(ClusterError::InvalidInput(format!(
            "latitude span {} is negative",
            region.latitude_delta
        )));
    }

    if region.longitude_delta <= -360.0 {
        return Err(ClusterError::InvalidInput(format!(
            "longitude span {} does not unwrap to a positive span",
            region.longitude_delta
        )));
    }

    Ok(())
}
