//! Derives the query bounding box and integer zoom level from a map region.

use crate::compute::projection::tile_pixel;
use crate::compute::validation::validate_region;
use crate::config::{Config, ViewportSize};
use clustermap_types::bbox::BoundingBox;
use clustermap_types::region::Region;

/// Tile size the zoom estimate is computed against.
const TILE_SIZE: f64 = 256.0;

/// Highest zoom the resolver will report.
pub const MAX_VIEWPORT_ZOOM: u8 = 20;

/// Regions spanning at least this many degrees of longitude are shown at `min_zoom`.
const WIDE_REGION_LONGITUDE_DELTA: f64 = 40.0;

/// Bounding box and zoom level used to query the cluster indexes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub bbox: BoundingBox,
    pub zoom: u8,
}

/// Pure function of region, surface size and `min_zoom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportResolver {
    min_zoom: u8,
    size: ViewportSize,
}

impl ViewportResolver {
    pub fn new(min_zoom: u8, size: ViewportSize) -> Self {
        Self { min_zoom, size }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.min_zoom, config.viewport_size)
    }

    /// Resolve the viewport for `region`.
    ///
    /// A missing or malformed region resolves to the whole world at
    /// `min_zoom`.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustermap::viewport::ViewportResolver;
    /// use clustermap_types::config::ViewportSize;
    /// use clustermap_types::region::Region;
    ///
    /// let resolver = ViewportResolver::new(1, ViewportSize::new(375.0, 812.0));
    ///
    /// let city = resolver.resolve(Some(&Region::new(40.7128, -74.0060, 0.1, 0.05)));
    /// assert!(city.zoom > 10);
    ///
    /// let unset = resolver.resolve(None);
    /// assert_eq!(unset.zoom, 1);
    /// ```
    pub fn resolve(&self, region: Option<&Region>) -> Viewport {
        let Some(region) = region else {
            log::debug!("No region set; resolving world viewport");
            return self.world();
        };

        if let Err(e) = validate_region(region) {
            log::debug!("Treating malformed region as unset: {}", e);
            return self.world();
        }

        let bbox = region_bbox(region);
        let zoom = self.region_zoom(region, &bbox);
        Viewport { bbox, zoom }
    }

    fn world(&self) -> Viewport {
        Viewport {
            bbox: BoundingBox::world(),
            zoom: self.min_zoom,
        }
    }

    /// Integer zoom at which `bbox` fits the surface, never below `min_zoom`.
    fn region_zoom(&self, region: &Region, bbox: &BoundingBox) -> u8 {
        if region.longitude_delta >= WIDE_REGION_LONGITUDE_DELTA {
            return self.min_zoom;
        }

        let base = f64::from(MAX_VIEWPORT_ZOOM);
        let (left, bottom) = tile_pixel(bbox.west, bbox.south, base, TILE_SIZE);
        let (right, top) = tile_pixel(bbox.east, bbox.north, base, TILE_SIZE);

        let width = right - left;
        let height = bottom - top;
        let ratio = (width / self.size.width).max(height / self.size.height);
        let fitted = (base - ratio.log2()).floor();

        let zoom = if fitted.is_nan() {
            f64::from(self.min_zoom)
        } else {
            fitted.clamp(0.0, base)
        };

        // Clamped to 0..=MAX_VIEWPORT_ZOOM above.
        (zoom as u8).max(self.min_zoom)
    }
}

/// Query box for a region: one full span on each side of the center, so
/// markers just off screen are already clustered when the map pans.
pub fn region_bbox(region: &Region) -> BoundingBox {
    let lng_delta = region.unwrapped_longitude_delta();
    BoundingBox::new(
        region.longitude - lng_delta,
        region.latitude - region.latitude_delta,
        region.longitude + lng_delta,
        region.latitude + region.latitude_delta,
    )
}
