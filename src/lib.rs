//! Viewport-driven clustering of typed map markers.
//!
//! Markers are partitioned by type, each type gets its own hierarchical
//! cluster index, and the current map region selects which clusters and
//! points to display.
//!
//! ```rust
//! use clustermap::{ClusteredMap, Config, Marker, Point, Region};
//!
//! let markers = vec![
//!     Marker::new("cafe-1", Point::new(-74.0060, 40.7128), "Cafe").with_type("cafe"),
//!     Marker::new("cafe-2", Point::new(-74.0061, 40.7129), "Cafe").with_type("cafe"),
//!     Marker::new("pin", Point::new(-73.9000, 40.8000), "Pin"),
//! ];
//!
//! let map = ClusteredMap::builder()
//!     .config(Config::default())
//!     .markers(markers)
//!     .region(Region::new(40.7128, -74.0060, 0.5, 0.5))
//!     .build()?;
//!
//! for feature in map.displayed() {
//!     println!("{:?} {:?}", feature.marker_type, feature.feature);
//! }
//! # Ok::<(), clustermap::ClusterError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod error;
pub mod index;
pub mod map;
pub mod marker;
pub mod partition;
pub mod press;
pub mod projector;
pub mod render;
pub mod viewport;

#[cfg(feature = "geojson")]
pub mod geojson;

pub use builder::ClusteredMapBuilder;
pub use map::{ClusterSnapshot, ClusteredMap};
pub use error::{ClusterError, Result};

pub use geo::{Point, Rect};

pub use clustermap_types::bbox::BoundingBox;
pub use clustermap_types::region::Region;

pub use config::{Config, EdgePadding, LayoutAnimation, ViewportSize};

pub use marker::{DisplayedFeature, Feature, Marker};

pub use index::{ClusterIndex, IndexOptions};

pub use partition::{IndexBuilder, TypeIndexes};

pub use viewport::{Viewport, ViewportResolver};

pub use press::{ClusterExpansion, MapSurface, PressMode, PressResolver};

pub use render::{ClusterMarker, ClusterRenderProps, RenderItem};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{ClusterError, ClusteredMap, ClusteredMapBuilder, Result};

    pub use geo::Point;

    pub use crate::{BoundingBox, Region};

    pub use crate::{Config, EdgePadding, LayoutAnimation};

    pub use crate::{DisplayedFeature, Feature, Marker};

    pub use crate::{MapSurface, RenderItem};
}
