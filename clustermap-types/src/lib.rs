//! # clustermap-types
//!
//! Value types shared between a host map surface and the `clustermap`
//! clustering engine:
//!
//! - **Regions**: `Region`, the visible map area as center + span
//! - **Bounding boxes**: `BoundingBox`, west/south/east/north in degrees
//! - **Viewport settings**: `EdgePadding`, `ViewportSize`, `LayoutAnimation`
//!
//! All types are serializable with Serde and interoperate with the `geo`
//! crate's primitives.
//!
//! ## Examples
//!
//! ```rust
//! use clustermap_types::region::Region;
//!
//! let region = Region::new(40.7128, -74.0060, 0.05, 0.05);
//! let bbox = region.visible_bounds();
//! assert!(bbox.west < -74.0060 && bbox.east > -74.0060);
//! ```

pub mod bbox;
pub mod config;
pub mod region;

pub use geo;
