//! Geometry helpers shared by the index, the viewport resolver and the
//! press resolver.
//!
//! - Coordinate and region validation
//! - Spherical-mercator projection to unit and tile-pixel space

pub mod projection;
pub mod validation;
