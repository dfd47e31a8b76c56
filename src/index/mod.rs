//! Per-type spatial indexes.
//!
//! A [`ClusterIndex`] is built once from a set of point features and never
//! mutated afterwards; a changed marker set produces a new index.

mod cluster_index;
mod tree;

pub use cluster_index::{ClusterIndex, IndexOptions};
