//! Immutable per-zoom R-trees over unit-space positions.
//!
//! `rstar` fixes node capacity at compile time through [`RTreeParams`], so
//! the configured node size is rounded up to one of a few fanout presets.

use rstar::primitives::GeomWithData;
use rstar::{AABB, RStarInsertionStrategy, RTree, RTreeParams};
use smallvec::SmallVec;

/// A level item position tagged with its slot in the level's node list.
pub(crate) type Entry = GeomWithData<[f64; 2], usize>;

/// Neighbour slots returned by radius queries. Most clusters are small.
pub(crate) type Neighbours = SmallVec<[usize; 16]>;

/// R-tree parameters with a maximum node capacity of `MAX`.
pub(crate) struct Fanout<const MAX: usize>;

impl<const MAX: usize> RTreeParams for Fanout<MAX> {
    const MIN_SIZE: usize = MAX / 4;
    const MAX_SIZE: usize = MAX;
    const REINSERTION_COUNT: usize = MAX / 8;
    type DefaultInsertionStrategy = RStarInsertionStrategy;
}

pub(crate) enum LevelTree {
    Fanout8(RTree<Entry, Fanout<8>>),
    Fanout16(RTree<Entry, Fanout<16>>),
    Fanout32(RTree<Entry, Fanout<32>>),
    Fanout64(RTree<Entry, Fanout<64>>),
}

impl LevelTree {
    /// Bulk-load a tree whose entries carry their slot in `positions`.
    pub(crate) fn bulk_load(positions: impl Iterator<Item = [f64; 2]>, node_size: usize) -> Self {
        let entries: Vec<Entry> = positions
            .enumerate()
            .map(|(slot, position)| GeomWithData::new(position, slot))
            .collect();

        match node_size {
            0..=8 => Self::Fanout8(RTree::bulk_load_with_params(entries)),
            9..=16 => Self::Fanout16(RTree::bulk_load_with_params(entries)),
            17..=32 => Self::Fanout32(RTree::bulk_load_with_params(entries)),
            _ => Self::Fanout64(RTree::bulk_load_with_params(entries)),
        }
    }

    pub(crate) fn fanout(&self) -> usize {
        match self {
            Self::Fanout8(_) => 8,
            Self::Fanout16(_) => 16,
            Self::Fanout32(_) => 32,
            Self::Fanout64(_) => 64,
        }
    }

    pub(crate) fn size(&self) -> usize {
        match self {
            Self::Fanout8(tree) => tree.size(),
            Self::Fanout16(tree) => tree.size(),
            Self::Fanout32(tree) => tree.size(),
            Self::Fanout64(tree) => tree.size(),
        }
    }

    /// Slots within euclidean distance `radius` of `(x, y)`, ascending.
    pub(crate) fn within(&self, x: f64, y: f64, radius: f64) -> Neighbours {
        let mut slots = match self {
            Self::Fanout8(tree) => within(tree, x, y, radius),
            Self::Fanout16(tree) => within(tree, x, y, radius),
            Self::Fanout32(tree) => within(tree, x, y, radius),
            Self::Fanout64(tree) => within(tree, x, y, radius),
        };
        slots.sort_unstable();
        slots
    }

    /// Slots inside the closed rectangle, ascending.
    pub(crate) fn range(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<usize> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        let mut slots = match self {
            Self::Fanout8(tree) => range(tree, &envelope),
            Self::Fanout16(tree) => range(tree, &envelope),
            Self::Fanout32(tree) => range(tree, &envelope),
            Self::Fanout64(tree) => range(tree, &envelope),
        };
        slots.sort_unstable();
        slots
    }
}

impl std::fmt::Debug for LevelTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelTree")
            .field("fanout", &self.fanout())
            .field("size", &self.size())
            .finish()
    }
}

fn within<P: RTreeParams>(tree: &RTree<Entry, P>, x: f64, y: f64, radius: f64) -> Neighbours {
    tree.locate_within_distance([x, y], radius * radius)
        .map(|entry| entry.data)
        .collect()
}

fn range<P: RTreeParams>(tree: &RTree<Entry, P>, envelope: &AABB<[f64; 2]>) -> Vec<usize> {
    tree.locate_in_envelope(envelope)
        .map(|entry| entry.data)
        .collect()
}
