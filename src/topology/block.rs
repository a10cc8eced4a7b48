//! `Block` and `Patch`: the per-block structured topology records.
//!
//! Blocks live in a once-allocated arena (`Vec<Block>`) and reference their
//! positive-direction neighbors by [`BlockIndex`], never by pointer, so the
//! arena can be moved freely without invalidating the block graph.

use std::fmt;

/// Maximum number of logical directions; 2D blocks use a degenerate third
/// direction with one point layer and one segment.
pub const MAX_DIM: usize = 3;

/// Stable index of a block inside the topology arena.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct BlockIndex(u32);

impl BlockIndex {
    #[inline]
    pub fn new(raw: usize) -> Self {
        BlockIndex(raw as u32)
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for BlockIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BlockIndex").field(&self.0).finish()
    }
}

impl fmt::Display for BlockIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of a block a patch face sits on, in the patch's fixed direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Orientation {
    Negative,
    Positive,
}

/// One logical face layer of one block, belonging to a named patch group.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Patch {
    pub block: BlockIndex,
    /// Direction whose index is held fixed across the face.
    pub fixed_direction: usize,
    /// Node-layer index of the face: 0 on the negative side,
    /// `segments[fixed_direction]` on the positive side.
    pub fixed_index: usize,
    pub orientation: Orientation,
}

/// A structured hexahedral (3D) or quadrilateral (2D) sub-domain.
///
/// Immutable once [`build_topology`](crate::topology::builder::build_topology)
/// returns. `nb_points[d]` excludes the positive seam layer when the block is
/// stitched to a neighbor in `+d`, so summing `nb_nodes()` over the arena
/// counts every physical node exactly once.
#[derive(Clone, Debug)]
pub struct Block {
    pub dimensions: usize,
    /// Index into the topology's volume region name list.
    pub region: usize,
    /// Corner point ids, 4 (2D) or 8 (3D), in structured corner order.
    pub corners: Vec<usize>,
    /// Element subdivisions per direction (degenerate directions hold 1).
    pub segments: [usize; MAX_DIM],
    /// Point layers per direction: `segments + 1` iff `bounded`.
    pub nb_points: [usize; MAX_DIM],
    /// True iff the positive face in this direction is a true domain boundary.
    pub bounded: [bool; MAX_DIM],
    /// Adjacent block in the positive direction, if stitched.
    pub neighbors: [Option<BlockIndex>; MAX_DIM],
    /// Representative grading coefficient per direction (last/first spacing).
    pub gradings: [f64; MAX_DIM],
    pub node_strides: [usize; MAX_DIM],
    pub element_strides: [usize; MAX_DIM],
    /// Rank-owned node range boundaries (global ids), `nb_ranks + 1` entries.
    pub nodes_distribution: Vec<u64>,
    /// Rank-owned element range boundaries (global ids), `nb_ranks + 1` entries.
    pub elements_distribution: Vec<u64>,
}

impl Block {
    /// Number of nodes this block contributes to the global id space.
    pub fn nb_nodes(&self) -> u64 {
        self.nb_points.iter().product::<usize>() as u64
    }

    /// Number of elements in this block.
    pub fn nb_elements(&self) -> u64 {
        self.segments.iter().product::<usize>() as u64
    }

    /// First global node id of this block.
    pub fn global_node_start(&self) -> u64 {
        self.nodes_distribution[0]
    }

    /// First global element id of this block.
    pub fn global_element_start(&self) -> u64 {
        self.elements_distribution[0]
    }

    /// Flat node offset of a block-local structured coordinate.
    #[inline]
    pub fn node_offset(&self, ijk: [usize; MAX_DIM]) -> usize {
        debug_assert!((0..MAX_DIM).all(|d| ijk[d] < self.nb_points[d]));
        (0..MAX_DIM).map(|d| ijk[d] * self.node_strides[d]).sum()
    }

    /// Inverse of [`node_offset`](Self::node_offset).
    pub fn node_ijk(&self, offset: usize) -> [usize; MAX_DIM] {
        debug_assert!(offset < self.nb_nodes() as usize);
        let mut ijk = [0; MAX_DIM];
        let mut rest = offset;
        for d in (0..MAX_DIM).rev() {
            ijk[d] = rest / self.node_strides[d];
            rest %= self.node_strides[d];
        }
        ijk
    }

    /// Flat element offset of a block-local structured coordinate.
    #[inline]
    pub fn element_offset(&self, ijk: [usize; MAX_DIM]) -> usize {
        debug_assert!((0..MAX_DIM).all(|d| ijk[d] < self.segments[d]));
        (0..MAX_DIM).map(|d| ijk[d] * self.element_strides[d]).sum()
    }

    /// Inverse of [`element_offset`](Self::element_offset).
    pub fn element_ijk(&self, offset: usize) -> [usize; MAX_DIM] {
        debug_assert!(offset < self.nb_elements() as usize);
        let mut ijk = [0; MAX_DIM];
        let mut rest = offset;
        for d in (0..MAX_DIM).rev() {
            ijk[d] = rest / self.element_strides[d];
            rest %= self.element_strides[d];
        }
        ijk
    }
}
