//! Mesh-level data: the assembled distributed mesh and the per-build ghost
//! index map.

pub mod ghost_map;
pub mod mesh;

pub use ghost_map::{GhostEntry, GhostMap};
pub use mesh::{DistributedMesh, Region};
