//! Block-structured topology: input description, face connectivity, the
//! block arena, and the topology builder.

pub mod block;
pub mod builder;
pub mod description;
pub mod face;

pub use block::{Block, BlockIndex, MAX_DIM, Orientation, Patch};
pub use builder::{BlockTopology, build_topology};
pub use description::{BlockDescription, PatchSpec, PeriodicPair};
