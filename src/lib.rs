//! # blockmesh
//!
//! blockmesh is a block-structured mesh assembly and repartitioning library for
//! scientific computing codes. A handful of hexahedral or quadrilateral blocks,
//! each with per-direction subdivision counts and grading ratios, is expanded
//! into a fully connected distributed mesh: block seams are stitched by
//! matching corner points, nodes and elements are spread over the
//! communicator's ranks, and cross-rank references become ghost nodes.
//!
//! ## Features
//! - Block topology builder with automatic seam detection and boundary patches
//! - Deterministic parallel distribution of node and element ranges
//! - Multilinear coordinate mapping with geometric edge grading
//! - Node/element incidence graph behind a backend-agnostic partitioner
//!   adapter (METIS built in, custom backends via a trait)
//! - Pluggable communicators: serial, in-process threads, MPI
//!
//! ## Usage
//! Add `blockmesh` as a dependency in your `Cargo.toml` and enable features as
//! needed:
//!
//! ```toml
//! [dependencies]
//! blockmesh = "0.1"
//! # Optional features:
//! # features = ["mpi-support","metis-support"]
//! ```
//!
//! Every rank of an SPMD run executes the same calls; collective operations
//! block until all ranks arrive.

pub mod algs;
pub mod data;
pub mod geometry;
pub mod mesh_error;
pub mod partitioning;
pub mod topology;

/// Convenient prelude import for the common types.
pub mod prelude {
    pub use crate::algs::assemble::{IndexResolver, create_mesh};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::communicator::{Communicator, NoComm, ThreadComm};
    pub use crate::algs::distribute::{distribute_range, owning_rank};
    pub use crate::data::mesh::{DistributedMesh, Region};
    pub use crate::geometry::{CoordinateMapper, MultilinearMapper};
    pub use crate::mesh_error::BlockMeshError;
    pub use crate::partitioning::{
        ExportLists, MeshObjectGraph, MeshPartitioner, ObjectGraph, PartitionError,
        PartitionPhase, PartitionerBackend,
    };
    #[cfg(feature = "metis-support")]
    pub use crate::partitioning::{MetisBackend, MetisMethod};
    pub use crate::topology::{
        Block, BlockDescription, BlockIndex, BlockTopology, Orientation, Patch, build_topology,
    };
}
