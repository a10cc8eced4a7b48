//! Mesh repartitioning: object graph, backend adapter, and backends.

pub mod adapter;
pub mod error;
pub mod graph;
#[cfg(feature = "metis-support")]
pub mod metis;

pub use adapter::{CsrGraph, ExportLists, MeshPartitioner, PartitionPhase, PartitionerBackend};
pub use error::PartitionError;
pub use graph::{MeshObjectGraph, ObjectGraph, ObjectLayout};
#[cfg(feature = "metis-support")]
pub use metis::{MetisBackend, MetisMethod};
