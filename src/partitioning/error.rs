//! Partitioning errors for blockmesh.

use thiserror::Error;

/// Errors from partitioner backends and partition-result handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// The backend library could not be loaded or initialized.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    /// A neighbor id in the graph was not found in the vertex-id map.
    #[error("owner lookup failed for object {0}")]
    VertexNotFound(u64),
    /// The backend returned a partition vector of the wrong length.
    #[error("partition result has {found} entries for {expected} vertices")]
    ResultLengthMismatch { expected: usize, found: usize },
    /// The backend assigned an object to a part outside the target range.
    #[error("destination part {part} out of range for {nb_parts} parts")]
    PartOutOfRange { part: usize, nb_parts: usize },
    /// The backend cannot operate on a graph spread over multiple ranks.
    #[error("backend only supports serial graphs, but {0} ranks own vertices")]
    DistributedGraphUnsupported(usize),
    /// Other errors (backend wrapper failures).
    #[error("partitioner error: {0}")]
    Other(String),
}
