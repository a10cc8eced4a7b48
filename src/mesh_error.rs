//! `BlockMeshError`: unified error type for blockmesh public APIs.
//!
//! All user-input problems surface as variants of this enum and propagate
//! uncaught to the top-level mesh-build call; a distributed build with an
//! inconsistent subset of ranks is not a recoverable state. Programming
//! contract violations (index-arena misuse, ghost-count mismatches) are
//! assertions, not variants.

use thiserror::Error;

use crate::partitioning::error::PartitionError;

/// Unified error type for mesh building and repartitioning.
#[derive(Debug, Error)]
pub enum BlockMeshError {
    /// Mesh dimension outside {2, 3}.
    #[error("mesh dimension must be 2 or 3, got {0}")]
    BadDimension(usize),
    /// A required input table was never supplied.
    #[error("missing input: {0} must be set before building")]
    MissingInput(&'static str),
    /// A point-table row has the wrong number of coordinates.
    #[error("point {row} has {found} coordinates, expected {expected}")]
    PointRowMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A block corner row has the wrong number of corner indices.
    #[error("block {row} has {found} corners, expected {expected}")]
    CornerRowMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A corner index does not refer to a point-table row.
    #[error("block {block} references unknown point {point}")]
    UnknownPoint { block: usize, point: usize },
    /// A subdivision row has the wrong width or a zero segment count.
    #[error("subdivisions for block {row} are invalid: {reason}")]
    BadSubdivisions { row: usize, reason: String },
    /// A grading row has the wrong number of edge coefficients.
    #[error("gradings for block {row} have {found} entries, expected {expected}")]
    GradingRowMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A table has a different number of rows than the block table.
    #[error("{table} has {found} rows for {expected} blocks")]
    TableLengthMismatch {
        table: &'static str,
        expected: usize,
        found: usize,
    },
    /// Non-empty region list whose length differs from the block count.
    #[error("{found} block regions supplied for {expected} blocks")]
    RegionCountMismatch { expected: usize, found: usize },
    /// A block face is covered by neither a neighbor block nor a declared patch.
    #[error(
        "block {block} has no adjacent element for patch on the {side} face in direction {direction}; did you flip patch node ordering?"
    )]
    NoAdjacentElement {
        block: usize,
        direction: usize,
        side: &'static str,
    },
    /// A face is claimed by more than two elements.
    #[error(
        "face of block {block} (direction {direction}, {side} side) matches more than one adjacent element"
    )]
    AmbiguousFace {
        block: usize,
        direction: usize,
        side: &'static str,
    },
    /// A declared patch face matches no block face.
    #[error("patch `{patch}` face {face} does not lie on any block face")]
    DanglingPatchFace { patch: String, face: usize },
    /// A periodic pair references an unknown patch or faces that cannot be stitched.
    #[error("periodic pair (`{master}`, `{slave}`) cannot be stitched: {reason}")]
    PeriodicMismatch {
        master: String,
        slave: String,
        reason: String,
    },
    /// An operation was invoked out of order on the partitioner adapter.
    #[error("invalid partitioner state: {operation} requires {required}")]
    InvalidState {
        operation: &'static str,
        required: &'static str,
    },
    /// A partitioner backend failed to initialize or run.
    #[error("partitioner backend `{backend}` failed: {source}")]
    PartitionerSetup {
        backend: &'static str,
        #[source]
        source: PartitionError,
    },
    /// The distributed graph handed to the partitioner is globally inconsistent.
    #[error("distributed graph inconsistency: {0}")]
    GraphInconsistency(String),
}
