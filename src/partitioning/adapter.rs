//! Backend-agnostic partitioner adapter.
//!
//! The adapter is a one-way state machine: `Uninitialized → GraphBuilt →
//! Partitioned`. It pulls graph data exclusively through the four
//! [`ObjectGraph`](crate::partitioning::graph::ObjectGraph) queries, converts
//! it to a 0-based CSR, and translates the backend's decision into export
//! lists. A backend failure is wrapped once here, naming the backend, and
//! never advances the phase.

use crate::algs::communicator::Communicator;
use crate::mesh_error::BlockMeshError;
use crate::partitioning::error::PartitionError;
use crate::partitioning::graph::{ObjectGraph, ObjectLayout};

/// Adapter phase; operations check it and refuse to run out of order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PartitionPhase {
    Uninitialized,
    GraphBuilt,
    Partitioned,
}

/// 0-based CSR view of one rank's owned objects, the representation handed
/// to backends.
#[derive(Clone, Debug, Default)]
pub struct CsrGraph {
    /// Owned-vertex-count prefix sum per rank (`nb_ranks + 1` entries).
    pub vtxdist: Vec<u64>,
    /// Global object id per local vertex.
    pub vertex_ids: Vec<u64>,
    /// CSR offsets into `adjncy` (`vertex count + 1` entries).
    pub xadj: Vec<usize>,
    /// Neighbor global object ids.
    pub adjncy: Vec<u64>,
}

impl CsrGraph {
    pub fn nb_local_vertices(&self) -> usize {
        self.vertex_ids.len()
    }

    pub fn nb_local_edges(&self) -> usize {
        self.adjncy.len()
    }

    /// Mesh-wide object count (object ids are dense in `0..this`).
    pub fn nb_global_vertices(&self) -> u64 {
        *self.vtxdist.last().unwrap_or(&0)
    }
}

/// A concrete graph partitioner. Backends are a closed set selected
/// explicitly by the caller; nothing backend-specific leaks past this trait.
pub trait PartitionerBackend {
    fn name(&self) -> &'static str;
    /// Assign every local vertex of `graph` a destination part in
    /// `0..nb_parts`.
    fn partition(
        &mut self,
        graph: &CsrGraph,
        nb_parts: usize,
    ) -> Result<Vec<usize>, PartitionError>;
}

/// Partition decision as index lists for the migration collaborator.
/// Objects staying on their current rank are never recorded.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExportLists {
    /// `nodes[dest]` → local node ids leaving for `dest`.
    pub nodes: Vec<Vec<usize>>,
    /// `elements[dest][region]` → local element ids leaving for `dest`.
    pub elements: Vec<Vec<Vec<usize>>>,
}

impl ExportLists {
    fn new(nb_ranks: usize, nb_regions: usize) -> Self {
        Self {
            nodes: vec![Vec::new(); nb_ranks],
            elements: vec![vec![Vec::new(); nb_regions]; nb_ranks],
        }
    }

    pub fn nb_exported_nodes(&self) -> usize {
        self.nodes.iter().map(Vec::len).sum()
    }

    pub fn nb_exported_elements(&self) -> usize {
        self.elements
            .iter()
            .flat_map(|per_region| per_region.iter().map(Vec::len))
            .sum()
    }
}

/// Drives one repartitioning pass through a backend.
pub struct MeshPartitioner<'a, B, C> {
    backend: B,
    comm: &'a C,
    phase: PartitionPhase,
    graph: CsrGraph,
    layout: Option<ObjectLayout>,
    exports: Option<ExportLists>,
}

impl<'a, B: PartitionerBackend, C: Communicator> MeshPartitioner<'a, B, C> {
    pub fn new(backend: B, comm: &'a C) -> Self {
        Self {
            backend,
            comm,
            phase: PartitionPhase::Uninitialized,
            graph: CsrGraph::default(),
            layout: None,
            exports: None,
        }
    }

    pub fn phase(&self) -> PartitionPhase {
        self.phase
    }

    pub fn graph(&self) -> &CsrGraph {
        &self.graph
    }

    /// Export lists of a completed partition pass.
    pub fn exports(&self) -> Option<&ExportLists> {
        self.exports.as_ref()
    }

    /// Pull the four object-graph queries into CSR form and cross-check the
    /// reported counts, once, across ranks.
    pub fn build_graph(
        &mut self,
        source: &impl ObjectGraph,
        layout: ObjectLayout,
    ) -> Result<(), BlockMeshError> {
        if self.phase != PartitionPhase::Uninitialized {
            return Err(BlockMeshError::InvalidState {
                operation: "build_graph",
                required: "an uninitialized adapter",
            });
        }
        let rank = self.comm.rank();
        let nb_ranks = self.comm.size();

        let owned = source.nb_objects_owned_by_part(rank);
        if layout.nb_owned_objects() != owned {
            return Err(BlockMeshError::GraphInconsistency(format!(
                "object layout covers {} objects, graph owns {owned}",
                layout.nb_owned_objects()
            )));
        }

        let mut vertex_ids = Vec::new();
        source.list_of_objects_owned_by_part(rank, &mut vertex_ids);
        if vertex_ids.len() != owned {
            return Err(BlockMeshError::GraphInconsistency(format!(
                "owned-object list has {} entries, count query says {owned}",
                vertex_ids.len()
            )));
        }
        let mut counts = Vec::new();
        source.nb_connected_objects_in_part(rank, &mut counts);
        if counts.len() != owned {
            return Err(BlockMeshError::GraphInconsistency(format!(
                "connectivity count list has {} entries, count query says {owned}",
                counts.len()
            )));
        }
        let mut adjncy = Vec::new();
        source.list_of_connected_objects_in_part(rank, &mut adjncy);
        let nb_edges: usize = counts.iter().sum();
        if adjncy.len() != nb_edges {
            return Err(BlockMeshError::GraphInconsistency(format!(
                "neighbor list has {} entries, counts sum to {nb_edges}",
                adjncy.len()
            )));
        }

        let mut vtxdist = Vec::with_capacity(nb_ranks + 1);
        vtxdist.push(0u64);
        for part in 0..nb_ranks {
            vtxdist.push(vtxdist[part] + source.nb_objects_owned_by_part(part) as u64);
        }
        // cross-rank check: every rank must agree on who owns how much
        let gathered = self.comm.all_gather_u64(owned as u64);
        for (part, &count) in gathered.iter().enumerate() {
            let reported = vtxdist[part + 1] - vtxdist[part];
            if count != reported {
                return Err(BlockMeshError::GraphInconsistency(format!(
                    "rank {part} owns {count} objects but the graph reports {reported}"
                )));
            }
        }
        let nb_global = *vtxdist.last().unwrap_or(&0);
        if let Some(&bad) = adjncy.iter().find(|&&n| n >= nb_global) {
            return Err(BlockMeshError::GraphInconsistency(format!(
                "neighbor object {bad} outside the global id space of {nb_global}"
            )));
        }

        let mut xadj = Vec::with_capacity(owned + 1);
        xadj.push(0usize);
        for &count in &counts {
            xadj.push(xadj.last().copied().unwrap_or(0) + count);
        }

        log::debug!(
            "rank {rank}: graph built, {owned} vertices, {nb_edges} edges, {nb_global} global objects"
        );

        self.graph = CsrGraph {
            vtxdist,
            vertex_ids,
            xadj,
            adjncy,
        };
        self.layout = Some(layout);
        self.phase = PartitionPhase::GraphBuilt;
        Ok(())
    }

    /// Run the backend and record every owned object whose destination rank
    /// differs from the current one.
    pub fn partition_graph(&mut self) -> Result<&ExportLists, BlockMeshError> {
        if self.phase != PartitionPhase::GraphBuilt {
            return Err(BlockMeshError::InvalidState {
                operation: "partition_graph",
                required: "a built graph",
            });
        }
        let rank = self.comm.rank();
        let nb_parts = self.comm.size();
        let backend_name = self.backend.name();
        let wrap = |source: PartitionError| BlockMeshError::PartitionerSetup {
            backend: backend_name,
            source,
        };

        let parts = self
            .backend
            .partition(&self.graph, nb_parts)
            .map_err(wrap)?;
        if parts.len() != self.graph.nb_local_vertices() {
            return Err(wrap(PartitionError::ResultLengthMismatch {
                expected: self.graph.nb_local_vertices(),
                found: parts.len(),
            }));
        }
        if let Some(&part) = parts.iter().find(|&&p| p >= nb_parts) {
            return Err(wrap(PartitionError::PartOutOfRange { part, nb_parts }));
        }

        let Some(layout) = self.layout.as_ref() else {
            return Err(BlockMeshError::InvalidState {
                operation: "partition_graph",
                required: "a built graph",
            });
        };
        let mut exports = ExportLists::new(nb_parts, layout.region_element_counts.len());
        for (vertex, &dest) in parts.iter().enumerate() {
            if dest == rank {
                continue;
            }
            if vertex < layout.nb_owned_nodes {
                exports.nodes[dest].push(vertex);
            } else {
                let mut rest = vertex - layout.nb_owned_nodes;
                for (region, &count) in layout.region_element_counts.iter().enumerate() {
                    if rest < count {
                        exports.elements[dest][region].push(rest);
                        break;
                    }
                    rest -= count;
                }
            }
        }

        log::info!(
            "rank {rank}: partition decided, exporting {} nodes and {} elements",
            exports.nb_exported_nodes(),
            exports.nb_exported_elements()
        );
        self.phase = PartitionPhase::Partitioned;
        Ok(self.exports.insert(exports))
    }
}
