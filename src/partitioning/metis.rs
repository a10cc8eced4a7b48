//! METIS-backed graph partitioner.
//!
//! METIS is a serial library: the whole graph must live on one rank. The
//! backend refuses distributed graphs instead of silently partitioning a
//! local subgraph.

use std::collections::HashMap;

use crate::partitioning::adapter::{CsrGraph, PartitionerBackend};
use crate::partitioning::error::PartitionError;

/// Which METIS algorithm to run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MetisMethod {
    /// Multilevel recursive bisection.
    Recursive,
    /// Multilevel k-way partitioning.
    KWay,
}

pub struct MetisBackend {
    method: MetisMethod,
}

impl MetisBackend {
    pub fn new(method: MetisMethod) -> Self {
        Self { method }
    }
}

impl Default for MetisBackend {
    fn default() -> Self {
        Self::new(MetisMethod::KWay)
    }
}

impl PartitionerBackend for MetisBackend {
    fn name(&self) -> &'static str {
        "metis"
    }

    fn partition(
        &mut self,
        graph: &CsrGraph,
        nb_parts: usize,
    ) -> Result<Vec<usize>, PartitionError> {
        let nb_vertices = graph.nb_local_vertices();
        if (nb_vertices as u64) != graph.nb_global_vertices() {
            let owning_ranks = graph
                .vtxdist
                .windows(2)
                .filter(|w| w[1] > w[0])
                .count();
            return Err(PartitionError::DistributedGraphUnsupported(owning_ranks));
        }
        if nb_vertices == 0 {
            return Ok(Vec::new());
        }
        if nb_parts <= 1 {
            return Ok(vec![0; nb_vertices]);
        }

        // neighbor ids are mesh-wide object ids, METIS wants local ordinals
        let ordinal_of: HashMap<u64, metis::Idx> = graph
            .vertex_ids
            .iter()
            .enumerate()
            .map(|(v, &id)| (id, v as metis::Idx))
            .collect();

        let xadj: Vec<metis::Idx> = graph.xadj.iter().map(|&o| o as metis::Idx).collect();
        let mut adjncy = Vec::with_capacity(graph.nb_local_edges());
        for &neighbor in &graph.adjncy {
            let ordinal = ordinal_of
                .get(&neighbor)
                .copied()
                .ok_or(PartitionError::VertexNotFound(neighbor))?;
            adjncy.push(ordinal);
        }

        let mut part = vec![0 as metis::Idx; nb_vertices];
        let metis_graph = metis::Graph::new(1, nb_parts as metis::Idx, &xadj, &adjncy)
            .map_err(|e| PartitionError::Other(format!("graph setup failed: {e}")))?;
        let run = match self.method {
            MetisMethod::Recursive => metis_graph.part_recursive(&mut part),
            MetisMethod::KWay => metis_graph.part_kway(&mut part),
        };
        run.map_err(|e| PartitionError::Other(format!("partitioning failed: {e}")))?;

        Ok(part.into_iter().map(|p| p as usize).collect())
    }
}
