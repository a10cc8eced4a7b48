//! Distributed object graph over an assembled mesh.
//!
//! Partitionable objects are the mesh's nodes followed by each region's
//! elements in declaration order, identified by a mesh-wide object id
//! (nodes keep their global node id; element ids are offset by the total
//! node count). Adjacency is node–element incidence expanded bidirectionally
//! from the rank's own connectivity.
//!
//! The four query methods are the seam between this reusable graph logic and
//! any concrete partitioner backend; no backend type leaks through them.

use crate::algs::communicator::Communicator;
use crate::data::mesh::DistributedMesh;

/// Primitive queries a partitioner adapter is built on.
///
/// Adjacency is reported rank-locally: an owned node lists only the elements
/// this rank's connectivity touches it with, so across ranks the relation is
/// not symmetric (the foreign elements referencing an owned node are listed
/// by their owning rank). A distributed backend consuming this trait must
/// symmetrize, or exchange ghost incidence, before relying on symmetry.
pub trait ObjectGraph {
    /// Number of objects owned by `part`.
    fn nb_objects_owned_by_part(&self, part: usize) -> usize;
    /// Global object ids owned by `part`, in local vertex order.
    fn list_of_objects_owned_by_part(&self, part: usize, object_ids: &mut Vec<u64>);
    /// Neighbor count per owned vertex of `part`, in local vertex order.
    fn nb_connected_objects_in_part(&self, part: usize, counts: &mut Vec<usize>);
    /// Concatenated neighbor object ids, in local vertex order.
    fn list_of_connected_objects_in_part(&self, part: usize, neighbor_ids: &mut Vec<u64>);
}

/// How local vertex ordinals map back onto mesh objects; the adapter needs
/// this to translate a partition decision into export lists.
#[derive(Clone, Debug)]
pub struct ObjectLayout {
    pub nb_owned_nodes: usize,
    /// Local element count per region, in region order.
    pub region_element_counts: Vec<usize>,
}

impl ObjectLayout {
    pub fn nb_owned_objects(&self) -> usize {
        self.nb_owned_nodes + self.region_element_counts.iter().sum::<usize>()
    }
}

/// Node–element incidence graph of one rank's share of the mesh.
pub struct MeshObjectGraph {
    rank: usize,
    /// Owned object count per rank, gathered once at construction.
    owned_per_rank: Vec<u64>,
    /// Global object id per local vertex.
    vertex_ids: Vec<u64>,
    /// Neighbor object ids per local vertex.
    adjacency: Vec<Vec<u64>>,
    layout: ObjectLayout,
}

impl MeshObjectGraph {
    pub fn new<C: Communicator>(mesh: &DistributedMesh, comm: &C) -> Self {
        let nb_owned_nodes = mesh.nb_owned_nodes;
        let nb_elements = mesh.nb_local_elements();
        let mut vertex_ids = Vec::with_capacity(nb_owned_nodes + nb_elements);
        vertex_ids.extend_from_slice(&mesh.node_global_ids[..nb_owned_nodes]);

        let mut node_adjacency: Vec<Vec<u64>> = vec![Vec::new(); nb_owned_nodes];
        let mut element_adjacency: Vec<Vec<u64>> = Vec::with_capacity(nb_elements);
        let mut region_element_counts = Vec::with_capacity(mesh.regions.len());

        for region in &mesh.regions {
            region_element_counts.push(region.nb_elements());
            for e in 0..region.nb_elements() {
                let element_object = mesh.total_nodes + region.element_global_ids[e];
                vertex_ids.push(element_object);
                let mut neighbors = Vec::with_capacity(region.nodes_per_element);
                for &node in region.element(e) {
                    neighbors.push(mesh.node_global_ids[node]);
                    if node < nb_owned_nodes {
                        node_adjacency[node].push(element_object);
                    }
                }
                element_adjacency.push(neighbors);
            }
        }

        let mut adjacency = node_adjacency;
        adjacency.append(&mut element_adjacency);

        let owned = (nb_owned_nodes + nb_elements) as u64;
        let owned_per_rank = comm.all_gather_u64(owned);

        Self {
            rank: comm.rank(),
            owned_per_rank,
            vertex_ids,
            adjacency,
            layout: ObjectLayout {
                nb_owned_nodes,
                region_element_counts,
            },
        }
    }

    pub fn layout(&self) -> &ObjectLayout {
        &self.layout
    }

    /// Mesh-wide object count across all ranks.
    pub fn nb_global_objects(&self) -> u64 {
        self.owned_per_rank.iter().sum()
    }
}

impl ObjectGraph for MeshObjectGraph {
    fn nb_objects_owned_by_part(&self, part: usize) -> usize {
        self.owned_per_rank[part] as usize
    }

    fn list_of_objects_owned_by_part(&self, part: usize, object_ids: &mut Vec<u64>) {
        debug_assert_eq!(part, self.rank, "object lists are rank-local");
        object_ids.clear();
        object_ids.extend_from_slice(&self.vertex_ids);
    }

    fn nb_connected_objects_in_part(&self, part: usize, counts: &mut Vec<usize>) {
        debug_assert_eq!(part, self.rank, "adjacency is rank-local");
        counts.clear();
        counts.extend(self.adjacency.iter().map(Vec::len));
    }

    fn list_of_connected_objects_in_part(&self, part: usize, neighbor_ids: &mut Vec<u64>) {
        debug_assert_eq!(part, self.rank, "adjacency is rank-local");
        neighbor_ids.clear();
        for neighbors in &self.adjacency {
            neighbor_ids.extend_from_slice(neighbors);
        }
    }
}
