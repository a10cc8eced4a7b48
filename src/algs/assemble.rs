//! Mesh assembly: walk all blocks and patch groups, emit rank-owned element
//! connectivity and coordinates through the global/local index resolver.
//!
//! Topology derivation and range distribution complete for *all* blocks
//! before the first `to_local` call, because ghost resolution needs every
//! block's node distribution available up front.

use itertools::iproduct;

use crate::algs::communicator::Communicator;
use crate::algs::distribute::owning_rank;
use crate::data::ghost_map::{GhostEntry, GhostMap};
use crate::data::mesh::{DistributedMesh, Region};
use crate::geometry::CoordinateMapper;
use crate::mesh_error::BlockMeshError;
use crate::topology::block::{BlockIndex, MAX_DIM, Orientation};
use crate::topology::builder::{BlockTopology, build_topology};
use crate::topology::description::BlockDescription;

/// Structured corner offsets of one element, quad/hex corner order.
const QUAD_CORNERS: [[usize; MAX_DIM]; 4] = [[0, 0, 0], [1, 0, 0], [1, 1, 0], [0, 1, 0]];
const HEX_CORNERS: [[usize; MAX_DIM]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

fn element_corners(dimensions: usize) -> &'static [[usize; MAX_DIM]] {
    match dimensions {
        2 => &QUAD_CORNERS,
        _ => &HEX_CORNERS,
    }
}

/// Surface-element winding over the transverse directions, chosen so the
/// face normal points out of the block on either side.
const FACE_WINDING_3D: [[(usize, usize); 4]; 2] = [
    [(0, 0), (0, 1), (1, 1), (1, 0)], // negative side
    [(0, 0), (1, 0), (1, 1), (0, 1)], // positive side
];
const FACE_WINDING_2D: [[usize; 2]; 2] = [
    [1, 0], // negative side
    [0, 1], // positive side
];

/// Resolves block-local structured coordinates to rank-local node ids,
/// transparently allocating ghost slots for non-owned nodes.
///
/// One resolver lives for exactly one mesh build; its ghost map starts empty
/// and is never shared across builds.
pub struct IndexResolver<'a> {
    topology: &'a BlockTopology,
    rank: usize,
    /// Local offset of each block's rank-owned nodes.
    local_node_start: Vec<u64>,
    nb_owned_nodes: usize,
    ghosts: GhostMap,
}

impl<'a> IndexResolver<'a> {
    pub fn new(topology: &'a BlockTopology, rank: usize) -> Self {
        assert!(rank < topology.nb_ranks, "rank outside the distribution");
        let mut local_node_start = Vec::with_capacity(topology.blocks.len());
        let mut running = 0u64;
        for block in &topology.blocks {
            local_node_start.push(running);
            running += block.nodes_distribution[rank + 1] - block.nodes_distribution[rank];
        }
        Self {
            topology,
            rank,
            local_node_start,
            nb_owned_nodes: running as usize,
            ghosts: GhostMap::default(),
        }
    }

    pub fn nb_owned_nodes(&self) -> usize {
        self.nb_owned_nodes
    }

    pub fn nb_ghosts(&self) -> usize {
        self.ghosts.len()
    }

    pub fn ghosts(&self) -> &GhostMap {
        &self.ghosts
    }

    /// Rank-local node id of a structured coordinate.
    ///
    /// Owned nodes map by offset arithmetic; foreign nodes get (or reuse) a
    /// ghost slot appended after all owned locals. Repeated requests for the
    /// same global id are idempotent.
    pub fn to_local(&mut self, block: BlockIndex, ijk: [usize; MAX_DIM]) -> usize {
        let (home, local_ijk) = self.topology.resolve(block, ijk);
        let blk = &self.topology.blocks[home.get()];
        let global = blk.global_node_start() + blk.node_offset(local_ijk) as u64;
        let dist = &blk.nodes_distribution;
        if global >= dist[self.rank] && global < dist[self.rank + 1] {
            (global - dist[self.rank] + self.local_node_start[home.get()]) as usize
        } else {
            let owner = owning_rank(dist, global);
            self.nb_owned_nodes
                + self.ghosts.resolve_or_insert(global, || GhostEntry {
                    global,
                    owner,
                    home,
                    ijk: local_ijk,
                })
        }
    }
}

/// Build the distributed mesh for the calling rank: derive the topology,
/// emit rank-owned volume and surface elements, generate coordinates through
/// `mapper`, and assign globally unique element ids.
pub fn create_mesh<C: Communicator>(
    desc: &BlockDescription,
    comm: &C,
    mapper: &dyn CoordinateMapper,
) -> Result<DistributedMesh, BlockMeshError> {
    let topology = build_topology(desc, comm.size())?;
    assemble_mesh(&topology, comm, mapper)
}

/// Assembly over an already-derived topology.
pub fn assemble_mesh<C: Communicator>(
    topology: &BlockTopology,
    comm: &C,
    mapper: &dyn CoordinateMapper,
) -> Result<DistributedMesh, BlockMeshError> {
    let rank = comm.rank();
    let dim = topology.dimensions;
    let mut resolver = IndexResolver::new(topology, rank);

    // volume pass: every block's rank-owned elements, in declaration order
    let mut regions: Vec<Region> = topology
        .region_names
        .iter()
        .map(|name| Region {
            name: name.clone(),
            nodes_per_element: 1 << dim,
            connectivity: Vec::new(),
            element_global_ids: Vec::new(),
            element_ranks: Vec::new(),
            is_surface: false,
        })
        .collect();

    for (b, block) in topology.blocks.iter().enumerate() {
        let index = BlockIndex::new(b);
        let start = block.global_element_start();
        let owned = block.elements_distribution[rank]..block.elements_distribution[rank + 1];
        for global_element in owned {
            let ijk = block.element_ijk((global_element - start) as usize);
            let region = block.region;
            for corner in element_corners(dim) {
                let node = [
                    ijk[0] + corner[0],
                    ijk[1] + corner[1],
                    ijk[2] + corner[2],
                ];
                let local = resolver.to_local(index, node);
                regions[region].connectivity.push(local);
            }
        }
    }
    let ghosts_after_volume = resolver.nb_ghosts();

    // patch pass: surface elements whose adjacent volume element is owned here
    for (name, patches) in &topology.patches {
        let mut region = Region {
            name: name.clone(),
            nodes_per_element: 1 << (dim - 1),
            connectivity: Vec::new(),
            element_global_ids: Vec::new(),
            element_ranks: Vec::new(),
            is_surface: true,
        };
        for patch in patches {
            emit_patch_elements(topology, patch, rank, &mut resolver, &mut region.connectivity);
        }
        regions.push(region);
    }
    assert_eq!(
        resolver.nb_ghosts(),
        ghosts_after_volume,
        "surface patches must not introduce new ghost nodes"
    );

    // coordinate field and node id/rank fields, owned first then ghosts
    let nb_owned = resolver.nb_owned_nodes();
    let nb_local = nb_owned + resolver.nb_ghosts();
    let mut coordinates = vec![0.0; nb_local * dim];
    let mut node_global_ids = vec![0u64; nb_local];
    let mut node_ranks = vec![rank; nb_local];

    for (b, block) in topology.blocks.iter().enumerate() {
        let index = BlockIndex::new(b);
        let dist = &block.nodes_distribution;
        for global in dist[rank]..dist[rank + 1] {
            let local = (resolver.local_node_start[b] + (global - dist[rank])) as usize;
            let ijk = block.node_ijk((global - block.global_node_start()) as usize);
            node_global_ids[local] = global;
            let out = &mut coordinates[local * dim..(local + 1) * dim];
            mapper.eval(index, &parametric(block.segments, ijk), out);
        }
    }
    for (ordinal, entry) in resolver.ghosts().entries().iter().enumerate() {
        let local = nb_owned + ordinal;
        node_global_ids[local] = entry.global;
        node_ranks[local] = entry.owner;
        let home = &topology.blocks[entry.home.get()];
        let out = &mut coordinates[local * dim..(local + 1) * dim];
        mapper.eval(entry.home, &parametric(home.segments, entry.ijk), out);
    }

    // globally unique, rank-contiguous element ids via an exclusive prefix sum
    let nb_local_elements: u64 = regions.iter().map(|r| r.nb_elements() as u64).sum();
    let counts = comm.all_gather_u64(nb_local_elements);
    let base: u64 = counts[..rank].iter().sum();
    let total_elements: u64 = counts.iter().sum();
    let mut next = base;
    for region in &mut regions {
        let nb = region.nb_elements();
        region.element_global_ids.extend(next..next + nb as u64);
        region.element_ranks.extend(std::iter::repeat_n(rank, nb));
        next += nb as u64;
    }

    log::info!(
        "rank {rank}: assembled {} owned nodes, {} ghosts, {} elements in {} regions",
        nb_owned,
        resolver.nb_ghosts(),
        nb_local_elements,
        regions.len()
    );

    Ok(DistributedMesh {
        dimensions: dim,
        rank,
        nb_ranks: comm.size(),
        coordinates,
        node_global_ids,
        node_ranks,
        nb_owned_nodes: nb_owned,
        total_nodes: topology.total_nodes,
        total_elements,
        regions,
    })
}

/// Parametric coordinate of a node layer inside its home block.
fn parametric(segments: [usize; MAX_DIM], ijk: [usize; MAX_DIM]) -> [f64; MAX_DIM] {
    let mut xi = [0.0; MAX_DIM];
    for d in 0..MAX_DIM {
        xi[d] = ijk[d] as f64 / segments[d] as f64;
    }
    xi
}

fn emit_patch_elements(
    topology: &BlockTopology,
    patch: &crate::topology::block::Patch,
    rank: usize,
    resolver: &mut IndexResolver<'_>,
    connectivity: &mut Vec<usize>,
) {
    let block = &topology.blocks[patch.block.get()];
    let dim = topology.dimensions;
    let d = patch.fixed_direction;
    let element_layer = match patch.orientation {
        Orientation::Negative => 0,
        Orientation::Positive => block.segments[d] - 1,
    };
    let side = match patch.orientation {
        Orientation::Negative => 0,
        Orientation::Positive => 1,
    };
    let owned = &block.elements_distribution;
    let start = block.global_element_start();

    if dim == 2 {
        let t = 1 - d;
        for a in 0..block.segments[t] {
            let mut element = [0; MAX_DIM];
            element[d] = element_layer;
            element[t] = a;
            let global = start + block.element_offset(element) as u64;
            if global < owned[rank] || global >= owned[rank + 1] {
                continue;
            }
            for &offset in &FACE_WINDING_2D[side] {
                let mut node = [0; MAX_DIM];
                node[d] = patch.fixed_index;
                node[t] = a + offset;
                connectivity.push(resolver.to_local(patch.block, node));
            }
        }
    } else {
        let (t1, t2) = match d {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        for (a, b) in iproduct!(0..block.segments[t1], 0..block.segments[t2]) {
            let mut element = [0; MAX_DIM];
            element[d] = element_layer;
            element[t1] = a;
            element[t2] = b;
            let global = start + block.element_offset(element) as u64;
            if global < owned[rank] || global >= owned[rank + 1] {
                continue;
            }
            for &(da, db) in &FACE_WINDING_3D[side] {
                let mut node = [0; MAX_DIM];
                node[d] = patch.fixed_index;
                node[t1] = a + da;
                node[t2] = b + db;
                connectivity.push(resolver.to_local(patch.block, node));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::description::BlockDescription;

    // two unit quads stitched along x, fully patched
    fn two_block_strip() -> BlockDescription {
        let mut desc = BlockDescription::new(2).unwrap();
        desc.set_points(vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
            vec![2.0, 1.0],
        ])
        .unwrap()
        .set_blocks(vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]])
        .unwrap()
        .set_subdivisions(vec![vec![2, 2], vec![2, 2]])
        .unwrap()
        .set_gradings(vec![vec![1.0; 4], vec![1.0; 4]])
        .unwrap();
        desc.add_patch("left", vec![vec![3, 0]]).unwrap();
        desc.add_patch("right", vec![vec![2, 5]]).unwrap();
        desc.add_patch("bottom", vec![vec![0, 1], vec![1, 2]])
            .unwrap();
        desc.add_patch("top", vec![vec![4, 3], vec![5, 4]]).unwrap();
        desc
    }

    #[test]
    fn seam_nodes_resolve_to_one_global_id() {
        let desc = two_block_strip();
        let topology = build_topology(&desc, 1).unwrap();
        let a = BlockIndex::new(0);
        let b = BlockIndex::new(1);
        // block 0 is unbounded in +x: addressing its seam layer follows the
        // neighbor and lands on block 1's first layer
        for j in 0..3 {
            let through_a = topology.global_node_id(a, [2, j, 0]);
            let through_b = topology.global_node_id(b, [0, j, 0]);
            assert_eq!(through_a, through_b);
        }
    }

    #[test]
    fn ghost_allocation_is_idempotent() {
        let desc = two_block_strip();
        let topology = build_topology(&desc, 2).unwrap();
        let mut resolver = IndexResolver::new(&topology, 1);
        // a node owned by rank 0 (global id 0 lives in rank 0's range)
        let first = resolver.to_local(BlockIndex::new(0), [0, 0, 0]);
        let ghosts_after_first = resolver.nb_ghosts();
        let second = resolver.to_local(BlockIndex::new(0), [0, 0, 0]);
        assert_eq!(first, second);
        assert_eq!(resolver.nb_ghosts(), ghosts_after_first);
        assert_eq!(ghosts_after_first, 1);
        assert!(first >= resolver.nb_owned_nodes());
    }

    #[test]
    fn owned_nodes_never_allocate_ghosts() {
        let desc = two_block_strip();
        let topology = build_topology(&desc, 2).unwrap();
        let mut resolver = IndexResolver::new(&topology, 0);
        let local = resolver.to_local(BlockIndex::new(0), [0, 0, 0]);
        assert!(local < resolver.nb_owned_nodes());
        assert_eq!(resolver.nb_ghosts(), 0);
    }
}
