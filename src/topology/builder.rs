//! Block topology derivation: raw point/block/face tables in, the block
//! arena plus named patch groups out.
//!
//! All blocks and both distribution tables are complete before the first
//! index resolution happens, because ghost lookup during assembly needs
//! every block's node distribution up front.

use std::collections::{BTreeMap, HashMap, HashSet};

use itertools::Itertools;

use crate::algs::distribute::distribute_range;
use crate::mesh_error::BlockMeshError;
use crate::topology::block::{Block, BlockIndex, MAX_DIM, Orientation, Patch};
use crate::topology::description::BlockDescription;
use crate::topology::face::{FaceConnectivity, FaceUse};

/// Fully derived block topology for one mesh build.
#[derive(Clone, Debug)]
pub struct BlockTopology {
    pub dimensions: usize,
    pub blocks: Vec<Block>,
    /// Patch groups keyed by name, including synthesized interface patches.
    pub patches: BTreeMap<String, Vec<Patch>>,
    /// Volume region names in declaration order, deduplicated.
    pub region_names: Vec<String>,
    pub total_nodes: u64,
    pub total_elements: u64,
    pub nb_ranks: usize,
}

impl BlockTopology {
    /// Follow neighbor links until `ijk` lies inside a block's own extent.
    ///
    /// Indices may exceed an unbounded extent, in which case resolution
    /// recurses into the positive neighbor with the remainder; escaping a
    /// bounded direction is a programming-contract violation.
    pub fn resolve(&self, block: BlockIndex, mut ijk: [usize; MAX_DIM]) -> (BlockIndex, [usize; MAX_DIM]) {
        let blk = &self.blocks[block.get()];
        for d in 0..self.dimensions {
            if ijk[d] >= blk.nb_points[d] {
                let Some(neighbor) = blk.neighbors[d] else {
                    panic!(
                        "structured index {ijk:?} escapes bounded block {block} in direction {d}"
                    );
                };
                ijk[d] -= blk.nb_points[d];
                return self.resolve(neighbor, ijk);
            }
        }
        (block, ijk)
    }

    /// Global node id of a structured coordinate, independent of which
    /// stitched block's local frame was used to address it.
    pub fn global_node_id(&self, block: BlockIndex, ijk: [usize; MAX_DIM]) -> u64 {
        let (home, local) = self.resolve(block, ijk);
        let blk = &self.blocks[home.get()];
        blk.global_node_start() + blk.node_offset(local) as u64
    }
}

/// Derive the block arena and patch groups from the description tables
/// (points, corners, subdivisions, gradings, declared patches) and compute
/// the per-rank node/element distributions.
pub fn build_topology(
    desc: &BlockDescription,
    nb_ranks: usize,
) -> Result<BlockTopology, BlockMeshError> {
    desc.validate()?;
    let dim = desc.dimensions();
    let nb_blocks = desc.blocks().len();

    let regions = desc.effective_regions();
    let region_names: Vec<String> = regions.iter().cloned().unique().collect();
    let region_index: HashMap<&str, usize> = region_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let patch_names: Vec<String> = desc.patches().iter().map(|p| p.name.clone()).collect();
    let patch_faces: Vec<Vec<Vec<usize>>> =
        desc.patches().iter().map(|p| p.faces.clone()).collect();
    let connectivity = FaceConnectivity::build(dim, desc.blocks(), &patch_names, &patch_faces)?;

    let stitches = stitch_periodic(desc, &connectivity, &patch_names)?;

    let mut patches: BTreeMap<String, Vec<Patch>> = BTreeMap::new();
    let mut blocks = Vec::with_capacity(nb_blocks);

    for (b, corners) in desc.blocks().iter().enumerate() {
        let index = BlockIndex::new(b);
        let mut segments = [1usize; MAX_DIM];
        for (d, &s) in desc.subdivisions()[b].iter().enumerate() {
            segments[d] = s;
        }

        let mut neighbors = [None; MAX_DIM];
        let mut bounded = [true; MAX_DIM];

        for d in 0..dim {
            // positive side
            if let Some(&slave) = stitches.links.get(&(index, d)) {
                neighbors[d] = Some(slave);
                bounded[d] = false;
            } else {
                match connectivity.adjacent(corners, index, d, Orientation::Positive)? {
                    None => {
                        return Err(BlockMeshError::NoAdjacentElement {
                            block: b,
                            direction: d,
                            side: "positive",
                        });
                    }
                    Some(FaceUse::BlockFace { block: other, .. }) => {
                        neighbors[d] = Some(other);
                        bounded[d] = false;
                        if regions[b] != regions[other.get()] {
                            let name = format!(
                                "{}_interface_to_{}",
                                regions[b],
                                regions[other.get()]
                            );
                            patches.entry(name).or_default().push(Patch {
                                block: index,
                                fixed_direction: d,
                                fixed_index: segments[d],
                                orientation: Orientation::Positive,
                            });
                        }
                    }
                    Some(FaceUse::PatchFace { patch, .. }) => {
                        patches
                            .entry(patch_names[patch].clone())
                            .or_default()
                            .push(Patch {
                                block: index,
                                fixed_direction: d,
                                fixed_index: segments[d],
                                orientation: Orientation::Positive,
                            });
                    }
                }
            }

            // negative side: a neighbor here is recorded by the other block's
            // positive pass; only uncovered faces and patches matter
            if !stitches.covered_negative.contains(&(index, d)) {
                match connectivity.adjacent(corners, index, d, Orientation::Negative)? {
                    None => {
                        return Err(BlockMeshError::NoAdjacentElement {
                            block: b,
                            direction: d,
                            side: "negative",
                        });
                    }
                    Some(FaceUse::BlockFace { .. }) => {}
                    Some(FaceUse::PatchFace { patch, .. }) => {
                        patches
                            .entry(patch_names[patch].clone())
                            .or_default()
                            .push(Patch {
                                block: index,
                                fixed_direction: d,
                                fixed_index: 0,
                                orientation: Orientation::Negative,
                            });
                    }
                }
            }
        }

        let mut nb_points = [1usize; MAX_DIM];
        for d in 0..dim {
            nb_points[d] = segments[d] + bounded[d] as usize;
        }
        let node_strides = [1, nb_points[0], nb_points[0] * nb_points[1]];
        let element_strides = [1, segments[0], segments[0] * segments[1]];

        let group = 1 << (dim - 1);
        let mut gradings = [1.0; MAX_DIM];
        for d in 0..dim {
            gradings[d] = desc.gradings()[b][d * group];
        }

        blocks.push(Block {
            dimensions: dim,
            region: region_index[regions[b].as_str()],
            corners: corners.clone(),
            segments,
            nb_points,
            bounded,
            neighbors,
            gradings,
            node_strides,
            element_strides,
            nodes_distribution: Vec::new(),
            elements_distribution: Vec::new(),
        });
    }

    // lay blocks out contiguously in global id space, in declaration order
    let mut node_offset = 0u64;
    let mut element_offset = 0u64;
    for block in &mut blocks {
        block.nodes_distribution = distribute_range(node_offset, block.nb_nodes(), nb_ranks);
        block.elements_distribution =
            distribute_range(element_offset, block.nb_elements(), nb_ranks);
        node_offset += block.nb_nodes();
        element_offset += block.nb_elements();
    }

    log::debug!(
        "built topology: {} blocks, {} regions, {} patch groups, {} nodes, {} elements",
        blocks.len(),
        region_names.len(),
        patches.len(),
        node_offset,
        element_offset
    );

    Ok(BlockTopology {
        dimensions: dim,
        blocks,
        patches,
        region_names,
        total_nodes: node_offset,
        total_elements: element_offset,
        nb_ranks,
    })
}

struct PeriodicStitches {
    /// Positive-side neighbor override per (block, direction).
    links: HashMap<(BlockIndex, usize), BlockIndex>,
    /// Negative-side faces consumed by a stitch.
    covered_negative: HashSet<(BlockIndex, usize)>,
}

/// Turn periodic patch pairs into neighbor links: positive faces of the
/// master patch link to negative faces of the slave patch, matched in
/// declaration order.
fn stitch_periodic(
    desc: &BlockDescription,
    connectivity: &FaceConnectivity,
    patch_names: &[String],
) -> Result<PeriodicStitches, BlockMeshError> {
    let mut stitches = PeriodicStitches {
        links: HashMap::new(),
        covered_negative: HashSet::new(),
    };
    if desc.periodic_pairs().is_empty() {
        return Ok(stitches);
    }

    // map every declared patch face to the block face it covers
    let mut face_owner: HashMap<(usize, usize), (BlockIndex, usize, Orientation)> = HashMap::new();
    for (b, corners) in desc.blocks().iter().enumerate() {
        let index = BlockIndex::new(b);
        for d in 0..desc.dimensions() {
            for orientation in [Orientation::Negative, Orientation::Positive] {
                if let Some(FaceUse::PatchFace { patch, face }) =
                    connectivity.adjacent(corners, index, d, orientation)?
                {
                    face_owner.insert((patch, face), (index, d, orientation));
                }
            }
        }
    }

    for pair in desc.periodic_pairs() {
        let err = |reason: String| BlockMeshError::PeriodicMismatch {
            master: pair.master.clone(),
            slave: pair.slave.clone(),
            reason,
        };
        let master = patch_names
            .iter()
            .position(|n| *n == pair.master)
            .ok_or_else(|| err(format!("unknown patch `{}`", pair.master)))?;
        let slave = patch_names
            .iter()
            .position(|n| *n == pair.slave)
            .ok_or_else(|| err(format!("unknown patch `{}`", pair.slave)))?;
        let nb_master = desc.patches()[master].faces.len();
        let nb_slave = desc.patches()[slave].faces.len();
        if nb_master != nb_slave {
            return Err(err(format!("{nb_master} master faces vs {nb_slave} slave faces")));
        }
        for f in 0..nb_master {
            let &(master_block, master_dir, master_side) = face_owner
                .get(&(master, f))
                .ok_or_else(|| err(format!("master face {f} covers no block face")))?;
            let &(slave_block, slave_dir, slave_side) = face_owner
                .get(&(slave, f))
                .ok_or_else(|| err(format!("slave face {f} covers no block face")))?;
            if master_side != Orientation::Positive {
                return Err(err(format!("master face {f} is not a positive block face")));
            }
            if slave_side != Orientation::Negative {
                return Err(err(format!("slave face {f} is not a negative block face")));
            }
            if master_dir != slave_dir {
                return Err(err(format!(
                    "face {f} stitches direction {master_dir} to direction {slave_dir}"
                )));
            }
            stitches.links.insert((master_block, master_dir), slave_block);
            stitches.covered_negative.insert((slave_block, slave_dir));
        }
    }
    Ok(stitches)
}
