//! Face connectivity derived from block corner connectivity.
//!
//! Every block face and every declared patch face is keyed on its sorted
//! corner-id set; two uses of the same key are adjacent. This is the lookup
//! that turns the raw corner tables into neighbor links and patch membership.

use std::collections::HashMap;

use crate::mesh_error::BlockMeshError;
use crate::topology::block::{BlockIndex, Orientation};

/// Local corner orderings of the negative/positive face per direction,
/// quadrilateral corner convention (counter-clockwise from the origin).
const QUAD_FACES: [[&[usize]; 2]; 2] = [
    [&[0, 3], &[1, 2]], // i
    [&[0, 1], &[3, 2]], // j
];

/// Same for hexahedra (corners 0..3 bottom layer, 4..7 top layer).
const HEX_FACES: [[&[usize]; 2]; 3] = [
    [&[0, 3, 7, 4], &[1, 2, 6, 5]], // i
    [&[0, 1, 5, 4], &[3, 2, 6, 7]], // j
    [&[0, 1, 2, 3], &[4, 5, 6, 7]], // k
];

/// Local corner indices of a block face.
pub fn face_corners(dimensions: usize, direction: usize, orientation: Orientation) -> &'static [usize] {
    let side = match orientation {
        Orientation::Negative => 0,
        Orientation::Positive => 1,
    };
    match dimensions {
        2 => QUAD_FACES[direction][side],
        3 => HEX_FACES[direction][side],
        _ => unreachable!("dimension validated at description time"),
    }
}

/// One use of a face key: either a logical face of a volume block, or a
/// declared (dimension-1) patch face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceUse {
    BlockFace {
        block: BlockIndex,
        direction: usize,
        orientation: Orientation,
    },
    PatchFace {
        patch: usize,
        face: usize,
    },
}

/// Sorted-corner-set face index over all blocks and declared patch faces.
#[derive(Debug)]
pub struct FaceConnectivity {
    uses: HashMap<Vec<usize>, Vec<FaceUse>>,
    dimensions: usize,
}

impl FaceConnectivity {
    /// Index every face of every block plus every declared patch face.
    ///
    /// `patch_faces[p]` is the corner-id face list of the `p`-th declared
    /// patch; a patch face that matches no block face is a setup error
    /// reported with the patch's name.
    pub fn build(
        dimensions: usize,
        block_corners: &[Vec<usize>],
        patch_names: &[String],
        patch_faces: &[Vec<Vec<usize>>],
    ) -> Result<Self, BlockMeshError> {
        let mut uses: HashMap<Vec<usize>, Vec<FaceUse>> = HashMap::new();

        for (b, corners) in block_corners.iter().enumerate() {
            for direction in 0..dimensions {
                for orientation in [Orientation::Negative, Orientation::Positive] {
                    let key = face_key(corners, face_corners(dimensions, direction, orientation));
                    uses.entry(key).or_default().push(FaceUse::BlockFace {
                        block: BlockIndex::new(b),
                        direction,
                        orientation,
                    });
                }
            }
        }

        for (p, faces) in patch_faces.iter().enumerate() {
            for (f, face) in faces.iter().enumerate() {
                let mut key = face.clone();
                key.sort_unstable();
                let entry = uses.entry(key).or_default();
                // a patch face keyed off no block face never gets a block use
                entry.push(FaceUse::PatchFace { patch: p, face: f });
            }
        }

        let connectivity = Self { uses, dimensions };

        for (p, faces) in patch_faces.iter().enumerate() {
            for (f, face) in faces.iter().enumerate() {
                let mut key = face.clone();
                key.sort_unstable();
                let on_block = connectivity.uses[&key]
                    .iter()
                    .any(|u| matches!(u, FaceUse::BlockFace { .. }));
                if !on_block {
                    return Err(BlockMeshError::DanglingPatchFace {
                        patch: patch_names[p].clone(),
                        face: f,
                    });
                }
            }
        }

        Ok(connectivity)
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The single element adjacent to the given block face, or `None` when
    /// the face is uncovered. More than one adjacent element is ambiguous.
    pub fn adjacent(
        &self,
        block_corners: &[usize],
        block: BlockIndex,
        direction: usize,
        orientation: Orientation,
    ) -> Result<Option<FaceUse>, BlockMeshError> {
        let key = face_key(
            block_corners,
            face_corners(self.dimensions, direction, orientation),
        );
        let own = FaceUse::BlockFace {
            block,
            direction,
            orientation,
        };
        let side = match orientation {
            Orientation::Negative => "negative",
            Orientation::Positive => "positive",
        };
        let others: Vec<FaceUse> = self
            .uses
            .get(&key)
            .map(|v| v.iter().copied().filter(|u| *u != own).collect())
            .unwrap_or_default();
        match others.len() {
            0 => Ok(None),
            1 => Ok(Some(others[0])),
            _ => Err(BlockMeshError::AmbiguousFace {
                block: block.get(),
                direction,
                side,
            }),
        }
    }
}

fn face_key(corners: &[usize], local: &[usize]) -> Vec<usize> {
    let mut key: Vec<usize> = local.iter().map(|&l| corners[l]).collect();
    key.sort_unstable();
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    // two unit quads side by side: 0-1-4-3 and 1-2-5-4
    fn two_quads() -> Vec<Vec<usize>> {
        vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]]
    }

    #[test]
    fn stitched_quads_see_each_other() {
        let blocks = two_quads();
        let conn = FaceConnectivity::build(2, &blocks, &[], &[]).unwrap();
        let adjacent = conn
            .adjacent(&blocks[0], BlockIndex::new(0), 0, Orientation::Positive)
            .unwrap();
        assert_eq!(
            adjacent,
            Some(FaceUse::BlockFace {
                block: BlockIndex::new(1),
                direction: 0,
                orientation: Orientation::Negative,
            })
        );
    }

    #[test]
    fn declared_patch_face_matches_boundary() {
        let blocks = two_quads();
        let names = vec!["left".to_string()];
        let faces = vec![vec![vec![3, 0]]];
        let conn = FaceConnectivity::build(2, &blocks, &names, &faces).unwrap();
        let adjacent = conn
            .adjacent(&blocks[0], BlockIndex::new(0), 0, Orientation::Negative)
            .unwrap();
        assert_eq!(adjacent, Some(FaceUse::PatchFace { patch: 0, face: 0 }));
    }

    #[test]
    fn uncovered_face_reports_none() {
        let blocks = two_quads();
        let conn = FaceConnectivity::build(2, &blocks, &[], &[]).unwrap();
        let adjacent = conn
            .adjacent(&blocks[0], BlockIndex::new(0), 1, Orientation::Negative)
            .unwrap();
        assert_eq!(adjacent, None);
    }

    #[test]
    fn dangling_patch_face_is_an_error() {
        let blocks = two_quads();
        let names = vec!["bogus".to_string()];
        let faces = vec![vec![vec![7, 8]]];
        let err = FaceConnectivity::build(2, &blocks, &names, &faces).unwrap_err();
        assert!(matches!(
            err,
            BlockMeshError::DanglingPatchFace { ref patch, face: 0 } if patch == "bogus"
        ));
    }
}
