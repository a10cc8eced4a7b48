//! `BlockDescription`: the validated user-supplied block topology tables.
//!
//! Row shapes are checked as tables are set; cross-table consistency (row
//! counts vs. the block table, corner ids vs. the point table) is checked
//! once in [`validate`](BlockDescription::validate), which every mesh build
//! runs before touching the data.

use crate::mesh_error::BlockMeshError;

/// Named group of declared boundary faces (corner-id rows).
#[derive(Clone, Debug)]
pub struct PatchSpec {
    pub name: String,
    pub faces: Vec<Vec<usize>>,
}

/// A pair of patch names whose faces are stitched periodically: positive
/// faces under `master` link to negative faces under `slave` in declaration
/// order.
#[derive(Clone, Debug)]
pub struct PeriodicPair {
    pub master: String,
    pub slave: String,
}

/// Raw input tables for one block-structured mesh.
///
/// Only topological inputs live here. Curved-edge treatment (arc or radial
/// blending) belongs to the [`CoordinateMapper`](crate::geometry::CoordinateMapper)
/// injected into assembly, and repartitioning is never triggered from the
/// description: the caller decides by running a
/// [`MeshPartitioner`](crate::partitioning::MeshPartitioner) on the built mesh.
#[derive(Clone, Debug)]
pub struct BlockDescription {
    dimensions: usize,
    points: Vec<Vec<f64>>,
    blocks: Vec<Vec<usize>>,
    subdivisions: Vec<Vec<usize>>,
    gradings: Vec<Vec<f64>>,
    block_regions: Vec<String>,
    patches: Vec<PatchSpec>,
    periodic_pairs: Vec<PeriodicPair>,
}

impl BlockDescription {
    /// Corner count per block row: 4 in 2D, 8 in 3D.
    pub fn corners_per_block(&self) -> usize {
        1 << self.dimensions
    }

    /// Grading coefficients per block row: one per block edge, 4 in 2D, 12 in 3D.
    pub fn gradings_per_block(&self) -> usize {
        self.dimensions * (1 << (self.dimensions - 1))
    }

    pub fn new(dimensions: usize) -> Result<Self, BlockMeshError> {
        if dimensions != 2 && dimensions != 3 {
            return Err(BlockMeshError::BadDimension(dimensions));
        }
        Ok(Self {
            dimensions,
            points: Vec::new(),
            blocks: Vec::new(),
            subdivisions: Vec::new(),
            gradings: Vec::new(),
            block_regions: Vec::new(),
            patches: Vec::new(),
            periodic_pairs: Vec::new(),
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Point table: rows of `dimensions` reals.
    pub fn set_points(&mut self, points: Vec<Vec<f64>>) -> Result<&mut Self, BlockMeshError> {
        for (row, point) in points.iter().enumerate() {
            if point.len() != self.dimensions {
                return Err(BlockMeshError::PointRowMismatch {
                    row,
                    expected: self.dimensions,
                    found: point.len(),
                });
            }
        }
        self.points = points;
        Ok(self)
    }

    /// Block table: rows of 4 (2D) or 8 (3D) corner point indices.
    pub fn set_blocks(&mut self, blocks: Vec<Vec<usize>>) -> Result<&mut Self, BlockMeshError> {
        let expected = self.corners_per_block();
        for (row, corners) in blocks.iter().enumerate() {
            if corners.len() != expected {
                return Err(BlockMeshError::CornerRowMismatch {
                    row,
                    expected,
                    found: corners.len(),
                });
            }
        }
        self.blocks = blocks;
        Ok(self)
    }

    /// Subdivision table: rows of `dimensions` positive segment counts.
    pub fn set_subdivisions(
        &mut self,
        subdivisions: Vec<Vec<usize>>,
    ) -> Result<&mut Self, BlockMeshError> {
        for (row, segments) in subdivisions.iter().enumerate() {
            if segments.len() != self.dimensions {
                return Err(BlockMeshError::BadSubdivisions {
                    row,
                    reason: format!("{} entries, expected {}", segments.len(), self.dimensions),
                });
            }
            if segments.iter().any(|&s| s == 0) {
                return Err(BlockMeshError::BadSubdivisions {
                    row,
                    reason: "segment counts must be positive".to_string(),
                });
            }
        }
        self.subdivisions = subdivisions;
        Ok(self)
    }

    /// Grading table: rows of one coefficient per block edge.
    pub fn set_gradings(&mut self, gradings: Vec<Vec<f64>>) -> Result<&mut Self, BlockMeshError> {
        let expected = self.gradings_per_block();
        for (row, coefficients) in gradings.iter().enumerate() {
            if coefficients.len() != expected {
                return Err(BlockMeshError::GradingRowMismatch {
                    row,
                    expected,
                    found: coefficients.len(),
                });
            }
        }
        self.gradings = gradings;
        Ok(self)
    }

    /// Optional per-block region names; empty means one `"interior"` region.
    pub fn set_block_regions(&mut self, regions: Vec<String>) -> &mut Self {
        self.block_regions = regions;
        self
    }

    /// Declare a named boundary patch from corner-id face rows (2 ids per
    /// face in 2D, 4 in 3D). Repeated names extend the same group.
    pub fn add_patch(
        &mut self,
        name: impl Into<String>,
        faces: Vec<Vec<usize>>,
    ) -> Result<&mut Self, BlockMeshError> {
        let name = name.into();
        let expected = self.corners_per_block() / 2;
        for (row, face) in faces.iter().enumerate() {
            if face.len() != expected {
                return Err(BlockMeshError::CornerRowMismatch {
                    row,
                    expected,
                    found: face.len(),
                });
            }
        }
        if let Some(existing) = self.patches.iter_mut().find(|p| p.name == name) {
            existing.faces.extend(faces);
        } else {
            self.patches.push(PatchSpec { name, faces });
        }
        Ok(self)
    }

    /// Stitch two declared patches periodically.
    pub fn add_periodic_pair(
        &mut self,
        master: impl Into<String>,
        slave: impl Into<String>,
    ) -> &mut Self {
        self.periodic_pairs.push(PeriodicPair {
            master: master.into(),
            slave: slave.into(),
        });
        self
    }

    pub fn points(&self) -> &[Vec<f64>] {
        &self.points
    }

    pub fn blocks(&self) -> &[Vec<usize>] {
        &self.blocks
    }

    pub fn subdivisions(&self) -> &[Vec<usize>] {
        &self.subdivisions
    }

    pub fn gradings(&self) -> &[Vec<f64>] {
        &self.gradings
    }

    pub fn block_regions(&self) -> &[String] {
        &self.block_regions
    }

    pub fn patches(&self) -> &[PatchSpec] {
        &self.patches
    }

    pub fn periodic_pairs(&self) -> &[PeriodicPair] {
        &self.periodic_pairs
    }

    /// Cross-table consistency checks run at the start of every build.
    pub fn validate(&self) -> Result<(), BlockMeshError> {
        if self.points.is_empty() {
            return Err(BlockMeshError::MissingInput("points"));
        }
        if self.blocks.is_empty() {
            return Err(BlockMeshError::MissingInput("blocks"));
        }
        if self.subdivisions.is_empty() {
            return Err(BlockMeshError::MissingInput("subdivisions"));
        }
        if self.gradings.is_empty() {
            return Err(BlockMeshError::MissingInput("gradings"));
        }
        let nb_blocks = self.blocks.len();
        if self.subdivisions.len() != nb_blocks {
            return Err(BlockMeshError::TableLengthMismatch {
                table: "subdivisions",
                expected: nb_blocks,
                found: self.subdivisions.len(),
            });
        }
        if self.gradings.len() != nb_blocks {
            return Err(BlockMeshError::TableLengthMismatch {
                table: "gradings",
                expected: nb_blocks,
                found: self.gradings.len(),
            });
        }
        if !self.block_regions.is_empty() && self.block_regions.len() != nb_blocks {
            return Err(BlockMeshError::RegionCountMismatch {
                expected: nb_blocks,
                found: self.block_regions.len(),
            });
        }
        for (block, corners) in self.blocks.iter().enumerate() {
            if let Some(&point) = corners.iter().find(|&&c| c >= self.points.len()) {
                return Err(BlockMeshError::UnknownPoint { block, point });
            }
        }
        // patch faces over unknown points never match a block face and are
        // reported as dangling by the face-connectivity pass
        Ok(())
    }

    /// Region name per block, auto-filled to `"interior"` when none declared.
    pub fn effective_regions(&self) -> Vec<String> {
        if self.block_regions.is_empty() {
            vec!["interior".to_string(); self.blocks.len()]
        } else {
            self.block_regions.clone()
        }
    }
}
