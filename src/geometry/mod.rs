//! Coordinate generation for block interiors.
//!
//! The mesh assembler treats coordinate evaluation as an injected numeric
//! leaf: anything implementing [`CoordinateMapper`] can place nodes
//! (transfinite interpolation with arc/radial corrections lives behind the
//! same contract). [`MultilinearMapper`] is the straight-edged default: a
//! corner blend with per-direction geometric grading.

use crate::topology::block::{BlockIndex, MAX_DIM};
use crate::topology::description::BlockDescription;

/// Maps a block-local parametric coordinate in `[0,1]^dim` to physical
/// coordinates. `out` has `dimensions` entries.
pub trait CoordinateMapper {
    fn eval(&self, block: BlockIndex, xi: &[f64; MAX_DIM], out: &mut [f64]);
}

impl<F> CoordinateMapper for F
where
    F: Fn(BlockIndex, &[f64; MAX_DIM], &mut [f64]),
{
    fn eval(&self, block: BlockIndex, xi: &[f64; MAX_DIM], out: &mut [f64]) {
        self(block, xi, out)
    }
}

/// Straight-edged corner blend with geometric edge grading.
pub struct MultilinearMapper {
    dimensions: usize,
    /// Corner coordinates per block, `2^dim` rows of `dim` reals.
    corners: Vec<Vec<f64>>,
    /// Representative grading ratio per block and direction.
    gradings: Vec<[f64; MAX_DIM]>,
}

impl MultilinearMapper {
    pub fn new(desc: &BlockDescription) -> Self {
        let dim = desc.dimensions();
        let group = 1 << (dim - 1);
        let corners = desc
            .blocks()
            .iter()
            .map(|block| {
                block
                    .iter()
                    .flat_map(|&p| desc.points()[p].iter().copied())
                    .collect()
            })
            .collect();
        let gradings = desc
            .gradings()
            .iter()
            .map(|row| {
                let mut g = [1.0; MAX_DIM];
                for d in 0..dim {
                    g[d] = row[d * group];
                }
                g
            })
            .collect();
        Self {
            dimensions: dim,
            corners,
            gradings,
        }
    }
}

/// Geometric stretch: maps uniform `t` so that the last/first spacing ratio
/// equals `r`. Identity for `r == 1`.
fn grade(t: f64, r: f64) -> f64 {
    if (r - 1.0).abs() < 1e-12 {
        t
    } else {
        (r.powf(t) - 1.0) / (r - 1.0)
    }
}

impl CoordinateMapper for MultilinearMapper {
    fn eval(&self, block: BlockIndex, xi: &[f64; MAX_DIM], out: &mut [f64]) {
        let corners = &self.corners[block.get()];
        let gradings = &self.gradings[block.get()];
        let dim = self.dimensions;
        let mut s = [0.0; MAX_DIM];
        for d in 0..dim {
            s[d] = grade(xi[d], gradings[d]);
        }
        out.fill(0.0);
        for corner in 0..(1 << dim) {
            let weight = corner_weights(dim, corner, &s);
            for x in 0..dim {
                out[x] += weight * corners[corner * dim + x];
            }
        }
    }
}

/// Blend weight of a corner in CCW quad/hex ordering (0,1,2,3 bottom CCW;
/// 4..7 the same on the top layer).
fn corner_weights(dim: usize, corner: usize, s: &[f64; MAX_DIM]) -> f64 {
    const POSITIVE_I: [bool; 8] = [false, true, true, false, false, true, true, false];
    const POSITIVE_J: [bool; 8] = [false, false, true, true, false, false, true, true];
    let mut w = if POSITIVE_I[corner] { s[0] } else { 1.0 - s[0] };
    w *= if POSITIVE_J[corner] { s[1] } else { 1.0 - s[1] };
    if dim == 3 {
        w *= if corner >= 4 { s[2] } else { 1.0 - s[2] };
    }
    w
}
