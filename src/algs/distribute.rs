//! Contiguous per-rank range distribution.
//!
//! Every block's node and element id spaces are split across ranks with the
//! same policy: `count / nb_ranks` ids per rank, with rank 0 additionally
//! absorbing the remainder. Downstream ghost and ownership arithmetic depends
//! on this exact split, so it must not be rebalanced.

/// Split `[begin, begin + count)` into `nb_ranks` contiguous sub-ranges.
///
/// Returns `nb_ranks + 1` monotonically non-decreasing boundaries with
/// `boundaries[0] == begin` and `boundaries[nb_ranks] == begin + count`.
/// Rank `r` owns `[boundaries[r], boundaries[r + 1])`.
pub fn distribute_range(begin: u64, count: u64, nb_ranks: usize) -> Vec<u64> {
    assert!(nb_ranks > 0, "range distribution needs at least one rank");
    let share = count / nb_ranks as u64;
    let remainder = count % nb_ranks as u64;
    let mut boundaries = Vec::with_capacity(nb_ranks + 1);
    boundaries.push(begin);
    let mut cursor = begin + share + remainder;
    boundaries.push(cursor);
    for _ in 1..nb_ranks {
        cursor += share;
        boundaries.push(cursor);
    }
    boundaries
}

/// Rank owning `global` within `boundaries` as returned by
/// [`distribute_range`]. `global` must lie inside the distributed range.
pub fn owning_rank(boundaries: &[u64], global: u64) -> usize {
    debug_assert!(boundaries.len() >= 2);
    debug_assert!(global >= boundaries[0] && global < *boundaries.last().unwrap());
    boundaries.partition_point(|&b| b <= global) - 1
}
