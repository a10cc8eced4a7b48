//! Property tests for the range distribution policy.

use blockmesh::algs::distribute::{distribute_range, owning_rank};
use proptest::prelude::*;

#[test]
fn rank_zero_absorbs_the_remainder() {
    assert_eq!(distribute_range(0, 10, 3), vec![0, 4, 7, 10]);
    assert_eq!(distribute_range(5, 4, 4), vec![5, 6, 7, 8, 9]);
    // fewer items than ranks: rank 0 takes them all
    assert_eq!(distribute_range(0, 2, 4), vec![0, 2, 2, 2, 2]);
}

proptest! {
    #[test]
    fn boundaries_partition_the_range(
        begin in 0u64..1_000_000,
        count in 0u64..100_000,
        nb_ranks in 1usize..64,
    ) {
        let boundaries = distribute_range(begin, count, nb_ranks);
        prop_assert_eq!(boundaries.len(), nb_ranks + 1);
        prop_assert_eq!(boundaries[0], begin);
        prop_assert_eq!(*boundaries.last().unwrap(), begin + count);
        for pair in boundaries.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        let share = count / nb_ranks as u64;
        prop_assert_eq!(boundaries[1] - boundaries[0], share + count % nb_ranks as u64);
        for rank in 1..nb_ranks {
            prop_assert_eq!(boundaries[rank + 1] - boundaries[rank], share);
        }
    }

    #[test]
    fn owning_rank_brackets_its_id(
        begin in 0u64..10_000,
        count in 1u64..10_000,
        nb_ranks in 1usize..16,
    ) {
        let boundaries = distribute_range(begin, count, nb_ranks);
        for global in [begin, begin + count / 2, begin + count - 1] {
            let rank = owning_rank(&boundaries, global);
            prop_assert!(rank < nb_ranks);
            prop_assert!(boundaries[rank] <= global);
            prop_assert!(global < boundaries[rank + 1]);
        }
    }
}
