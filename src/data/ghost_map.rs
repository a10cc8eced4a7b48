//! Lazy global-to-local ghost map.
//!
//! Every global node id requested during one mesh build that is not owned by
//! the current rank gets a ghost slot appended after all owned local ids,
//! recorded at most once. The map is owned by the assembler for the duration
//! of one build call; it never outlives it.

use std::collections::HashMap;

use crate::topology::block::{BlockIndex, MAX_DIM};

/// One allocated ghost node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GhostEntry {
    pub global: u64,
    pub owner: usize,
    /// Home block and frame of the node, kept so coordinates can be
    /// evaluated for ghosts without inverting the global id.
    pub home: BlockIndex,
    pub ijk: [usize; MAX_DIM],
}

/// Global node id → ghost ordinal, in first-request order.
#[derive(Clone, Debug, Default)]
pub struct GhostMap {
    by_global: HashMap<u64, usize>,
    entries: Vec<GhostEntry>,
}

impl GhostMap {
    /// Number of distinct ghost nodes allocated so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ghost ordinal of `global`, if already allocated.
    pub fn get(&self, global: u64) -> Option<usize> {
        self.by_global.get(&global).copied()
    }

    /// Ghost ordinal of `global`, allocating a new slot on first request.
    /// Repeated requests are idempotent.
    pub fn resolve_or_insert(
        &mut self,
        global: u64,
        entry: impl FnOnce() -> GhostEntry,
    ) -> usize {
        if let Some(&ordinal) = self.by_global.get(&global) {
            return ordinal;
        }
        let ordinal = self.entries.len();
        let entry = entry();
        debug_assert_eq!(entry.global, global);
        self.entries.push(entry);
        self.by_global.insert(global, ordinal);
        ordinal
    }

    /// Entries in allocation order.
    pub fn entries(&self) -> &[GhostEntry] {
        &self.entries
    }
}
