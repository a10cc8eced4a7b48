//! Thin façade over the rank coordination used by mesh assembly and
//! repartitioning.
//!
//! The subsystem is pure SPMD: every collective blocks the calling rank until
//! all ranks participate, and there is no intra-rank concurrency. A
//! communicator is an explicit value passed into every parallel operation, so
//! the whole crate is unit-testable with [`NoComm`] (serial) or [`ThreadComm`]
//! (simulated multi-rank inside one process).

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Blocking collective interface (minimal by design).
pub trait Communicator: Send + Sync {
    /// Rank of the calling process in `[0, size)`.
    fn rank(&self) -> usize;
    /// Number of participating ranks.
    fn size(&self) -> usize;
    /// Gather one `u64` from every rank; the result is indexed by rank and
    /// identical on all ranks.
    fn all_gather_u64(&self, value: u64) -> Vec<u64>;
    /// Block until every rank has reached the barrier.
    fn barrier(&self) {
        let _ = self.all_gather_u64(0);
    }
}

/// Compile-time no-op comm for pure serial runs and unit tests.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn all_gather_u64(&self, value: u64) -> Vec<u64> {
        vec![value]
    }
}

// --- ThreadComm: simulated multi-rank inside one process ---

struct GatherState {
    slots: Vec<u64>,
    arrived: usize,
    generation: u64,
    result: Vec<u64>,
}

struct Shared {
    state: Mutex<GatherState>,
    cv: Condvar,
}

/// In-process communicator: one handle per simulated rank, all sharing a
/// generation-counted gather cell. Each collective round completes only when
/// every handle has deposited its value, mirroring MPI's blocking semantics.
///
/// A rank can only enter round `k+1` after returning from round `k`, so the
/// snapshot taken by the last depositor is never overwritten while a slow
/// rank is still reading it.
#[derive(Clone)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
    shared: Arc<Shared>,
}

impl ThreadComm {
    /// Create `size` linked handles, one per simulated rank.
    pub fn create(size: usize) -> Vec<Self> {
        assert!(size > 0, "communicator needs at least one rank");
        let shared = Arc::new(Shared {
            state: Mutex::new(GatherState {
                slots: vec![0; size],
                arrived: 0,
                generation: 0,
                result: Vec::new(),
            }),
            cv: Condvar::new(),
        });
        (0..size)
            .map(|rank| Self {
                rank,
                size,
                shared: Arc::clone(&shared),
            })
            .collect()
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.size
    }

    fn all_gather_u64(&self, value: u64) -> Vec<u64> {
        let mut st = self.shared.state.lock();
        let generation = st.generation;
        st.slots[self.rank] = value;
        st.arrived += 1;
        if st.arrived == self.size {
            st.result = st.slots.clone();
            st.arrived = 0;
            st.generation += 1;
            self.shared.cv.notify_all();
        } else {
            while st.generation == generation {
                self.shared.cv.wait(&mut st);
            }
        }
        st.result.clone()
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::Communicator;
    use mpi::environment::Universe;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::*;

    /// Real MPI communicator over `MPI_COMM_WORLD`.
    pub struct MpiComm {
        _universe: Universe,
        world: SimpleCommunicator,
        rank: usize,
        size: usize,
    }

    impl MpiComm {
        /// Initialize MPI; returns `None` if the runtime was already
        /// initialized or is unavailable.
        pub fn new() -> Option<Self> {
            let universe = mpi::initialize()?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Some(Self {
                _universe: universe,
                world,
                rank,
                size,
            })
        }
    }

    impl Communicator for MpiComm {
        fn rank(&self) -> usize {
            self.rank
        }
        fn size(&self) -> usize {
            self.size
        }
        fn all_gather_u64(&self, value: u64) -> Vec<u64> {
            let mut out = vec![0u64; self.size];
            self.world.all_gather_into(&value, &mut out[..]);
            out
        }
        fn barrier(&self) {
            self.world.barrier();
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
