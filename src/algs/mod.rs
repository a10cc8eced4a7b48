//! Re-export public algorithms.

pub mod assemble;
pub mod communicator;
pub mod distribute;

pub use assemble::{IndexResolver, assemble_mesh, create_mesh};
pub use communicator::{Communicator, NoComm, ThreadComm};
pub use distribute::{distribute_range, owning_rank};
