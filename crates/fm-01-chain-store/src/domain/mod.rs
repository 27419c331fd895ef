//! Domain layer for the chain store
//!
//! Pure data and policy: block index, fork choice, uncle rules, head types.
//! No locking and no I/O.

mod block_index;
mod chain;
mod error;
mod fork_choice;
mod uncles;

pub use block_index::*;
pub use chain::*;
pub use error::*;
pub use fork_choice::*;
pub use uncles::*;
