//! Adapters for the outbound ports

pub mod broadcast;
pub mod memory;

pub use broadcast::RecordingBroadcaster;
pub use memory::{EphemeralStateStore, InMemoryStateStore};
