//! Port implementations provided by the node.

pub mod broadcast;

pub use broadcast::LoggingBroadcaster;
