//! Ports layer (hexagonal architecture)
//!
//! - `inbound`: the API this crate offers (`ChainApi`)
//! - `outbound`: what the host must provide (storage, broadcast, observers)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
