//! # Integration Flows
//!
//! Chain store, miner and node runtime exercised together through their
//! public APIs only.

pub mod fixtures;

#[cfg(test)]
mod fork_choice;
#[cfg(test)]
mod mining;
