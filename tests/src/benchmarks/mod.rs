//! # Forkmine Benchmarks
//!
//! Criterion benchmarks per subsystem, registered from
//! `benches/forkmine_benchmarks.rs`.

pub mod fm_01_chain_store;
pub mod fm_02_mining;
