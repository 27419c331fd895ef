//! # Forkmine Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Criterion benchmarks per subsystem
//! │   ├── fm_01_chain_store.rs
//! │   └── fm_02_mining.rs
//! │
//! └── integration/      # Cross-subsystem flows
//!     ├── fixtures.rs
//!     ├── fork_choice.rs
//!     └── mining.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fm-tests
//! cargo test -p fm-tests integration::mining::
//! cargo bench -p fm-tests
//! ```

#![allow(dead_code)]

pub mod benchmarks;
pub mod integration;
