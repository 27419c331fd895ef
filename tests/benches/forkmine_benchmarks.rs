//! # Forkmine Benchmarks
//!
//! | Subsystem | Measured |
//! |-----------|----------|
//! | fm-01 Chain Store | append and fork-choice throughput |
//! | fm-02 Mining | hashing round, cache build, block assembly |

use criterion::{criterion_group, criterion_main, Criterion};
use std::time::Duration;

use fm_tests::benchmarks::{fm_01_chain_store, fm_02_mining};

fn configure() -> Criterion {
    Criterion::default().measurement_time(Duration::from_secs(5))
}

criterion_group!(
    name = benches;
    config = configure();
    targets = fm_01_chain_store::register_benchmarks, fm_02_mining::register_benchmarks
);
criterion_main!(benches);
