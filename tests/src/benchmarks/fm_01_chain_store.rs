//! # FM-01 Chain Store Benchmarks
//!
//! - Linear append: one index insert, one fork-choice comparison, one commit
//! - Fork storm: many equal-work siblings competing for the same height

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use fm_01_chain_store::{ChainApi, ChainConfig, ChainStore, EphemeralStateStore};
use shared_types::Block;

use crate::integration::fixtures::{child, genesis, GENESIS_DIFFICULTY};

fn fresh_chain() -> (ChainStore, Block) {
    let g = genesis(GENESIS_DIFFICULTY);
    let chain = ChainStore::new(
        g.clone(),
        Box::new(EphemeralStateStore::new()),
        ChainConfig::default(),
    )
    .expect("genesis is valid");
    (chain, g)
}

/// Blocks `1..=len` on top of `g`, with distinct tags per chain.
fn linear(g: &Block, len: usize, tag: u8) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(len);
    let mut tip = g.clone();
    for _ in 0..len {
        tip = child(&tip, 100, tag);
        blocks.push(tip.clone());
    }
    blocks
}

pub fn bench_linear_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("fm-01-linear-append");

    for len in [100usize, 1_000] {
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            b.iter_batched(
                || {
                    let (chain, g) = fresh_chain();
                    let blocks = linear(&g, len, 0);
                    (chain, blocks)
                },
                |(chain, blocks)| {
                    for block in blocks {
                        black_box(chain.add_block(block, false).ok());
                    }
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

pub fn bench_fork_storm(c: &mut Criterion) {
    let mut group = c.benchmark_group("fm-01-fork-storm");

    for forks in [8u8, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(forks), &forks, |b, &forks| {
            b.iter_batched(
                || {
                    let (chain, g) = fresh_chain();
                    let branches: Vec<Vec<Block>> =
                        (0..forks).map(|tag| linear(&g, 20, tag)).collect();
                    (chain, branches)
                },
                |(chain, branches)| {
                    // Siblings at each height arrive before any grandchild
                    for height in 0..20 {
                        for branch in &branches {
                            black_box(chain.add_block(branch[height].clone(), false).ok());
                        }
                    }
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    bench_linear_append(c);
    bench_fork_storm(c);
}
