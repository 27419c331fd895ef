//! # FM-02 Mining Benchmarks
//!
//! - Hashing round: bounds the worker's hashrate
//! - Cache build: paid once per epoch
//! - Block assembly: paid on every head change

use criterion::{black_box, Criterion, Throughput};
use fm_02_mining::domain::pow::{hashimoto_light, VerificationCache};
use fm_02_mining::{BlockAssembler, MinerConfig};

use crate::integration::fixtures::{genesis, tx, GENESIS_DIFFICULTY};

pub fn bench_hashimoto_light(c: &mut Criterion) {
    let mut group = c.benchmark_group("fm-02-pow");
    let cache = VerificationCache::for_block(1);
    let mining_hash = [0x5a; 32];

    group.throughput(Throughput::Elements(1));
    group.bench_function("hashimoto_light", |b| {
        let mut nonce = 0u64;
        b.iter(|| {
            nonce = nonce.wrapping_add(1);
            black_box(hashimoto_light(&cache, &mining_hash, &nonce.to_be_bytes()))
        })
    });

    group.bench_function("cache_build", |b| {
        b.iter(|| black_box(VerificationCache::for_block(black_box(1))))
    });
    group.finish();
}

pub fn bench_block_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("fm-02-assembly");
    let assembler = BlockAssembler::new(&MinerConfig::default());
    let parent = genesis(GENESIS_DIFFICULTY);
    let pending: Vec<_> = (0..256).map(tx).collect();

    group.throughput(Throughput::Elements(pending.len() as u64));
    group.bench_function("assemble_256_txs", |b| {
        b.iter(|| black_box(assembler.assemble(&parent, pending.clone(), 2_000)))
    });
    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    bench_hashimoto_light(c);
    bench_block_assembly(c);
}
