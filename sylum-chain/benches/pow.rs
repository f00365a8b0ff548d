//! Micro-benchmark for the PoW dispatch hot path (spec.md §4.1, §9).
//!
//! Exercises `PoWAlgorithm::for_height` and `check_proof_of_work` across the
//! SHA256d branch, the cheapest of the three algorithms and the one on the
//! hot path for every block header a node ever sees before dispatching to
//! RandomX or Argon2id.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sylum_chain::block::Height;
use sylum_chain::parameters::Network;
use sylum_chain::work::pow::{check_proof_of_work, PoWAlgorithm};

fn bench_algorithm_dispatch(c: &mut Criterion) {
    let params = Network::Mainnet.params();

    c.bench_function("pow_algorithm_for_height", |b| {
        b.iter(|| PoWAlgorithm::for_height(black_box(Height(100_000)), black_box(&params)))
    });
}

fn bench_sha256d_check_proof_of_work(c: &mut Criterion) {
    let params = Network::Mainnet.params();
    let header = sylum_chain::block::genesis::mainnet_genesis_header();
    let hash = header.sha256d_hash();

    c.bench_function("check_proof_of_work_sha256d", |b| {
        b.iter(|| {
            let _ = check_proof_of_work(
                black_box(hash),
                black_box(header.bits),
                black_box(Height(0)),
                black_box(&params),
            );
        })
    });
}

fn bench_header_hash(c: &mut Criterion) {
    let header = sylum_chain::block::genesis::mainnet_genesis_header();

    c.bench_function("header_sha256d_hash", |b| {
        b.iter(|| black_box(header).sha256d_hash())
    });
}

criterion_group!(
    benches,
    bench_algorithm_dispatch,
    bench_sha256d_check_proof_of_work,
    bench_header_hash
);
criterion_main!(benches);
