//! Benchmarks for signing, verification, hashing and hardened randomness

use bitcoin_crypto::hash::{double_sha256, hash160, sha512};
use bitcoin_crypto::random::random_bytes_with_stretching;
use bitcoin_crypto::EcKeyPair;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_ecdsa(c: &mut Criterion) {
    let mut group = c.benchmark_group("ecdsa");
    let keypair = EcKeyPair::generate().unwrap();
    let digest = double_sha256(b"benchmark message");
    let signature = keypair.sign(digest.as_bytes()).unwrap();

    group.bench_function("sign", |b| {
        b.iter(|| black_box(keypair.sign(black_box(digest.as_bytes())).unwrap()));
    });

    group.bench_function("verify", |b| {
        b.iter(|| {
            black_box(
                keypair
                    .verify(black_box(digest.as_bytes()), black_box(&signature))
                    .unwrap(),
            )
        });
    });

    group.bench_function("generate", |b| {
        b.iter(|| black_box(EcKeyPair::generate().unwrap()));
    });

    group.finish();
}

fn bench_hashes(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash");
    let data = vec![0xabu8; 1024];

    group.bench_function("double_sha256/1KiB", |b| {
        b.iter(|| black_box(double_sha256(black_box(&data))))
    });
    group.bench_function("sha512/1KiB", |b| b.iter(|| black_box(sha512(black_box(&data)))));
    group.bench_function("hash160/1KiB", |b| b.iter(|| black_box(hash160(black_box(&data)))));

    group.finish();
}

fn bench_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_bytes");
    group.sample_size(10);

    for stretching in [0i64, 3_000, 30_000] {
        group.bench_with_input(
            BenchmarkId::new("stretching", stretching),
            &stretching,
            |b, &stretching| {
                b.iter(|| black_box(random_bytes_with_stretching(32, stretching).unwrap()));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_ecdsa, bench_hashes, bench_random);
criterion_main!(benches);
