//! CryptoPAn Criterion Benchmark
//!
//! Per-address anonymization cost. The transform is bit-serial by
//! construction: 32 AES block encryptions per IPv4 address, 128 per
//! IPv6, so the v4/v6 gap should measure close to 4x.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use cryptopan::{default_no_anonymize, special_purpose_v4, AddressPolicy, CryptoPAn, IpVersion};
use rand::prelude::*;
use std::hint::black_box;

const KEY: [u8; 32] = [
    21, 34, 23, 141, 51, 164, 207, 128, 19, 10, 91, 22, 73, 144, 125, 16, 216, 152, 143, 131,
    121, 121, 101, 39, 98, 87, 76, 45, 42, 132, 34, 2,
];

// =============================================================================
// BENCHMARK 1: RAW TRANSFORM
// =============================================================================

/// Integer-level transform, no parsing or formatting.
fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("1-Transform");
    let engine = CryptoPAn::new(&KEY).unwrap();
    let mut rng = rand::rng();

    let v4: u128 = u128::from(rng.random::<u32>());
    group.throughput(Throughput::Elements(1));
    group.bench_function("ipv4", |b| {
        b.iter(|| engine.anonymize_int(black_box(v4), IpVersion::V4));
    });

    let v6: u128 = rng.random();
    group.bench_function("ipv6", |b| {
        b.iter(|| engine.anonymize_int(black_box(v6), IpVersion::V6));
    });

    group.finish();
}

// =============================================================================
// BENCHMARK 2: TEXT ROUND TRIP
// =============================================================================

/// Parse, transform, and format, as the stream rewriter drives it.
fn bench_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("2-Text");
    let engine = CryptoPAn::new(&KEY).unwrap();

    group.throughput(Throughput::Elements(1));
    group.bench_function("ipv4_str", |b| {
        b.iter(|| engine.anonymize_str(black_box("198.51.77.238")).unwrap());
    });
    group.bench_function("ipv6_str", |b| {
        b.iter(|| engine.anonymize_str(black_box("2001:db8::2")).unwrap());
    });

    group.finish();
}

// =============================================================================
// BENCHMARK 3: POLICY OVERHEAD
// =============================================================================

/// Range checks and the preserve-prefix overwrite on top of the
/// transform.
fn bench_policy(c: &mut Criterion) {
    let mut group = c.benchmark_group("3-Policy");
    let policy =
        AddressPolicy::with_networks(&KEY, default_no_anonymize(), special_purpose_v4()).unwrap();

    group.throughput(Throughput::Elements(1));
    group.bench_function("pass_through", |b| {
        b.iter(|| policy.anonymize(black_box("127.0.0.1")).unwrap());
    });
    group.bench_function("preserve_prefix", |b| {
        b.iter(|| policy.anonymize(black_box("192.168.13.37")).unwrap());
    });
    group.bench_function("full_anonymize", |b| {
        b.iter(|| policy.anonymize(black_box("198.51.77.238")).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_transform, bench_text, bench_policy);
criterion_main!(benches);
