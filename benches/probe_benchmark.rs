//! Benchmark tests for the PTS probe
//!
//! These benchmarks measure the timestamp decoder on its own and the full
//! tag-reading pipeline on a synthetic segment.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pts_probe::{decode, probe_reader};
use util::{priv_payload, TagBuilder, APPLE_TIMESTAMP_OWNER};

fn benchmark_decode(c: &mut Criterion) {
    let payload = priv_payload(APPLE_TIMESTAMP_OWNER, &[0, 0, 0, 1, 0x82, 0x13, 0x9e, 0xf8]);

    c.bench_function("decode_apple_payload", |b| {
        b.iter(|| black_box(decode(black_box(&payload))).unwrap())
    });
}

fn benchmark_decode_foreign_owner(c: &mut Criterion) {
    let payload = priv_payload("com.example.ad-insertion.marker.identifier", &[0; 16]);

    c.bench_function("decode_foreign_payload", |b| {
        b.iter(|| black_box(decode(black_box(&payload))).unwrap())
    });
}

fn benchmark_probe_segment(c: &mut Criterion) {
    let segment = TagBuilder::new(4)
        .unwrap()
        .text_frame("TIT2", "segment 0")
        .unwrap()
        .priv_frame("com.example.ad-insertion.marker.identifier", &[0; 16])
        .unwrap()
        .apple_timestamp([0, 0, 0, 1, 0x82, 0x13, 0x9e, 0xf8])
        .unwrap()
        .padding(256)
        .build_segment()
        .unwrap();

    c.bench_function("probe_segment", |b| {
        b.iter(|| {
            let mut reader = black_box(&segment[..]);
            black_box(probe_reader(&mut reader)).unwrap()
        })
    });
}

criterion_group!(
    benches,
    benchmark_decode,
    benchmark_decode_foreign_owner,
    benchmark_probe_segment
);
criterion_main!(benches);
