//! Record encode/decode benchmarks over the column-store model.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tagwire_core::{json, CodecConfig, Record, RecordCodec, VariantPolicy};
use tagwire_model::result::KEY_SLICE;
use tagwire_model::{codec, column, column_or_super_column, key_slice, registry};

/// A row of `columns` columns, each with a `value_size`-byte value.
fn create_row(columns: usize, value_size: usize) -> Record {
    let value = Bytes::from(vec![0x42u8; value_size]);
    let cells = (0..columns).map(|i| {
        let name = format!("col-{:05}", i).into_bytes();
        let col = column(name, value.clone(), i as i64).unwrap();
        column_or_super_column(col).unwrap()
    });
    key_slice(&b"row-key"[..], cells).unwrap()
}

fn bench_record_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_encode");
    let codec = codec();

    for columns in [1, 100, 1000] {
        let row = create_row(columns, 64);

        group.throughput(Throughput::Elements(columns as u64));
        group.bench_with_input(BenchmarkId::from_parameter(columns), &row, |b, row| {
            b.iter(|| black_box(codec.encode_to_bytes(row).unwrap()));
        });
    }

    group.finish();
}

fn bench_record_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_decode");
    let codec = codec();

    for columns in [1, 100, 1000] {
        let encoded = codec.encode_to_bytes(&create_row(columns, 64)).unwrap();

        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(columns), &encoded, |b, encoded| {
            b.iter(|| black_box(codec.decode_bytes(encoded, KEY_SLICE).unwrap()));
        });
    }

    group.finish();
}

fn bench_value_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_size_decode");
    let codec = codec();

    for size in [100, 10000, 1000000] {
        let encoded = codec.encode_to_bytes(&create_row(1, size)).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| black_box(codec.decode_bytes(encoded, KEY_SLICE).unwrap()));
        });
    }

    group.finish();
}

fn bench_variant_policy(c: &mut Criterion) {
    let mut group = c.benchmark_group("variant_policy");
    let encoded = codec().encode_to_bytes(&create_row(100, 64)).unwrap();

    for policy in [VariantPolicy::Reject, VariantPolicy::KeepLast] {
        let config = CodecConfig {
            variant_policy: policy,
            ..Default::default()
        };
        let codec = RecordCodec::with_config(registry(), config);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", policy)),
            &encoded,
            |b, encoded| {
                b.iter(|| black_box(codec.decode_bytes(encoded, KEY_SLICE).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_json_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_render");

    for columns in [1, 100] {
        let row = create_row(columns, 64);

        group.throughput(Throughput::Elements(columns as u64));
        group.bench_with_input(BenchmarkId::from_parameter(columns), &row, |b, row| {
            b.iter(|| black_box(serde_json::to_string(&json::record_to_json(row)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_record_encode,
    bench_record_decode,
    bench_value_size,
    bench_variant_policy,
    bench_json_render,
);

criterion_main!(benches);
