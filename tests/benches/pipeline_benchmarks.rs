//! # Pipeline Stage Benchmarks
//!
//! Per-event cost of each in-process stage. Senders are excluded; their cost
//! is dominated by the network.
//!
//! | Stage | Variants |
//! |-------|----------|
//! | Filter | device set hit / miss |
//! | Format | JSON, XML |
//! | Transform | Gzip, Zlib, AES-256-GCM |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use export_distro::pipeline::{Filter, Formatter, Transformer};
use export_types::{
    Compression, EncryptionAlgorithm, EncryptionDetails, Event, Format, RegistrationFilter,
};

fn event_with_readings(count: usize) -> Event {
    (0..count).fold(Event::new("bench-device").with_origin(1_700_000_000_000), |event, i| {
        event.with_reading(format!("reading-{}", i), format!("{}", i * 7))
    })
}

// ============================================================================
// FILTER
// ============================================================================

fn bench_device_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    let filter = Filter::resolve(&RegistrationFilter {
        device_identifiers: (0..32).map(|i| format!("device-{}", i)).collect(),
        value_descriptor_identifiers: Vec::new(),
    });
    let Some(filter) = filter else {
        return;
    };
    let hit = Event::new("device-17");
    let miss = Event::new("device-99");

    group.bench_function("device_hit", |b| b.iter(|| black_box(filter.apply(&hit))));
    group.bench_function("device_miss", |b| b.iter(|| black_box(filter.apply(&miss))));

    group.finish();
}

// ============================================================================
// FORMAT
// ============================================================================

fn bench_formatters(c: &mut Criterion) {
    let mut group = c.benchmark_group("format");

    for readings in [1usize, 10, 100] {
        let event = event_with_readings(readings);
        group.throughput(Throughput::Elements(readings as u64));

        for format in [Format::Json, Format::Xml] {
            let Ok(formatter) = Formatter::resolve(format) else {
                continue;
            };
            group.bench_with_input(
                BenchmarkId::new(format.tag(), readings),
                &event,
                |b, event| b.iter(|| black_box(formatter.format(event))),
            );
        }
    }

    group.finish();
}

// ============================================================================
// TRANSFORM
// ============================================================================

fn bench_transformers(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");

    let aes = Transformer::encryption(&EncryptionDetails {
        algorithm: EncryptionAlgorithm::Aes,
        key: "bench-secret".to_string(),
        init_vector: "bench-iv".to_string(),
    });
    let transformers: Vec<(&str, Transformer)> = [
        ("gzip", Transformer::compression(Compression::Gzip)),
        ("zlib", Transformer::compression(Compression::Zip)),
        ("aes", aes),
    ]
    .into_iter()
    .filter_map(|(name, transformer)| transformer.map(|t| (name, t)))
    .collect();

    for readings in [10usize, 100] {
        let payload = Formatter::Json
            .format(&event_with_readings(readings))
            .unwrap_or_default();
        group.throughput(Throughput::Bytes(payload.len() as u64));

        for (name, transformer) in &transformers {
            group.bench_with_input(
                BenchmarkId::new(*name, payload.len()),
                &payload,
                |b, payload| b.iter(|| black_box(transformer.transform(payload))),
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_device_filter,
    bench_formatters,
    bench_transformers
);
criterion_main!(benches);
