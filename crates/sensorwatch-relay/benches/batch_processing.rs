//! SensorWatch Relay Benchmarks
//!
//! - Full batch processing against in-memory collaborators
//! - Correlation cache throughput
//! - Taxonomy lookups

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sensorwatch_common::{
    DimensionSeries, InstanceDescriptor, MetricObservation, MetricSeries, ResourceSample,
    SensorBatch, TimedValue,
};
use sensorwatch_relay::memory::{
    InMemoryInstanceRegistry, RecordingMonitoringApi, StaticAccountDirectory,
};
use sensorwatch_relay::taxonomy::{classify, map_for_submission};
use sensorwatch_relay::{BatchProcessor, ChannelEventBus, CorrelationCache, RelayConfig};
use std::sync::Arc;
use std::time::Duration;

const METRICS: &[(&str, &str)] = &[
    ("CPUUtilization", "default"),
    ("NetworkIn", "total"),
    ("NetworkOut", "total"),
    ("DiskReadOps", "root"),
    ("DiskWriteOps", "root"),
    ("DiskReadOps", "vol-00000001"),
    ("DiskWriteOps", "vol-00000001"),
    ("VolumeTotalReadTime", "vol-00000001"),
    ("VolumeTotalWriteTime", "vol-00000001"),
];

fn synthetic_batch(instances: usize, history: i64) -> SensorBatch {
    let resources = (0..instances)
        .map(|n| {
            let id = format!("i-{:08x}", n);
            METRICS.iter().fold(ResourceSample::instance(&id, &id), |sample, (metric, dim)| {
                let values = (0..history)
                    .map(|t| {
                        let at = Utc.timestamp_opt(1_700_000_000 + t * 60, 0).unwrap();
                        TimedValue::new(at, (t * 10) as f64)
                    })
                    .rev()
                    .collect();
                sample.with_metric(MetricSeries::single(*metric, DimensionSeries::new(*dim, 0, values)))
            })
        })
        .collect();
    SensorBatch::new(resources)
}

fn processor(instances: usize, config: &RelayConfig) -> BatchProcessor {
    let registry = Arc::new(InMemoryInstanceRegistry::new());
    for n in 0..instances {
        registry.insert(InstanceDescriptor::new(
            format!("i-{:08x}", n),
            "emi-00000001",
            "m1.small",
            "000001",
        ));
    }
    let accounts = Arc::new(StaticAccountDirectory::new().with_principal("000001", "AIDABENCH"));
    let api = Arc::new(RecordingMonitoringApi::new());
    // receiver dropped: usage publishing fails fast and is counted
    let (bus, _) = ChannelEventBus::new(1);
    BatchProcessor::new(config, registry, accounts, api, Arc::new(bus))
}

// ============ BATCH BENCHMARKS ============

fn bench_process_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_batch");
    group.measurement_time(Duration::from_secs(10));

    let rt = tokio::runtime::Runtime::new().unwrap();

    for instances in [1usize, 16, 64].iter() {
        let batch = synthetic_batch(*instances, 5);
        group.throughput(Throughput::Elements(batch.value_count() as u64));

        for concurrency in [1usize, 8] {
            let config = RelayConfig {
                max_concurrent_resources: concurrency,
                ..Default::default()
            };
            let processor = processor(*instances, &config);
            group.bench_with_input(
                BenchmarkId::new(format!("concurrency_{}", concurrency), instances),
                &batch,
                |b, batch| {
                    b.iter(|| rt.block_on(processor.process_batch(black_box(batch))));
                },
            );
        }
    }

    group.finish();
}

// ============ CORRELATION BENCHMARKS ============

fn bench_correlation(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation");
    let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

    let read = MetricObservation {
        resource_uuid: "i-00000001".into(),
        resource_name: "i-00000001".into(),
        metric_name: "DiskReadOps".into(),
        dimension_name: "vol-00000001".into(),
        sequence_number: 0,
        value: 5.0,
        timestamp: at,
    };
    let write = MetricObservation {
        metric_name: "DiskWriteOps".into(),
        value: 7.0,
        ..read.clone()
    };

    group.bench_function("combine_pair", |b| {
        b.iter(|| {
            let cache = CorrelationCache::new();
            let _ = cache.combine_all(black_box(&read));
            cache.combine_all(black_box(&write))
        });
    });

    group.finish();
}

// ============ TAXONOMY BENCHMARKS ============

fn bench_taxonomy(c: &mut Criterion) {
    let mut group = c.benchmark_group("taxonomy");

    group.bench_function("map_and_classify", |b| {
        b.iter(|| {
            for (metric, dim) in METRICS {
                let _ = map_for_submission(black_box(metric), black_box(dim));
                let _ = classify(black_box(metric));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_process_batch, bench_correlation, bench_taxonomy);
criterion_main!(benches);
