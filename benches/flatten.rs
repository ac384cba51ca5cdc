// Flattening benchmark - measure OTLP record -> table map conversion
//
// Isolates flattening and aggregation from the store round trip.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use otlp2columnar_core::{
    flatten_log, flatten_metric, RecordAggregator, ResourceContext, ScopeContext,
};

mod fixtures;
use fixtures::{generate_otlp_logs, generate_otlp_metrics, WorkloadSize};

/// Benchmark log flattening and per-table aggregation
fn bench_flatten_logs(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten_logs");

    for size in [WorkloadSize::Small, WorkloadSize::Medium] {
        let request = generate_otlp_logs(size);
        group.throughput(Throughput::Elements(size.record_count() as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", size)),
            &request,
            |b, request| {
                b.iter(|| {
                    let mut aggregator = RecordAggregator::new();
                    for resource_logs in &request.resource_logs {
                        let resource = ResourceContext::new(resource_logs.resource.as_ref());
                        for scope_logs in &resource_logs.scope_logs {
                            let scope = ScopeContext::new(scope_logs.scope.as_ref());
                            for record in &scope_logs.log_records {
                                aggregator.add(flatten_log(&resource, &scope, record).unwrap());
                            }
                        }
                    }
                    black_box(aggregator.finish());
                });
            },
        );
    }

    group.finish();
}

/// Benchmark metric flattening across gauge and histogram kinds
fn bench_flatten_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten_metrics");

    for size in [WorkloadSize::Small, WorkloadSize::Medium] {
        let request = generate_otlp_metrics(size);
        group.throughput(Throughput::Elements(size.record_count() as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", size)),
            &request,
            |b, request| {
                b.iter(|| {
                    let mut aggregator = RecordAggregator::new();
                    for resource_metrics in &request.resource_metrics {
                        let resource = ResourceContext::new(resource_metrics.resource.as_ref());
                        for scope_metrics in &resource_metrics.scope_metrics {
                            let scope = ScopeContext::new(scope_metrics.scope.as_ref());
                            for metric in &scope_metrics.metrics {
                                aggregator.add(flatten_metric(&resource, &scope, metric).unwrap());
                            }
                        }
                    }
                    black_box(aggregator.finish());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_flatten_logs, bench_flatten_metrics);
criterion_main!(benches);
