// Synthetic OTLP data generators for benchmarking
//
// Builds ExportLogsServiceRequest and ExportMetricsServiceRequest instances
// with realistic resource grouping and attribute counts.

use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;
use opentelemetry_proto::tonic::common::v1::{any_value, AnyValue, InstrumentationScope, KeyValue};
use opentelemetry_proto::tonic::logs::v1::{LogRecord, ResourceLogs, ScopeLogs};
use opentelemetry_proto::tonic::metrics::v1::{
    metric, number_data_point, Gauge, Histogram, HistogramDataPoint, Metric, NumberDataPoint,
    ResourceMetrics, ScopeMetrics,
};
use opentelemetry_proto::tonic::resource::v1::Resource;

const BASE_NANOS: u64 = 1_700_000_000_000_000_000;

/// Workload size presets
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
pub enum WorkloadSize {
    Small,  // 1k records
    Medium, // 25k records
    Large,  // 250k records
}

impl WorkloadSize {
    pub fn record_count(&self) -> usize {
        match self {
            WorkloadSize::Small => 1_000,
            WorkloadSize::Medium => 25_000,
            WorkloadSize::Large => 250_000,
        }
    }
}

fn key_value(key: &str, value: &str) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: Some(AnyValue {
            value: Some(any_value::Value::StringValue(value.to_string())),
        }),
    }
}

fn int_value(key: &str, value: i64) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: Some(AnyValue {
            value: Some(any_value::Value::IntValue(value)),
        }),
    }
}

fn resource(idx: usize) -> Option<Resource> {
    Some(Resource {
        attributes: vec![
            key_value("service.name", &format!("bench-service-{}", idx % 10)),
            key_value("service.instance.id", &format!("instance-{}", idx)),
            key_value("host.name", &format!("host-{}", idx % 20)),
        ],
        ..Default::default()
    })
}

fn scope(name: &str) -> Option<InstrumentationScope> {
    Some(InstrumentationScope {
        name: name.to_string(),
        version: "1.0.0".to_string(),
        ..Default::default()
    })
}

/// Generate a synthetic logs export request
pub fn generate_otlp_logs(size: WorkloadSize) -> ExportLogsServiceRequest {
    let record_count = size.record_count();
    let num_resources = (record_count / 1000).clamp(1, 100);
    let records_per_resource = record_count / num_resources;

    let resource_logs = (0..num_resources)
        .map(|resource_idx| ResourceLogs {
            resource: resource(resource_idx),
            scope_logs: vec![ScopeLogs {
                scope: scope("benchmark-logger"),
                log_records: (0..records_per_resource)
                    .map(|log_idx| generate_log_record(resource_idx * records_per_resource + log_idx))
                    .collect(),
                ..Default::default()
            }],
            ..Default::default()
        })
        .collect();

    ExportLogsServiceRequest { resource_logs }
}

fn generate_log_record(idx: usize) -> LogRecord {
    let timestamp = BASE_NANOS + idx as u64 * 1_000_000;
    let (trace_id, span_id) = if idx % 2 == 0 {
        (vec![(idx % 251) as u8; 16], vec![(idx % 241) as u8 + 1; 8])
    } else {
        (Vec::new(), Vec::new())
    };

    LogRecord {
        time_unix_nano: timestamp,
        observed_time_unix_nano: timestamp + 100_000,
        severity_number: [5, 9, 13, 17][idx % 4],
        severity_text: ["DEBUG", "INFO", "WARN", "ERROR"][idx % 4].to_string(),
        body: Some(AnyValue {
            value: Some(any_value::Value::StringValue(format!(
                "request {} handled",
                idx
            ))),
        }),
        attributes: vec![
            key_value("http.method", "GET"),
            key_value("http.route", "/api/cart"),
            int_value("http.status_code", 200),
        ],
        trace_id,
        span_id,
        ..Default::default()
    }
}

/// Generate a synthetic metrics request alternating gauges and histograms
pub fn generate_otlp_metrics(size: WorkloadSize) -> ExportMetricsServiceRequest {
    let metrics = (0..size.record_count())
        .map(|idx| {
            let data = if idx % 2 == 0 {
                metric::Data::Gauge(Gauge {
                    data_points: (0..4)
                        .map(|cpu| NumberDataPoint {
                            attributes: vec![int_value("cpu", cpu)],
                            time_unix_nano: BASE_NANOS,
                            value: Some(number_data_point::Value::AsDouble(0.1 * cpu as f64)),
                            ..Default::default()
                        })
                        .collect(),
                })
            } else {
                metric::Data::Histogram(Histogram {
                    data_points: vec![HistogramDataPoint {
                        attributes: vec![key_value("http.route", "/api/cart")],
                        time_unix_nano: BASE_NANOS,
                        count: 10,
                        sum: Some(42.0),
                        bucket_counts: vec![1, 2, 3, 4],
                        explicit_bounds: vec![5.0, 10.0, 25.0],
                        ..Default::default()
                    }],
                    aggregation_temporality: 2,
                })
            };
            Metric {
                name: format!("bench.metric.{}", idx % 50),
                unit: "1".to_string(),
                data: Some(data),
                ..Default::default()
            }
        })
        .collect();

    ExportMetricsServiceRequest {
        resource_metrics: vec![ResourceMetrics {
            resource: resource(0),
            scope_metrics: vec![ScopeMetrics {
                scope: scope("benchmark-meter"),
                metrics,
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}
