// Export entry points
//
// Each export walks resource -> scope -> record, flattens every record on its
// own, aggregates the survivors per table and hands the table map to the bulk
// writer. A bad record is reported, never fatal to the batch.

use std::fmt;
use std::sync::Arc;

use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use otlp2columnar_core::{
    flatten_log, flatten_metric, flatten_span, FlattenError, Flattened, RecordAggregator,
    ResourceContext, ScopeContext, SignalType,
};
use otlp2columnar_writer::{ChunkedBulkWriter, TableStore, WriterError, WriterOptions};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Position of a record inside its export request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLocation {
    pub resource: usize,
    pub scope: usize,
    pub record: usize,
}

impl fmt::Display for RecordLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "resource {} scope {} record {}",
            self.resource, self.scope, self.record
        )
    }
}

/// A record that was skipped because it could not be flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    pub location: RecordLocation,
    pub error: FlattenError,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.error)
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    /// The caller cancelled before the write phase began; nothing was written.
    #[error("export cancelled before any rows were written")]
    Cancelled,

    /// Some records were skipped, some chunk writes failed, or both.
    #[error("{}", describe_batch(record_errors, write_error.as_ref()))]
    Batch {
        record_errors: Vec<RecordError>,
        write_error: Option<WriterError>,
    },
}

fn describe_batch(record_errors: &[RecordError], write_error: Option<&WriterError>) -> String {
    let mut parts = Vec::new();
    if !record_errors.is_empty() {
        let records = record_errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        parts.push(format!("{} records skipped ({records})", record_errors.len()));
    }
    if let Some(error) = write_error {
        parts.push(format!("write failed: {error}"));
    }
    parts.join("; ")
}

/// Counts for an export that completed without any failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub signal: SignalType,
    /// Root entities flattened and written.
    pub records: usize,
    pub rows: usize,
    /// Non-empty tables written.
    pub tables: usize,
    pub dropped_attributes: u64,
}

/// Flattens OTLP export requests and bulk-loads the rows into a store.
#[derive(Clone)]
pub struct Exporter {
    writer: ChunkedBulkWriter,
}

#[derive(Default)]
struct Batch {
    aggregator: RecordAggregator,
    record_errors: Vec<RecordError>,
}

impl Batch {
    fn record<F>(
        &mut self,
        cancel: &CancellationToken,
        location: RecordLocation,
        flatten: F,
    ) -> Result<(), ExportError>
    where
        F: FnOnce() -> Result<Flattened, FlattenError>,
    {
        if cancel.is_cancelled() {
            return Err(ExportError::Cancelled);
        }

        match flatten() {
            Ok(flattened) => self.aggregator.add(flattened),
            Err(error) => {
                warn!(%location, %error, "Skipping record");
                self.record_errors.push(RecordError { location, error });
            }
        }
        Ok(())
    }
}

impl Exporter {
    pub fn new(store: Arc<dyn TableStore>, options: WriterOptions) -> Self {
        Self {
            writer: ChunkedBulkWriter::new(store, options),
        }
    }

    pub fn writer(&self) -> &ChunkedBulkWriter {
        &self.writer
    }

    #[tracing::instrument(skip_all, fields(signal = "logs"))]
    pub async fn export_logs(
        &self,
        request: &ExportLogsServiceRequest,
        cancel: &CancellationToken,
    ) -> Result<ExportSummary, ExportError> {
        let mut batch = Batch::default();
        for (r, resource_logs) in request.resource_logs.iter().enumerate() {
            let resource = ResourceContext::new(resource_logs.resource.as_ref());
            for (s, scope_logs) in resource_logs.scope_logs.iter().enumerate() {
                let scope = ScopeContext::new(scope_logs.scope.as_ref());
                for (i, record) in scope_logs.log_records.iter().enumerate() {
                    let location = RecordLocation {
                        resource: r,
                        scope: s,
                        record: i,
                    };
                    batch.record(cancel, location, || flatten_log(&resource, &scope, record))?;
                }
            }
        }
        self.write(SignalType::Logs, batch, cancel).await
    }

    #[tracing::instrument(skip_all, fields(signal = "traces"))]
    pub async fn export_traces(
        &self,
        request: &ExportTraceServiceRequest,
        cancel: &CancellationToken,
    ) -> Result<ExportSummary, ExportError> {
        let mut batch = Batch::default();
        for (r, resource_spans) in request.resource_spans.iter().enumerate() {
            let resource = ResourceContext::new(resource_spans.resource.as_ref());
            for (s, scope_spans) in resource_spans.scope_spans.iter().enumerate() {
                let scope = ScopeContext::new(scope_spans.scope.as_ref());
                for (i, span) in scope_spans.spans.iter().enumerate() {
                    let location = RecordLocation {
                        resource: r,
                        scope: s,
                        record: i,
                    };
                    batch.record(cancel, location, || flatten_span(&resource, &scope, span))?;
                }
            }
        }
        self.write(SignalType::Traces, batch, cancel).await
    }

    #[tracing::instrument(skip_all, fields(signal = "metrics"))]
    pub async fn export_metrics(
        &self,
        request: &ExportMetricsServiceRequest,
        cancel: &CancellationToken,
    ) -> Result<ExportSummary, ExportError> {
        let mut batch = Batch::default();
        for (r, resource_metrics) in request.resource_metrics.iter().enumerate() {
            let resource = ResourceContext::new(resource_metrics.resource.as_ref());
            for (s, scope_metrics) in resource_metrics.scope_metrics.iter().enumerate() {
                let scope = ScopeContext::new(scope_metrics.scope.as_ref());
                for (i, metric) in scope_metrics.metrics.iter().enumerate() {
                    let location = RecordLocation {
                        resource: r,
                        scope: s,
                        record: i,
                    };
                    batch.record(cancel, location, || {
                        flatten_metric(&resource, &scope, metric)
                    })?;
                }
            }
        }
        self.write(SignalType::Metrics, batch, cancel).await
    }

    async fn write(
        &self,
        signal: SignalType,
        batch: Batch,
        cancel: &CancellationToken,
    ) -> Result<ExportSummary, ExportError> {
        // Last chance to stop; once writing starts every chunk runs to completion.
        if cancel.is_cancelled() {
            return Err(ExportError::Cancelled);
        }

        let Batch {
            aggregator,
            record_errors,
        } = batch;

        let records = aggregator.entities();
        let rows = aggregator.total_rows();
        let dropped_attributes = aggregator.dropped_attributes();
        let tables = aggregator.finish();
        let table_count = tables.len();

        debug!(
            %signal,
            records,
            rows,
            tables = table_count,
            dropped_attributes,
            skipped = record_errors.len(),
            "Flattened batch"
        );

        let write_error = self.writer.write_all(tables).await.err();

        if record_errors.is_empty() && write_error.is_none() {
            info!(%signal, records, rows, tables = table_count, "Exported batch");
            return Ok(ExportSummary {
                signal,
                records,
                rows,
                tables: table_count,
                dropped_attributes,
            });
        }

        warn!(
            %signal,
            records,
            skipped = record_errors.len(),
            write_failed = write_error.is_some(),
            "Exported batch with failures"
        );
        Err(ExportError::Batch {
            record_errors,
            write_error,
        })
    }
}
