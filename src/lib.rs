//! otlp2columnar - flatten OTLP telemetry into relational rows and bulk-load
//! them into a column store.
//!
//! The pipeline per export request is: flatten every record
//! ([`otlp2columnar_core`]), aggregate rows per destination table, then write
//! each table in concurrent chunks ([`otlp2columnar_writer`]).

mod export;
mod init;

pub use export::{ExportError, ExportSummary, Exporter, RecordError, RecordLocation};
pub use init::{init_exporter, init_tracing};

// Re-export workspace crates for embedders
pub use otlp2columnar_config;
pub use otlp2columnar_core;
pub use otlp2columnar_writer;
pub use tokio_util::sync::CancellationToken;
