// otlp2columnar-core - Pure flattening logic
//
// Turns OTLP logs, spans and metrics into flat rows for a column-oriented
// store. No I/O, no async, no runtime dependencies.

pub mod aggregate;
pub mod otlp;
pub mod rows;
pub mod table;
pub mod value;

pub use aggregate::{aggregate, RecordAggregator};
pub use otlp::{
    flatten_log, flatten_metric, flatten_span, FlattenError, Flattened, ResourceContext,
    ScopeContext,
};
pub use rows::{AttributeOwner, AttributeRow, Row, RowSet, TableMap};
pub use table::{MetricKind, Table};
pub use value::{coerce, CoercionError, TaggedValue, ValueKind};

/// Telemetry signal carried by one export batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalType {
    Logs,
    Traces,
    Metrics,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Logs => "logs",
            SignalType::Traces => "traces",
            SignalType::Metrics => "metrics",
        }
    }
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SignalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logs" | "log" => Ok(SignalType::Logs),
            "traces" | "trace" | "spans" => Ok(SignalType::Traces),
            "metrics" | "metric" => Ok(SignalType::Metrics),
            other => Err(format!(
                "unsupported signal '{other}', expected logs, traces or metrics"
            )),
        }
    }
}
