// OTLP flattening
//
// One flattener per signal family. Each turns one top-level record plus its
// resource and scope context into a root row and all of its child rows.

use thiserror::Error;
use uuid::Uuid;

use crate::rows::RowSet;

mod common;
pub mod logs;
pub mod metrics;
pub mod traces;

pub use common::{ResourceContext, ScopeContext};
pub use logs::flatten_log;
pub use metrics::flatten_metric;
pub use traces::flatten_span;

/// Output of flattening one root entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened {
    /// Id generated for the root row.
    pub root_id: Uuid,
    pub rows: RowSet,
    /// Attributes dropped across every collection of this entity.
    pub dropped_attributes: u64,
}

/// Structural problems that prevent a record from being flattened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlattenError {
    #[error("span has no trace ID")]
    MissingTraceId,

    #[error("span has no span ID")]
    MissingSpanId,

    #[error("span has no timestamp")]
    MissingTimestamp,

    #[error("metric '{name}' has no data")]
    MissingMetricData { name: String },
}
