use opentelemetry_proto::tonic::logs::v1::LogRecord;
use tracing::debug;
use uuid::Uuid;

use super::common::{hex_id, nanos, push_attributes, ResourceContext, ScopeContext};
use super::{FlattenError, Flattened};
use crate::rows::{AttributeOwner, LogRow, RowSet};
use crate::table::Table;
use crate::value::coerce_body;

/// Flatten one log record into its `log` row and attribute rows.
///
/// Logs have no required fields, so this only fails for future structural
/// checks; callers still treat the error as a per-record skip.
pub fn flatten_log(
    resource: &ResourceContext<'_>,
    scope: &ScopeContext<'_>,
    record: &LogRecord,
) -> Result<Flattened, FlattenError> {
    let log_id = Uuid::new_v4();
    let resource_id = Uuid::new_v4();
    let scope_id = Uuid::new_v4();
    let mut rows = RowSet::new();

    let record_dropped = push_attributes(
        &mut rows,
        Table::LogAttribute,
        &AttributeOwner::Log { log_id },
        &record.attributes,
    );
    let resource_dropped = push_attributes(
        &mut rows,
        Table::LogResourceAttribute,
        &AttributeOwner::Resource { resource_id },
        resource.attributes,
    );
    let scope_dropped = push_attributes(
        &mut rows,
        Table::LogScopeAttribute,
        &AttributeOwner::Scope {
            scope_id,
            scope_name: scope.name.to_string(),
            scope_version: scope.version.to_string(),
        },
        scope.attributes,
    );

    let body = coerce_body(record.body.as_ref()).unwrap_or_else(|err| {
        debug!(error = %err, "log body could not be encoded, storing empty body");
        String::new()
    });

    rows.push(
        Table::Log,
        LogRow {
            log_id,
            resource_id,
            scope_id,
            trace_id: hex_id(&record.trace_id),
            span_id: hex_id(&record.span_id),
            time_unix_nano: nanos(record.time_unix_nano),
            observed_time_unix_nano: nanos(record.observed_time_unix_nano),
            severity_id: record.severity_number,
            severity_text: record.severity_text.clone(),
            body,
            flags: i64::from(record.flags),
            dropped_attributes_count: u64::from(record.dropped_attributes_count)
                + record_dropped,
        },
    );

    Ok(Flattened {
        root_id: log_id,
        rows,
        dropped_attributes: record_dropped + resource_dropped + scope_dropped,
    })
}
