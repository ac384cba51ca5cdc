use opentelemetry_proto::tonic::trace::v1::Span;
use uuid::Uuid;

use super::common::{hex_id, is_empty_id, nanos, push_attributes, ResourceContext, ScopeContext};
use super::{FlattenError, Flattened};
use crate::rows::{AttributeOwner, RowSet, SpanRow};
use crate::table::Table;

/// Flatten one span into its `trace_span` row plus span, resource, scope,
/// event and link attribute rows.
///
/// Spans without a trace id, span id or start timestamp are rejected before any
/// row is built.
pub fn flatten_span(
    resource: &ResourceContext<'_>,
    scope: &ScopeContext<'_>,
    span: &Span,
) -> Result<Flattened, FlattenError> {
    validate_span(span)?;

    let id = Uuid::new_v4();
    let resource_id = Uuid::new_v4();
    let scope_id = Uuid::new_v4();
    let event_id = Uuid::new_v4();
    let link_id = Uuid::new_v4();
    let trace_id = hex_id(&span.trace_id);
    let span_id = hex_id(&span.span_id);
    let mut rows = RowSet::new();

    let span_dropped = push_attributes(
        &mut rows,
        Table::TraceSpanAttribute,
        &AttributeOwner::Span { span_id: id },
        &span.attributes,
    );
    let mut dropped = span_dropped;
    dropped += push_attributes(
        &mut rows,
        Table::TraceResourceAttribute,
        &AttributeOwner::Resource { resource_id },
        resource.attributes,
    );
    dropped += push_attributes(
        &mut rows,
        Table::TraceScopeAttribute,
        &AttributeOwner::Scope {
            scope_id,
            scope_name: scope.name.to_string(),
            scope_version: scope.version.to_string(),
        },
        scope.attributes,
    );

    for event in &span.events {
        dropped += push_attributes(
            &mut rows,
            Table::TraceEventAttribute,
            &AttributeOwner::Event {
                event_id,
                event_name: event.name.clone(),
            },
            &event.attributes,
        );
    }

    let link_owner = AttributeOwner::Link {
        link_id,
        trace_id: trace_id.clone(),
        span_id: span_id.clone(),
    };
    for link in &span.links {
        dropped += push_attributes(
            &mut rows,
            Table::TraceLinkAttribute,
            &link_owner,
            &link.attributes,
        );
    }

    let start = nanos(span.start_time_unix_nano);
    let end = nanos(span.end_time_unix_nano);
    let duration_nano = if end != 0 && end >= start {
        end - start
    } else {
        0
    };
    let (message, status_code) = span
        .status
        .as_ref()
        .map(|status| (status.message.clone(), status.code))
        .unwrap_or_default();

    rows.push(
        Table::TraceSpan,
        SpanRow {
            id,
            resource_id,
            scope_id,
            event_id,
            link_id,
            trace_id,
            span_id,
            parent_span_id: hex_id(&span.parent_span_id),
            trace_state: span.trace_state.clone(),
            name: span.name.clone(),
            span_kind: i8::try_from(span.kind).unwrap_or_default(),
            start_time_unix_nano: start,
            end_time_unix_nano: end,
            duration_nano,
            dropped_attributes_count: u64::from(span.dropped_attributes_count) + span_dropped,
            dropped_events_count: u64::from(span.dropped_events_count),
            dropped_links_count: u64::from(span.dropped_links_count),
            message,
            status_code: i8::try_from(status_code).unwrap_or_default(),
        },
    );

    Ok(Flattened {
        root_id: id,
        rows,
        dropped_attributes: dropped,
    })
}

fn validate_span(span: &Span) -> Result<(), FlattenError> {
    if is_empty_id(&span.trace_id) {
        return Err(FlattenError::MissingTraceId);
    }
    if is_empty_id(&span.span_id) {
        return Err(FlattenError::MissingSpanId);
    }
    if span.start_time_unix_nano == 0 {
        return Err(FlattenError::MissingTimestamp);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::Row;
    use opentelemetry_proto::tonic::{
        common::v1::{any_value, AnyValue, KeyValue},
        trace::v1::{span, Status},
    };

    fn kv(key: &str, value: i64) -> KeyValue {
        KeyValue {
            key: key.to_string(),
            value: Some(AnyValue {
                value: Some(any_value::Value::IntValue(value)),
            }),
        }
    }

    fn valid_span() -> Span {
        Span {
            trace_id: vec![0xaa; 16],
            span_id: vec![0xbb; 8],
            parent_span_id: vec![0xcc; 8],
            name: "GET /cart".to_string(),
            kind: 2,
            start_time_unix_nano: 1_000,
            end_time_unix_nano: 4_500,
            attributes: vec![kv("http.status_code", 200)],
            events: vec![
                span::Event {
                    name: "cache.miss".to_string(),
                    attributes: vec![kv("attempt", 1), kv("", 2)],
                    ..Default::default()
                },
                span::Event {
                    name: "retry".to_string(),
                    attributes: vec![kv("attempt", 2)],
                    ..Default::default()
                },
            ],
            links: vec![span::Link {
                trace_id: vec![0x11; 16],
                span_id: vec![0x22; 8],
                attributes: vec![kv("link.weight", 5)],
                ..Default::default()
            }],
            status: Some(Status {
                message: "upstream timeout".to_string(),
                code: 2,
            }),
            dropped_events_count: 3,
            ..Default::default()
        }
    }

    fn span_row(flattened: &Flattened) -> &SpanRow {
        match &flattened.rows.rows(Table::TraceSpan)[0] {
            Row::Span(row) => row,
            other => panic!("expected span row, got {other:?}"),
        }
    }

    fn owners(flattened: &Flattened, table: Table) -> Vec<AttributeOwner> {
        flattened
            .rows
            .rows(table)
            .iter()
            .map(|row| match row {
                Row::Attribute(attr) => attr.owner.clone(),
                other => panic!("expected attribute row, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn flattens_span_with_events_and_links() {
        let flattened = flatten_span(
            &ResourceContext::default(),
            &ScopeContext::default(),
            &valid_span(),
        )
        .unwrap();

        let row = span_row(&flattened);
        assert_eq!(row.id, flattened.root_id);
        assert_eq!(row.trace_id, "aa".repeat(16));
        assert_eq!(row.span_id, "bb".repeat(8));
        assert_eq!(row.parent_span_id, "cc".repeat(8));
        assert_eq!(row.span_kind, 2);
        assert_eq!(row.duration_nano, 3_500);
        assert_eq!(row.status_code, 2);
        assert_eq!(row.message, "upstream timeout");
        assert_eq!(row.dropped_events_count, 3);
        assert_eq!(row.dropped_attributes_count, 0);
        assert_eq!(flattened.dropped_attributes, 1);

        assert_eq!(
            owners(&flattened, Table::TraceSpanAttribute),
            vec![AttributeOwner::Span { span_id: row.id }]
        );
        assert_eq!(
            owners(&flattened, Table::TraceEventAttribute),
            vec![
                AttributeOwner::Event {
                    event_id: row.event_id,
                    event_name: "cache.miss".to_string(),
                },
                AttributeOwner::Event {
                    event_id: row.event_id,
                    event_name: "retry".to_string(),
                },
            ]
        );
        assert_eq!(
            owners(&flattened, Table::TraceLinkAttribute),
            vec![AttributeOwner::Link {
                link_id: row.link_id,
                trace_id: row.trace_id.clone(),
                span_id: row.span_id.clone(),
            }]
        );
    }

    #[test]
    fn rejects_span_without_trace_id() {
        let span = Span {
            trace_id: vec![],
            ..valid_span()
        };
        let err = flatten_span(&ResourceContext::default(), &ScopeContext::default(), &span)
            .unwrap_err();
        assert_eq!(err, FlattenError::MissingTraceId);
        assert_eq!(err.to_string(), "span has no trace ID");
    }

    #[test]
    fn rejects_span_without_span_id() {
        let span = Span {
            span_id: vec![0; 8],
            ..valid_span()
        };
        let err = flatten_span(&ResourceContext::default(), &ScopeContext::default(), &span)
            .unwrap_err();
        assert_eq!(err, FlattenError::MissingSpanId);
    }

    #[test]
    fn rejects_span_without_start_time() {
        let span = Span {
            start_time_unix_nano: 0,
            ..valid_span()
        };
        let err = flatten_span(&ResourceContext::default(), &ScopeContext::default(), &span)
            .unwrap_err();
        assert_eq!(err, FlattenError::MissingTimestamp);
    }

    #[test]
    fn unfinished_span_has_zero_duration() {
        let span = Span {
            end_time_unix_nano: 0,
            ..valid_span()
        };
        let flattened =
            flatten_span(&ResourceContext::default(), &ScopeContext::default(), &span).unwrap();
        assert_eq!(span_row(&flattened).duration_nano, 0);
    }
}
