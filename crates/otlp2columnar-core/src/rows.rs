// Row model for flattened telemetry
//
// Each struct mirrors one physical table layout. Rows that are shared between
// metric kinds carry the kind so their serialized column names match the
// destination table.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use uuid::Uuid;

use crate::table::{MetricKind, Table};
use crate::value::TaggedValue;

/// Rows grouped by destination table, in arrival order within each table.
pub type TableMap = BTreeMap<Table, Vec<Row>>;

/// Any row produced by flattening.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Row {
    Log(LogRow),
    Span(SpanRow),
    Metric(MetricRow),
    NumberDatapoint(NumberDatapointRow),
    HistogramDatapoint(HistogramDatapointRow),
    SummaryDatapoint(SummaryDatapointRow),
    Exemplar(ExemplarRow),
    BucketCount(BucketCountRow),
    ExplicitBound(ExplicitBoundRow),
    Quantile(QuantileRow),
    Attribute(AttributeRow),
}

macro_rules! row_from {
    ($($variant:ident($ty:ty),)+) => {
        $(impl From<$ty> for Row {
            fn from(row: $ty) -> Self {
                Row::$variant(row)
            }
        })+
    };
}

row_from! {
    Log(LogRow),
    Span(SpanRow),
    Metric(MetricRow),
    NumberDatapoint(NumberDatapointRow),
    HistogramDatapoint(HistogramDatapointRow),
    SummaryDatapoint(SummaryDatapointRow),
    Exemplar(ExemplarRow),
    BucketCount(BucketCountRow),
    ExplicitBound(ExplicitBoundRow),
    Quantile(QuantileRow),
    Attribute(AttributeRow),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRow {
    pub log_id: Uuid,
    pub resource_id: Uuid,
    pub scope_id: Uuid,
    pub trace_id: String,
    pub span_id: String,
    pub time_unix_nano: i64,
    pub observed_time_unix_nano: i64,
    pub severity_id: i32,
    pub severity_text: String,
    pub body: String,
    pub flags: i64,
    pub dropped_attributes_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanRow {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub scope_id: Uuid,
    pub event_id: Uuid,
    pub link_id: Uuid,
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: String,
    pub trace_state: String,
    pub name: String,
    pub span_kind: i8,
    pub start_time_unix_nano: i64,
    pub end_time_unix_nano: i64,
    pub duration_nano: i64,
    pub dropped_attributes_count: u64,
    pub dropped_events_count: u64,
    pub dropped_links_count: u64,
    pub message: String,
    pub status_code: i8,
}

/// Root row of one metric, shared by all five kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub kind: MetricKind,
    pub metric_id: Uuid,
    pub resource_id: Uuid,
    pub scope_id: Uuid,
    pub metric_name: String,
    pub metric_description: String,
    pub metric_unit: String,
    pub aggregation_temporality: i8,
    pub is_monotonic: i8,
}

impl Serialize for MetricRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(self.kind.id_column(), &self.metric_id)?;
        map.serialize_entry("resource_id", &self.resource_id)?;
        map.serialize_entry("scope_id", &self.scope_id)?;
        map.serialize_entry("metric_name", &self.metric_name)?;
        map.serialize_entry("metric_description", &self.metric_description)?;
        map.serialize_entry("metric_unit", &self.metric_unit)?;
        match self.kind {
            MetricKind::Sum => {
                map.serialize_entry("aggregation_temporality", &self.aggregation_temporality)?;
                map.serialize_entry("is_monotonic", &self.is_monotonic)?;
            }
            MetricKind::Histogram | MetricKind::ExponentialHistogram => {
                map.serialize_entry("aggregation_temporality", &self.aggregation_temporality)?;
            }
            MetricKind::Gauge | MetricKind::Summary => {}
        }
        map.end()
    }
}

/// Gauge and sum values keep the width they arrived with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NumberValue {
    Int(i64),
    Double(f64),
}

/// Datapoint of a gauge or sum.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberDatapointRow {
    pub kind: MetricKind,
    pub metric_id: Uuid,
    pub id: Uuid,
    pub start_time_unix: i64,
    pub time_unix: i64,
    pub value: Option<NumberValue>,
    pub flags: i64,
}

impl Serialize for NumberDatapointRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6))?;
        map.serialize_entry(self.kind.id_column(), &self.metric_id)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("start_time_unix", &self.start_time_unix)?;
        map.serialize_entry("time_unix", &self.time_unix)?;
        map.serialize_entry(self.kind.value_column(), &self.value)?;
        map.serialize_entry("flags", &self.flags)?;
        map.end()
    }
}

/// Exponential-only columns of a histogram datapoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExponentialFields {
    pub scale: i32,
    pub zero_count: u64,
    pub buckets_positive_offset: i32,
    pub buckets_negative_offset: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramDatapointRow {
    #[serde(rename = "histogram_id")]
    pub metric_id: Uuid,
    pub id: Uuid,
    pub start_time_unix: i64,
    pub time_unix: i64,
    pub count: u64,
    pub data_sum: Option<f64>,
    pub data_min: Option<f64>,
    pub data_max: Option<f64>,
    pub flags: i64,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub exponential: Option<ExponentialFields>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryDatapointRow {
    #[serde(rename = "summary_id")]
    pub metric_id: Uuid,
    pub id: Uuid,
    pub start_time_unix: i64,
    pub time_unix: i64,
    pub count: u64,
    pub sum: f64,
    pub flags: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExemplarRow {
    pub kind: MetricKind,
    pub metric_id: Uuid,
    pub datapoint_id: Uuid,
    pub exemplar_id: Uuid,
    pub time_unix: i64,
    pub value: Option<NumberValue>,
    pub trace_id: String,
    pub span_id: String,
}

impl Serialize for ExemplarRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        map.serialize_entry(self.kind.id_column(), &self.metric_id)?;
        map.serialize_entry("datapoint_id", &self.datapoint_id)?;
        map.serialize_entry("exemplar_id", &self.exemplar_id)?;
        map.serialize_entry("time_unix", &self.time_unix)?;
        map.serialize_entry(self.kind.value_column(), &self.value)?;
        map.serialize_entry("trace_id", &self.trace_id)?;
        map.serialize_entry("span_id", &self.span_id)?;
        map.end()
    }
}

/// Histogram bucket count; exponential histograms use it for both the
/// positive and negative bucket tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCountRow {
    pub histogram_id: Uuid,
    pub datapoint_id: Uuid,
    pub count_id: Uuid,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplicitBoundRow {
    pub histogram_id: Uuid,
    pub datapoint_id: Uuid,
    pub bound_id: Uuid,
    pub explicit_bound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantileRow {
    pub summary_id: Uuid,
    pub datapoint_id: Uuid,
    pub quantile_id: Uuid,
    pub quantile: f64,
    pub value: f64,
}

/// Entity an attribute row hangs off, with the ids the owning table expects.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeOwner {
    Log {
        log_id: Uuid,
    },
    Resource {
        resource_id: Uuid,
    },
    Scope {
        scope_id: Uuid,
        scope_name: String,
        scope_version: String,
    },
    Span {
        span_id: Uuid,
    },
    Event {
        event_id: Uuid,
        event_name: String,
    },
    Link {
        link_id: Uuid,
        trace_id: String,
        span_id: String,
    },
    Datapoint {
        kind: MetricKind,
        metric_id: Uuid,
        datapoint_id: Uuid,
    },
    Exemplar {
        kind: MetricKind,
        metric_id: Uuid,
        datapoint_id: Uuid,
        exemplar_id: Uuid,
    },
}

impl AttributeOwner {
    /// Id of the entity that directly owns the attribute.
    pub fn owner_id(&self) -> Uuid {
        match self {
            AttributeOwner::Log { log_id } => *log_id,
            AttributeOwner::Resource { resource_id } => *resource_id,
            AttributeOwner::Scope { scope_id, .. } => *scope_id,
            AttributeOwner::Span { span_id } => *span_id,
            AttributeOwner::Event { event_id, .. } => *event_id,
            AttributeOwner::Link { link_id, .. } => *link_id,
            AttributeOwner::Datapoint { datapoint_id, .. } => *datapoint_id,
            AttributeOwner::Exemplar { exemplar_id, .. } => *exemplar_id,
        }
    }

    fn serialize_ids<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        match self {
            AttributeOwner::Log { log_id } => map.serialize_entry("log_id", log_id),
            AttributeOwner::Resource { resource_id } => {
                map.serialize_entry("resource_id", resource_id)
            }
            AttributeOwner::Scope {
                scope_id,
                scope_name,
                scope_version,
            } => {
                map.serialize_entry("scope_id", scope_id)?;
                map.serialize_entry("scope_name", scope_name)?;
                map.serialize_entry("scope_version", scope_version)
            }
            AttributeOwner::Span { span_id } => map.serialize_entry("span_id", span_id),
            AttributeOwner::Event {
                event_id,
                event_name,
            } => {
                map.serialize_entry("event_id", event_id)?;
                map.serialize_entry("event_name", event_name)
            }
            AttributeOwner::Link {
                link_id,
                trace_id,
                span_id,
            } => {
                map.serialize_entry("link_id", link_id)?;
                map.serialize_entry("trace_id", trace_id)?;
                map.serialize_entry("span_id", span_id)
            }
            AttributeOwner::Datapoint {
                kind,
                metric_id,
                datapoint_id,
            } => {
                map.serialize_entry(kind.id_column(), metric_id)?;
                map.serialize_entry("datapoint_id", datapoint_id)
            }
            AttributeOwner::Exemplar {
                kind,
                metric_id,
                datapoint_id,
                exemplar_id,
            } => {
                map.serialize_entry(kind.id_column(), metric_id)?;
                map.serialize_entry("datapoint_id", datapoint_id)?;
                map.serialize_entry("exemplar_id", exemplar_id)
            }
        }
    }
}

/// One retained key/value pair of any attribute collection.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRow {
    pub owner: AttributeOwner,
    pub key: String,
    pub value: TaggedValue,
}

impl Serialize for AttributeRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.owner.serialize_ids(&mut map)?;
        map.serialize_entry("key", &self.key)?;
        map.serialize_entry("int_value", &self.value.int_value)?;
        map.serialize_entry("string_value", &self.value.string_value)?;
        map.serialize_entry("bool_value", &self.value.bool_value)?;
        map.serialize_entry("double_value", &self.value.double_value)?;
        map.serialize_entry("bytes_value", &BASE64.encode(&self.value.bytes_value))?;
        map.end()
    }
}

/// Rows produced for one or more entities, grouped by table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    tables: TableMap,
}

impl RowSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, table: Table, row: impl Into<Row>) {
        self.tables.entry(table).or_default().push(row.into());
    }

    pub fn rows(&self, table: Table) -> &[Row] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, table: Table) -> usize {
        self.rows(table).len()
    }

    pub fn total_rows(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Table, &[Row])> {
        self.tables
            .iter()
            .map(|(table, rows)| (*table, rows.as_slice()))
    }

    /// Move every row of `other` to the end of the matching table.
    pub fn append(&mut self, other: RowSet) {
        for (table, mut rows) in other.tables {
            if rows.is_empty() {
                continue;
            }
            self.tables.entry(table).or_default().append(&mut rows);
        }
    }

    pub fn into_tables(self) -> TableMap {
        self.tables
    }
}
