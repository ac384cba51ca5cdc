// Metric flattening
//
// One root row per metric plus datapoint, exemplar and bucket rows. The metric
// kind decides which family of tables the rows land in.

use opentelemetry_proto::tonic::common::v1::KeyValue;
use opentelemetry_proto::tonic::metrics::v1::{exemplar, metric::Data, Exemplar, Metric};
use uuid::Uuid;

use super::common::{hex_id, nanos, push_attributes, ResourceContext, ScopeContext};
use super::{FlattenError, Flattened};
use crate::rows::{AttributeOwner, ExemplarRow, MetricRow, NumberValue, Row, RowSet};
use crate::table::{MetricKind, MetricTables, Table};

mod histogram;
mod number;
mod summary;

/// Flatten one metric of any kind.
///
/// Metrics without data are rejected; everything else is flattened even when
/// the datapoint list is empty.
pub fn flatten_metric(
    resource: &ResourceContext<'_>,
    scope: &ScopeContext<'_>,
    metric: &Metric,
) -> Result<Flattened, FlattenError> {
    let data = metric
        .data
        .as_ref()
        .ok_or_else(|| FlattenError::MissingMetricData {
            name: metric.name.clone(),
        })?;

    let flattened = match data {
        Data::Gauge(gauge) => {
            let mut builder = MetricBuilder::new(MetricKind::Gauge, resource, scope, metric, 0, 0);
            number::append_points(&mut builder, &gauge.data_points);
            builder.finish()
        }
        Data::Sum(sum) => {
            let mut builder = MetricBuilder::new(
                MetricKind::Sum,
                resource,
                scope,
                metric,
                sum.aggregation_temporality,
                i8::from(sum.is_monotonic),
            );
            number::append_points(&mut builder, &sum.data_points);
            builder.finish()
        }
        Data::Histogram(histogram) => {
            let mut builder = MetricBuilder::new(
                MetricKind::Histogram,
                resource,
                scope,
                metric,
                histogram.aggregation_temporality,
                0,
            );
            histogram::append_points(&mut builder, &histogram.data_points);
            builder.finish()
        }
        Data::ExponentialHistogram(histogram) => {
            let mut builder = MetricBuilder::new(
                MetricKind::ExponentialHistogram,
                resource,
                scope,
                metric,
                histogram.aggregation_temporality,
                0,
            );
            histogram::append_exponential_points(&mut builder, &histogram.data_points);
            builder.finish()
        }
        Data::Summary(summary) => {
            let mut builder =
                MetricBuilder::new(MetricKind::Summary, resource, scope, metric, 0, 0);
            summary::append_points(&mut builder, &summary.data_points);
            builder.finish()
        }
    };

    Ok(flattened)
}

/// Accumulates the rows of one metric while its datapoints are walked.
struct MetricBuilder {
    kind: MetricKind,
    tables: MetricTables,
    metric_id: Uuid,
    rows: RowSet,
    dropped: u64,
}

impl MetricBuilder {
    fn new(
        kind: MetricKind,
        resource: &ResourceContext<'_>,
        scope: &ScopeContext<'_>,
        metric: &Metric,
        aggregation_temporality: i32,
        is_monotonic: i8,
    ) -> Self {
        let tables = kind.tables();
        let metric_id = Uuid::new_v4();
        let resource_id = Uuid::new_v4();
        let scope_id = Uuid::new_v4();
        let mut rows = RowSet::new();

        rows.push(
            tables.root,
            MetricRow {
                kind,
                metric_id,
                resource_id,
                scope_id,
                metric_name: metric.name.clone(),
                metric_description: metric.description.clone(),
                metric_unit: metric.unit.clone(),
                aggregation_temporality: i8::try_from(aggregation_temporality)
                    .unwrap_or_default(),
                is_monotonic,
            },
        );

        let mut dropped = push_attributes(
            &mut rows,
            tables.resource_attribute,
            &AttributeOwner::Resource { resource_id },
            resource.attributes,
        );
        dropped += push_attributes(
            &mut rows,
            tables.scope_attribute,
            &AttributeOwner::Scope {
                scope_id,
                scope_name: scope.name.to_string(),
                scope_version: scope.version.to_string(),
            },
            scope.attributes,
        );

        Self {
            kind,
            tables,
            metric_id,
            rows,
            dropped,
        }
    }

    fn push(&mut self, table: Table, row: impl Into<Row>) {
        self.rows.push(table, row);
    }

    fn datapoint_attributes(&mut self, datapoint_id: Uuid, attributes: &[KeyValue]) {
        let owner = AttributeOwner::Datapoint {
            kind: self.kind,
            metric_id: self.metric_id,
            datapoint_id,
        };
        self.dropped += push_attributes(
            &mut self.rows,
            self.tables.datapoint_attribute,
            &owner,
            attributes,
        );
    }

    fn exemplars(&mut self, datapoint_id: Uuid, exemplars: &[Exemplar]) {
        let (Some(exemplar_table), Some(attribute_table)) =
            (self.tables.exemplar, self.tables.exemplar_attribute)
        else {
            return;
        };

        for exemplar in exemplars {
            let exemplar_id = Uuid::new_v4();
            self.push(
                exemplar_table,
                ExemplarRow {
                    kind: self.kind,
                    metric_id: self.metric_id,
                    datapoint_id,
                    exemplar_id,
                    time_unix: nanos(exemplar.time_unix_nano),
                    value: exemplar.value.as_ref().map(|value| match value {
                        exemplar::Value::AsDouble(v) => NumberValue::Double(*v),
                        exemplar::Value::AsInt(v) => NumberValue::Int(*v),
                    }),
                    trace_id: hex_id(&exemplar.trace_id),
                    span_id: hex_id(&exemplar.span_id),
                },
            );

            let owner = AttributeOwner::Exemplar {
                kind: self.kind,
                metric_id: self.metric_id,
                datapoint_id,
                exemplar_id,
            };
            self.dropped += push_attributes(
                &mut self.rows,
                attribute_table,
                &owner,
                &exemplar.filtered_attributes,
            );
        }
    }

    fn finish(self) -> Flattened {
        Flattened {
            root_id: self.metric_id,
            rows: self.rows,
            dropped_attributes: self.dropped,
        }
    }
}
