use opentelemetry_proto::tonic::metrics::v1::SummaryDataPoint;
use uuid::Uuid;

use super::MetricBuilder;
use crate::otlp::common::nanos;
use crate::rows::{QuantileRow, SummaryDatapointRow};
use crate::table::Table;

/// Summaries carry no exemplars; quantiles become their own rows.
pub(super) fn append_points(builder: &mut MetricBuilder, points: &[SummaryDataPoint]) {
    for point in points {
        let id = Uuid::new_v4();
        builder.push(
            builder.tables.datapoint,
            SummaryDatapointRow {
                metric_id: builder.metric_id,
                id,
                start_time_unix: nanos(point.start_time_unix_nano),
                time_unix: nanos(point.time_unix_nano),
                count: point.count,
                sum: point.sum,
                flags: i64::from(point.flags),
            },
        );
        builder.datapoint_attributes(id, &point.attributes);

        for quantile in &point.quantile_values {
            builder.push(
                Table::SummaryQuantileValue,
                QuantileRow {
                    summary_id: builder.metric_id,
                    datapoint_id: id,
                    quantile_id: Uuid::new_v4(),
                    quantile: quantile.quantile,
                    value: quantile.value,
                },
            );
        }
    }
}
