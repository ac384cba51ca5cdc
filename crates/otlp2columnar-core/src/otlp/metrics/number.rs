use opentelemetry_proto::tonic::metrics::v1::{number_data_point, NumberDataPoint};
use uuid::Uuid;

use super::MetricBuilder;
use crate::otlp::common::nanos;
use crate::rows::{NumberDatapointRow, NumberValue};

/// Gauge and sum datapoints share one row shape.
pub(super) fn append_points(builder: &mut MetricBuilder, points: &[NumberDataPoint]) {
    for point in points {
        let id = Uuid::new_v4();
        builder.push(
            builder.tables.datapoint,
            NumberDatapointRow {
                kind: builder.kind,
                metric_id: builder.metric_id,
                id,
                start_time_unix: nanos(point.start_time_unix_nano),
                time_unix: nanos(point.time_unix_nano),
                value: point.value.as_ref().map(|value| match value {
                    number_data_point::Value::AsDouble(v) => NumberValue::Double(*v),
                    number_data_point::Value::AsInt(v) => NumberValue::Int(*v),
                }),
                flags: i64::from(point.flags),
            },
        );
        builder.datapoint_attributes(id, &point.attributes);
        builder.exemplars(id, &point.exemplars);
    }
}
