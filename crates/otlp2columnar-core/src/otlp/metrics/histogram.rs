use opentelemetry_proto::tonic::metrics::v1::{ExponentialHistogramDataPoint, HistogramDataPoint};
use uuid::Uuid;

use super::MetricBuilder;
use crate::otlp::common::nanos;
use crate::rows::{BucketCountRow, ExplicitBoundRow, ExponentialFields, HistogramDatapointRow};
use crate::table::Table;

pub(super) fn append_points(builder: &mut MetricBuilder, points: &[HistogramDataPoint]) {
    for point in points {
        let id = Uuid::new_v4();
        builder.push(
            builder.tables.datapoint,
            HistogramDatapointRow {
                metric_id: builder.metric_id,
                id,
                start_time_unix: nanos(point.start_time_unix_nano),
                time_unix: nanos(point.time_unix_nano),
                count: point.count,
                data_sum: point.sum,
                data_min: point.min,
                data_max: point.max,
                flags: i64::from(point.flags),
                exponential: None,
            },
        );
        builder.datapoint_attributes(id, &point.attributes);
        builder.exemplars(id, &point.exemplars);

        push_bucket_counts(builder, Table::HistogramBucketCount, id, &point.bucket_counts);
        for bound in &point.explicit_bounds {
            builder.push(
                Table::HistogramExplicitBound,
                ExplicitBoundRow {
                    histogram_id: builder.metric_id,
                    datapoint_id: id,
                    bound_id: Uuid::new_v4(),
                    explicit_bound: *bound,
                },
            );
        }
    }
}

pub(super) fn append_exponential_points(
    builder: &mut MetricBuilder,
    points: &[ExponentialHistogramDataPoint],
) {
    for point in points {
        let id = Uuid::new_v4();
        let positive = point.positive.as_ref();
        let negative = point.negative.as_ref();

        builder.push(
            builder.tables.datapoint,
            HistogramDatapointRow {
                metric_id: builder.metric_id,
                id,
                start_time_unix: nanos(point.start_time_unix_nano),
                time_unix: nanos(point.time_unix_nano),
                count: point.count,
                data_sum: point.sum,
                data_min: point.min,
                data_max: point.max,
                flags: i64::from(point.flags),
                exponential: Some(ExponentialFields {
                    scale: point.scale,
                    zero_count: point.zero_count,
                    buckets_positive_offset: positive.map(|b| b.offset).unwrap_or_default(),
                    buckets_negative_offset: negative.map(|b| b.offset).unwrap_or_default(),
                }),
            },
        );
        builder.datapoint_attributes(id, &point.attributes);
        builder.exemplars(id, &point.exemplars);

        if let Some(positive) = positive {
            push_bucket_counts(
                builder,
                Table::ExpHistogramPositiveBucketCount,
                id,
                &positive.bucket_counts,
            );
        }
        if let Some(negative) = negative {
            push_bucket_counts(
                builder,
                Table::ExpHistogramNegativeBucketCount,
                id,
                &negative.bucket_counts,
            );
        }
    }
}

fn push_bucket_counts(builder: &mut MetricBuilder, table: Table, datapoint_id: Uuid, counts: &[u64]) {
    for count in counts {
        builder.push(
            table,
            BucketCountRow {
                histogram_id: builder.metric_id,
                datapoint_id,
                count_id: Uuid::new_v4(),
                count: *count,
            },
        );
    }
}
