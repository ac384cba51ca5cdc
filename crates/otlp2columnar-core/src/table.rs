// Destination table catalogue
//
// Physical table names are part of the persisted format and must not change.

use std::fmt;

macro_rules! tables {
    ($($variant:ident => $name:literal,)+) => {
        /// Every destination table a flattened batch can write to.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Table {
            $($variant,)+
        }

        impl Table {
            pub const ALL: &'static [Table] = &[$(Table::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Table::$variant => $name,)+
                }
            }
        }
    };
}

tables! {
    Log => "log",
    LogAttribute => "log_attribute",
    LogResourceAttribute => "log_resource_attribute",
    LogScopeAttribute => "log_scope_attribute",

    TraceSpan => "trace_span",
    TraceSpanAttribute => "trace_span_attribute",
    TraceResourceAttribute => "trace_resource_attribute",
    TraceScopeAttribute => "trace_scope_attribute",
    TraceEventAttribute => "trace_event_attribute",
    TraceLinkAttribute => "trace_link_attribute",

    Gauge => "metric_gauge",
    GaugeDatapoint => "metric_gauge_datapoint",
    GaugeDatapointAttribute => "metric_gauge_datapoint_attribute",
    GaugeDatapointExemplar => "metric_gauge_datapoint_exemplar",
    GaugeDatapointExemplarAttribute => "metric_gauge_datapoint_exemplar_attribute",
    GaugeResourceAttribute => "metric_gauge_metric_resource_attribute",
    GaugeScopeAttribute => "metric_gauge_scope_attribute",

    Sum => "metric_sum",
    SumResourceAttribute => "metric_sum_resource_attribute",
    SumScopeAttribute => "metric_sum_scope_attribute",
    SumDatapoint => "metric_sum_datapoint",
    SumDatapointAttribute => "metric_sum_datapoint_attribute",
    SumDatapointExemplar => "metric_sum_datapoint_exemplar",
    SumDatapointExemplarAttribute => "metric_sum_datapoint_exemplar_attribute",

    Histogram => "metric_histogram",
    HistogramResourceAttribute => "metric_histogram_resource_attribute",
    HistogramScopeAttribute => "metric_histogram_scope_attribute",
    HistogramDatapoint => "metric_histogram_datapoint",
    HistogramDatapointAttribute => "metric_histogram_datapoint_attribute",
    HistogramBucketCount => "metric_histogram_datapoint_bucket_count",
    HistogramExplicitBound => "metric_histogram_datapoint_explicit_bound",
    HistogramDatapointExemplar => "metric_histogram_datapoint_exemplar",
    HistogramDatapointExemplarAttribute => "metric_histogram_datapoint_exemplar_attribute",

    ExpHistogram => "metric_exp_histogram",
    ExpHistogramResourceAttribute => "metric_exp_histogram_resource_attribute",
    ExpHistogramScopeAttribute => "metric_exp_histogram_scope_attribute",
    ExpHistogramDatapoint => "metric_exp_histogram_datapoint",
    ExpHistogramDatapointAttribute => "metric_exp_histogram_datapoint_attribute",
    ExpHistogramPositiveBucketCount => "metric_exp_histogram_datapoint_bucket_positive_count",
    ExpHistogramNegativeBucketCount => "metric_exp_histogram_datapoint_bucket_negative_count",
    ExpHistogramDatapointExemplar => "metric_exp_histogram_datapoint_exemplar",
    ExpHistogramDatapointExemplarAttribute => "metric_exp_histogram_datapoint_exemplar_attribute",

    Summary => "metric_summary",
    SummaryResourceAttribute => "metric_summary_resource_attribute",
    SummaryScopeAttribute => "metric_summary_scope_attribute",
    SummaryDatapoint => "metric_summary_datapoint",
    SummaryDatapointAttribute => "metric_summary_datapoint_attribute",
    SummaryQuantileValue => "metric_summary_datapoint_quantile_values",
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metric point kinds, each owning its own family of tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Gauge,
    Sum,
    Histogram,
    ExponentialHistogram,
    Summary,
}

/// Tables owned by one metric kind. Kinds without exemplars or buckets leave
/// those slots as `None`.
#[derive(Debug, Clone, Copy)]
pub struct MetricTables {
    pub root: Table,
    pub resource_attribute: Table,
    pub scope_attribute: Table,
    pub datapoint: Table,
    pub datapoint_attribute: Table,
    pub exemplar: Option<Table>,
    pub exemplar_attribute: Option<Table>,
}

impl MetricKind {
    /// Column holding the metric root id on every row of this kind.
    pub fn id_column(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge_id",
            MetricKind::Sum => "sum_id",
            MetricKind::Histogram | MetricKind::ExponentialHistogram => "histogram_id",
            MetricKind::Summary => "summary_id",
        }
    }

    /// Column holding number and exemplar values.
    pub fn value_column(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge_value",
            MetricKind::Sum => "sum_value",
            MetricKind::Histogram | MetricKind::ExponentialHistogram => "histogram_value",
            MetricKind::Summary => "summary_value",
        }
    }

    pub fn tables(&self) -> MetricTables {
        match self {
            MetricKind::Gauge => MetricTables {
                root: Table::Gauge,
                resource_attribute: Table::GaugeResourceAttribute,
                scope_attribute: Table::GaugeScopeAttribute,
                datapoint: Table::GaugeDatapoint,
                datapoint_attribute: Table::GaugeDatapointAttribute,
                exemplar: Some(Table::GaugeDatapointExemplar),
                exemplar_attribute: Some(Table::GaugeDatapointExemplarAttribute),
            },
            MetricKind::Sum => MetricTables {
                root: Table::Sum,
                resource_attribute: Table::SumResourceAttribute,
                scope_attribute: Table::SumScopeAttribute,
                datapoint: Table::SumDatapoint,
                datapoint_attribute: Table::SumDatapointAttribute,
                exemplar: Some(Table::SumDatapointExemplar),
                exemplar_attribute: Some(Table::SumDatapointExemplarAttribute),
            },
            MetricKind::Histogram => MetricTables {
                root: Table::Histogram,
                resource_attribute: Table::HistogramResourceAttribute,
                scope_attribute: Table::HistogramScopeAttribute,
                datapoint: Table::HistogramDatapoint,
                datapoint_attribute: Table::HistogramDatapointAttribute,
                exemplar: Some(Table::HistogramDatapointExemplar),
                exemplar_attribute: Some(Table::HistogramDatapointExemplarAttribute),
            },
            MetricKind::ExponentialHistogram => MetricTables {
                root: Table::ExpHistogram,
                resource_attribute: Table::ExpHistogramResourceAttribute,
                scope_attribute: Table::ExpHistogramScopeAttribute,
                datapoint: Table::ExpHistogramDatapoint,
                datapoint_attribute: Table::ExpHistogramDatapointAttribute,
                exemplar: Some(Table::ExpHistogramDatapointExemplar),
                exemplar_attribute: Some(Table::ExpHistogramDatapointExemplarAttribute),
            },
            MetricKind::Summary => MetricTables {
                root: Table::Summary,
                resource_attribute: Table::SummaryResourceAttribute,
                scope_attribute: Table::SummaryScopeAttribute,
                datapoint: Table::SummaryDatapoint,
                datapoint_attribute: Table::SummaryDatapointAttribute,
                exemplar: None,
                exemplar_attribute: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_names_are_unique() {
        let names: HashSet<_> = Table::ALL.iter().map(Table::as_str).collect();
        assert_eq!(names.len(), Table::ALL.len());
    }

    #[test]
    fn gauge_resource_table_keeps_metric_segment() {
        assert_eq!(
            MetricKind::Gauge.tables().resource_attribute.as_str(),
            "metric_gauge_metric_resource_attribute"
        );
    }
}
