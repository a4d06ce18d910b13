//! Counter family construction shared by the collectors.

use std::collections::HashMap;

use prometheus::core::Desc;
use prometheus::proto::{Counter, LabelPair, Metric, MetricFamily, MetricType};

use crate::aggregate::AggregateRow;

/// Help text attached to every billing family.
#[must_use]
pub fn help_text(enrollment: &str) -> String {
    format!("Costs billed to Azure Enterprise Agreement {enrollment}")
}

/// Descriptor for a billing counter with the given label schema.
///
/// # Errors
///
/// Returns an error if the metric name or a label name is not a valid
/// Prometheus identifier.
pub fn counter_desc(
    metric_name: &str,
    enrollment: &str,
    labels: &[&str],
) -> Result<Desc, prometheus::Error> {
    Desc::new(
        metric_name.to_string(),
        help_text(enrollment),
        labels.iter().map(|l| (*l).to_string()).collect(),
        HashMap::new(),
    )
}

/// Counter family for `desc` with one series per row.
///
/// Label values are paired with `desc.variable_labels` by position.
#[must_use]
pub fn build_counter_family(desc: &Desc, rows: &[AggregateRow]) -> MetricFamily {
    let mut family = MetricFamily::default();
    family.set_name(desc.fq_name.clone());
    family.set_help(desc.help.clone());
    family.set_field_type(MetricType::COUNTER);

    for row in rows {
        let mut metric = Metric::default();
        for (name, value) in desc.variable_labels.iter().zip(row.key.values()) {
            let mut pair = LabelPair::default();
            pair.set_name(name.clone());
            pair.set_value(value.clone());
            metric.mut_label().push(pair);
        }

        let mut counter = Counter::default();
        counter.set_value(row.value);
        metric.set_counter(counter);

        family.mut_metric().push(metric);
    }

    family
}
