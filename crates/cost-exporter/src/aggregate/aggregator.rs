//! Group-by-and-sum over normalized rows.

use std::collections::BTreeMap;

use crate::api::FieldValue;
use crate::error::SchemaError;

/// Label values identifying one aggregation bucket, in column order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey(Vec<String>);

impl GroupKey {
    /// Build a key from label values.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    /// Label values in column order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.0
    }
}

/// How a group's sum is turned into the emitted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Emit the sum unchanged.
    #[default]
    Unrounded,
    /// Round to the nearest integer, ties to even.
    HalfEven,
}

impl Rounding {
    /// Apply the rounding mode.
    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Unrounded => value,
            Self::HalfEven => value.round_ties_even(),
        }
    }
}

/// One emitted bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    /// Grouping key.
    pub key: GroupKey,
    /// Summed measure.
    pub value: f64,
}

/// Mapping from group key to summed measure, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    groups: BTreeMap<GroupKey, f64>,
}

impl Aggregate {
    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no rows were aggregated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sum for a key.
    #[must_use]
    pub fn get(&self, key: &GroupKey) -> Option<f64> {
        self.groups.get(key).copied()
    }

    /// Consume into rows with the rounding mode applied.
    #[must_use]
    pub fn into_rows(self, rounding: Rounding) -> Vec<AggregateRow> {
        self.groups
            .into_iter()
            .map(|(key, sum)| AggregateRow {
                key,
                value: rounding.apply(sum),
            })
            .collect()
    }
}

/// Group rows by their first `key_field_count` values and sum the trailing
/// measure within each group.
///
/// A null measure adds nothing to its group.
///
/// # Errors
///
/// Returns [`SchemaError::Arity`] when a row is not `key_field_count + 1`
/// wide and [`SchemaError::NonNumericMeasure`] when the measure is text.
pub fn aggregate<I>(rows: I, key_field_count: usize) -> Result<Aggregate, SchemaError>
where
    I: IntoIterator<Item = Vec<FieldValue>>,
{
    let mut groups: BTreeMap<GroupKey, f64> = BTreeMap::new();

    for (index, mut row) in rows.into_iter().enumerate() {
        if row.len() != key_field_count + 1 {
            return Err(SchemaError::Arity {
                record: index,
                expected: key_field_count + 1,
                found: row.len(),
            });
        }

        let amount = match row.pop() {
            Some(FieldValue::Number(number)) => number.as_f64().unwrap_or(0.0),
            Some(FieldValue::Null) | None => 0.0,
            Some(FieldValue::Text(_)) => {
                return Err(SchemaError::NonNumericMeasure {
                    field: format!("column {key_field_count}"),
                    record: index,
                })
            }
        };

        let key = GroupKey::new(row.iter().map(FieldValue::label_value));
        *groups.entry(key).or_insert(0.0) += amount;
    }

    Ok(Aggregate { groups })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn value(v: serde_json::Value) -> FieldValue {
        FieldValue::from_json(&v).unwrap()
    }

    fn row(dept: &str, acct: &str, cost: f64) -> Vec<FieldValue> {
        vec![value(json!(dept)), value(json!(acct)), value(json!(cost))]
    }

    #[test]
    fn test_groups_partition_input() {
        let rows = vec![
            row("eng", "a1", 1.0),
            row("ops", "a1", 2.0),
            row("eng", "a1", 3.0),
            row("eng", "a2", 4.0),
        ];

        let aggregate = aggregate(rows, 2).unwrap();

        assert_eq!(aggregate.len(), 3);
        assert_eq!(aggregate.get(&GroupKey::new(["eng", "a1"])), Some(4.0));
        assert_eq!(aggregate.get(&GroupKey::new(["ops", "a1"])), Some(2.0));
        assert_eq!(aggregate.get(&GroupKey::new(["eng", "a2"])), Some(4.0));
    }

    #[test]
    fn test_sum_covers_every_row_once() {
        let rows: Vec<Vec<FieldValue>> = (0..20)
            .map(|i| row(if i % 3 == 0 { "a" } else { "b" }, "x", f64::from(i)))
            .collect();

        let total: f64 = aggregate(rows, 2)
            .unwrap()
            .into_rows(Rounding::Unrounded)
            .iter()
            .map(|r| r.value)
            .sum();

        assert!((total - 190.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_input() {
        let aggregate = aggregate(Vec::new(), 2).unwrap();
        assert!(aggregate.is_empty());
        assert!(aggregate.into_rows(Rounding::HalfEven).is_empty());
    }

    #[test]
    fn test_rows_are_sorted_by_key() {
        let rows = vec![row("ops", "a1", 1.0), row("eng", "b1", 1.0), row("eng", "a1", 1.0)];
        let keys: Vec<GroupKey> = aggregate(rows, 2)
            .unwrap()
            .into_rows(Rounding::Unrounded)
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(
            keys,
            vec![
                GroupKey::new(["eng", "a1"]),
                GroupKey::new(["eng", "b1"]),
                GroupKey::new(["ops", "a1"]),
            ]
        );
    }

    #[test]
    fn test_null_measure_adds_nothing() {
        let rows = vec![
            vec![value(json!("eng")), value(json!(2.5))],
            vec![value(json!("eng")), FieldValue::Null],
        ];
        let aggregate = aggregate(rows, 1).unwrap();
        assert_eq!(aggregate.get(&GroupKey::new(["eng"])), Some(2.5));
    }

    #[test]
    fn test_null_key_is_its_own_group() {
        let rows = vec![
            vec![FieldValue::Null, value(json!(1))],
            vec![value(json!("rg")), value(json!(1))],
        ];
        let aggregate = aggregate(rows, 1).unwrap();
        assert_eq!(aggregate.get(&GroupKey::new([""])), Some(1.0));
        assert_eq!(aggregate.len(), 2);
    }

    #[test]
    fn test_text_measure_is_rejected() {
        let rows = vec![vec![value(json!("eng")), value(json!("12"))]];
        let err = aggregate(rows, 1).unwrap_err();
        assert!(matches!(err, SchemaError::NonNumericMeasure { record: 0, .. }));
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        let rows = vec![vec![value(json!("eng"))]];
        let err = aggregate(rows, 1).unwrap_err();
        assert_eq!(
            err,
            SchemaError::Arity {
                record: 0,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_half_even_rounding() {
        assert!((Rounding::HalfEven.apply(15.5) - 16.0).abs() < f64::EPSILON);
        assert!((Rounding::HalfEven.apply(14.5) - 14.0).abs() < f64::EPSILON);
        assert!((Rounding::HalfEven.apply(15.499) - 15.0).abs() < f64::EPSILON);
        assert!((Rounding::Unrounded.apply(14.5) - 14.5).abs() < f64::EPSILON);
    }
}
