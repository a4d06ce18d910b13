//! Turning raw billing records into labelled sums.
//!
//! A [`RecordSchema`] names the key columns and the measure column of one
//! record kind. [`RecordSchema::aggregate_records`] normalizes each record
//! against it and sums the measure per distinct key.

mod aggregator;
mod normalize;

pub use aggregator::{aggregate, Aggregate, AggregateRow, GroupKey, Rounding};
pub use normalize::{normalize, normalize_all};

use crate::api::RawRecord;
use crate::error::SchemaError;

/// Key columns, measure column and rounding for one record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSchema {
    /// Grouping columns, also the emitted label names.
    pub key_fields: &'static [&'static str],
    /// Column summed per group.
    pub measure_field: &'static str,
    /// Rounding applied to each group's sum.
    pub rounding: Rounding,
}

impl RecordSchema {
    /// Key columns followed by the measure column.
    #[must_use]
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = self.key_fields.to_vec();
        columns.push(self.measure_field);
        columns
    }

    /// Normalize, group and sum `records`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] for the first record that lacks a column or
    /// carries an unusable value.
    pub fn aggregate_records(&self, records: &[RawRecord]) -> Result<Vec<AggregateRow>, SchemaError> {
        let columns = self.columns();
        let rows = normalize_all(records, &columns)?;
        let summed = aggregate(rows, self.key_fields.len()).map_err(|err| match err {
            SchemaError::NonNumericMeasure { record, .. } => SchemaError::NonNumericMeasure {
                field: self.measure_field.to_string(),
                record,
            },
            other => other,
        })?;
        Ok(summed.into_rows(self.rounding))
    }
}
