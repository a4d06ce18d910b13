//! Record normalization.

use crate::api::{FieldValue, RawRecord};
use crate::error::SchemaError;

/// Extract `fields` from a record in order, lower-casing textual values.
///
/// `index` is the record's position in the fetched sequence and only feeds
/// error reporting.
///
/// # Errors
///
/// Returns [`SchemaError::MissingField`] when a field is absent and
/// [`SchemaError::UnexpectedShape`] when it holds a boolean, array or object.
pub fn normalize(
    record: &RawRecord,
    fields: &[&str],
    index: usize,
) -> Result<Vec<FieldValue>, SchemaError> {
    fields
        .iter()
        .map(|field| {
            let value = record.get(field).ok_or_else(|| SchemaError::MissingField {
                field: (*field).to_string(),
                record: index,
            })?;
            FieldValue::from_json(value)
                .map(FieldValue::lowercased)
                .map_err(|kind| SchemaError::UnexpectedShape {
                    field: (*field).to_string(),
                    record: index,
                    kind,
                })
        })
        .collect()
}

/// Normalize a whole fetched sequence; the first bad record aborts.
///
/// # Errors
///
/// Same as [`normalize`].
pub fn normalize_all(
    records: &[RawRecord],
    fields: &[&str],
) -> Result<Vec<Vec<FieldValue>>, SchemaError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| normalize(record, fields, index))
        .collect()
}
