//! Billing API wire types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

// ============================================================================
// Records
// ============================================================================

/// One billing line item or balance entry, exactly as the API returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Look up a field by its API name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Number of fields in the record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// A grouping or measure value pulled out of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// Textual value.
    Text(String),
    /// Numeric value, kept in its JSON spelling.
    Number(Number),
    /// JSON `null`.
    Null,
}

impl FieldValue {
    /// Convert a JSON value, returning the JSON kind name for shapes that
    /// cannot be a grouping or measure value.
    ///
    /// # Errors
    ///
    /// Returns the kind (`"boolean"`, `"array"`, `"object"`) when the value is
    /// not a string, number or null.
    pub fn from_json(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::String(text) => Ok(Self::Text(text.clone())),
            Value::Number(number) => Ok(Self::Number(number.clone())),
            Value::Null => Ok(Self::Null),
            Value::Bool(_) => Err("boolean"),
            Value::Array(_) => Err("array"),
            Value::Object(_) => Err("object"),
        }
    }

    /// Lower-case textual values; numbers and null are returned unchanged.
    #[must_use]
    pub fn lowercased(self) -> Self {
        match self {
            Self::Text(text) => Self::Text(text.to_lowercase()),
            other => other,
        }
    }

    /// Numeric view used when summing measures.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => number.as_f64(),
            Self::Text(_) | Self::Null => None,
        }
    }

    /// Label value for metric exposition.
    #[must_use]
    pub fn label_value(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
            Self::Null => String::new(),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// One page of the usage-detail endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsagePage {
    /// Usage line items on this page.
    pub data: Vec<RawRecord>,
    /// URL of the next page, absent or null on the last one.
    #[serde(default)]
    pub next_link: Option<String>,
}

/// Error document returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Error details.
    pub error: ApiErrorDetails,
}

/// Error details from the billing API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetails {
    /// Human readable message.
    pub message: String,
}
