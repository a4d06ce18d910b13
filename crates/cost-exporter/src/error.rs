//! Error types for billing collection.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while talking to the billing API.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    /// API returned a non-success status.
    #[error("API error: {status} from {url} - {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    /// Response body is not valid JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Response body is JSON but not in the expected shape.
    #[error("Malformed response from {url}: {reason}")]
    MalformedBody { url: String, reason: String },
}

/// A fetched record does not fit the collector's column layout.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    /// A required field is absent.
    #[error("record {record} is missing field '{field}'")]
    MissingField { field: String, record: usize },

    /// A field holds a boolean, array or object.
    #[error("record {record} has unexpected {kind} value in field '{field}'")]
    UnexpectedShape {
        field: String,
        record: usize,
        kind: &'static str,
    },

    /// The measure column is text.
    #[error("record {record} has non-numeric measure in field '{field}'")]
    NonNumericMeasure { field: String, record: usize },

    /// A normalized row does not carry the expected number of columns.
    #[error("row {record} has {found} columns, expected {expected}")]
    Arity {
        record: usize,
        expected: usize,
        found: usize,
    },
}

/// The `nextLink` chain did not terminate.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PaginationError {
    /// A page link points back at an already visited URL.
    #[error("nextLink cycle detected at page {page}: {url}")]
    Cycle { url: String, page: usize },

    /// More pages than the configured bound.
    #[error("usage data exceeded {limit} pages")]
    PageLimit { limit: usize },
}

/// Any failure that aborts a scrape.
#[derive(Error, Debug)]
pub enum CollectError {
    /// Billing API request failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A record could not be normalized or aggregated.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Pagination did not terminate.
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    /// Metric descriptor or encoding failure.
    #[error("Metric error: {0}")]
    Metric(#[from] prometheus::Error),

    /// Collector settings rejected at construction.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Invalid or incomplete configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is not present.
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A setting is present but unusable.
    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
