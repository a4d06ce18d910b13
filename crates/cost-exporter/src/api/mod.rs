//! Enterprise Agreement billing API access.
//!
//! - `transport` - the blocking HTTP capability and its `reqwest` implementation
//! - `models` - raw records and response documents
//! - `client` - balance-summary retrieval and paginated usage-detail retrieval

mod client;
mod models;
mod transport;

pub use client::EaClient;
pub use models::{ApiError, ApiErrorDetails, FieldValue, RawRecord, UsagePage};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

#[cfg(test)]
pub(crate) use client::tests as test_support;
