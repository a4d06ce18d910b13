//! Enterprise Agreement billing API client.

use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::models::{ApiError, RawRecord, UsagePage};
use super::transport::HttpTransport;
use crate::config::{CollectorConfig, BILLING_PERIOD_FORMAT};
use crate::error::{CollectError, FetchError, PaginationError};

/// Body prefix the usage endpoint sends instead of JSON when the period has
/// no usage. The double quotes are part of the literal.
const NO_USAGE_SENTINEL: &str = "\"Usage Data Extract\"";

/// Longest slice of a non-JSON error body carried into [`FetchError::Api`].
const MAX_ERROR_BODY: usize = 512;

/// Billing API client for one enrollment.
#[derive(Debug, Clone)]
pub struct EaClient<T> {
    transport: T,
    base_url: String,
    enrollment: String,
    token: String,
    timeout: Duration,
    max_pages: usize,
}

impl<T: HttpTransport> EaClient<T> {
    /// Create a client from collector settings.
    pub fn new(transport: T, config: &CollectorConfig) -> Self {
        Self {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            enrollment: config.enrollment.clone(),
            token: config.token.clone(),
            timeout: config.timeout,
            max_pages: config.max_pages,
        }
    }

    /// Enrollment this client queries.
    #[must_use]
    pub fn enrollment(&self) -> &str {
        &self.enrollment
    }

    /// URL of the balance-summary endpoint.
    #[must_use]
    pub fn balance_summary_url(&self) -> String {
        format!(
            "{}/enrollments/{}/balancesummary",
            self.base_url, self.enrollment
        )
    }

    /// URL of the first usage-detail page for a billing day.
    #[must_use]
    pub fn usage_details_url(&self, period: NaiveDate) -> String {
        let day = period.format(BILLING_PERIOD_FORMAT);
        format!(
            "{}/enrollments/{}/usagedetailsbycustomdate?startTime={day}&endTime={day}",
            self.base_url, self.enrollment
        )
    }

    /// Authenticated GET returning the body of a 2xx response.
    fn get(&self, url: &str) -> Result<String, FetchError> {
        info!(url = %url, "Querying billing API");

        let headers = [
            ("Authorization", format!("Bearer {}", self.token)),
            ("Accept", "application/json".to_string()),
        ];
        let response = self.transport.get(url, &headers, self.timeout)?;

        if !response.is_success() {
            let message = match serde_json::from_str::<ApiError>(&response.body) {
                Ok(error) => error.error.message,
                Err(_) => truncate(&response.body, MAX_ERROR_BODY),
            };
            warn!(url = %url, status = response.status, "Billing API returned an error");
            return Err(FetchError::Api {
                status: response.status,
                url: url.to_string(),
                message,
            });
        }

        Ok(response.body)
    }

    /// Fetch the balance summary.
    ///
    /// The endpoint answers with an array of balance entries; a lone object is
    /// treated as a single entry.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a body
    /// that is neither a JSON array nor a JSON object of records.
    #[instrument(skip(self), fields(enrollment = %self.enrollment))]
    pub fn fetch_balance_summary(&self) -> Result<Vec<RawRecord>, FetchError> {
        let url = self.balance_summary_url();
        let body = self.get(&url)?;

        let records: Vec<RawRecord> = match serde_json::from_str::<Value>(&body)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(fields) => Ok(RawRecord::from(fields)),
                    other => Err(FetchError::MalformedBody {
                        url: url.clone(),
                        reason: format!("expected balance entry object, found {}", kind(&other)),
                    }),
                })
                .collect::<Result<_, _>>()?,
            Value::Object(fields) => vec![RawRecord::from(fields)],
            other => {
                return Err(FetchError::MalformedBody {
                    url,
                    reason: format!("expected array of balance entries, found {}", kind(&other)),
                })
            }
        };

        info!(records = records.len(), "Balance summary fetched");
        Ok(records)
    }

    /// Fetch every usage line item for a billing day, following `nextLink`.
    ///
    /// A "no usage data" body on any page means the period has no usage, so
    /// records from earlier pages are dropped.
    ///
    /// # Errors
    ///
    /// Returns a fetch error for any failing page, and a pagination error when
    /// a `nextLink` revisits a URL or the page bound is exceeded.
    #[instrument(skip(self), fields(enrollment = %self.enrollment))]
    pub fn fetch_usage_details(&self, period: NaiveDate) -> Result<Vec<RawRecord>, CollectError> {
        let mut url = self.usage_details_url(period);
        let mut visited: HashSet<String> = HashSet::new();
        let mut records = Vec::new();
        let mut pages = 0usize;

        loop {
            if pages >= self.max_pages {
                return Err(PaginationError::PageLimit {
                    limit: self.max_pages,
                }
                .into());
            }
            if !visited.insert(url.clone()) {
                return Err(PaginationError::Cycle {
                    url,
                    page: pages + 1,
                }
                .into());
            }

            let body = self.get(&url)?;
            pages += 1;

            if is_no_usage_sentinel(&body) {
                info!(
                    page = pages,
                    discarded = records.len(),
                    "No usage data extract for period"
                );
                return Ok(Vec::new());
            }

            let page = parse_usage_page(&url, &body)?;
            debug!(page = pages, entries = page.data.len(), "Usage page fetched");
            records.extend(page.data);

            match page.next_link.filter(|link| !link.trim().is_empty()) {
                Some(next) => url = next,
                None => break,
            }
        }

        info!(pages, records = records.len(), "Usage details fetched");
        Ok(records)
    }
}

/// Whether a usage response body is the "no data" sentinel.
pub(crate) fn is_no_usage_sentinel(body: &str) -> bool {
    body.trim_start_matches('\u{feff}')
        .trim_start()
        .starts_with(NO_USAGE_SENTINEL)
}

fn parse_usage_page(url: &str, body: &str) -> Result<UsagePage, FetchError> {
    let value: Value = serde_json::from_str(body)?;
    serde_json::from_value(value).map_err(|e| FetchError::MalformedBody {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
