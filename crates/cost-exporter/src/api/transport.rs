//! HTTP capability used by the billing client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::FetchError;

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking `GET` with headers and a per-request timeout.
///
/// Implementations must not retry; a timed out request is reported as
/// [`FetchError::Timeout`].
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or timeout. Non-success statuses are
    /// returned as a normal [`HttpResponse`].
    fn get(
        &self,
        url: &str,
        headers: &[(&str, String)],
        timeout: Duration,
    ) -> Result<HttpResponse, FetchError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn get(
        &self,
        url: &str,
        headers: &[(&str, String)],
        timeout: Duration,
    ) -> Result<HttpResponse, FetchError> {
        (**self).get(url, headers, timeout)
    }
}

/// [`HttpTransport`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the exporter's user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("ea-cost-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Http)?;

        Ok(Self { client })
    }

    fn classify(url: &str, timeout: Duration, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else {
            FetchError::Http(err)
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(
        &self,
        url: &str,
        headers: &[(&str, String)],
        timeout: Duration,
    ) -> Result<HttpResponse, FetchError> {
        let mut request = self.client.get(url).timeout(timeout);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request
            .send()
            .map_err(|e| Self::classify(url, timeout, e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| Self::classify(url, timeout, e))?;

        Ok(HttpResponse { status, body })
    }
}
