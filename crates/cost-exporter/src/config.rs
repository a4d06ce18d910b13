//! Collector configuration.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::ConfigError;

/// Default billing API root.
pub const DEFAULT_BASE_URL: &str = "https://consumption.azure.com/v3";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default bound on usage pages followed in one scrape.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Default metric name for the balance collector.
pub const DEFAULT_BALANCE_METRIC: &str = "azure_ea_balance";

/// Default metric name for the usage collector.
pub const DEFAULT_USAGE_METRIC: &str = "azure_ea_usage_cost";

/// Billing period format accepted on the wire and in configuration.
pub const BILLING_PERIOD_FORMAT: &str = "%Y-%m-%d";

/// Settings shared by both collectors.
#[derive(Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Name of the emitted counter family.
    pub metric_name: String,
    /// Enterprise Agreement enrollment number.
    pub enrollment: String,
    /// API access key generated in the EA portal.
    pub token: String,
    /// Timeout applied to every request.
    pub timeout: Duration,
    /// Billing API root, without trailing slash.
    pub base_url: String,
    /// Maximum number of usage pages followed per scrape.
    pub max_pages: usize,
}

impl fmt::Debug for CollectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorConfig")
            .field("metric_name", &self.metric_name)
            .field("enrollment", &self.enrollment)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

impl CollectorConfig {
    /// Create a configuration with default timeout, endpoint and page bound.
    pub fn new(
        metric_name: impl Into<String>,
        enrollment: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            metric_name: metric_name.into(),
            enrollment: enrollment.into(),
            token: token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the page bound.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Check that the configuration can be used to talk to the API.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty enrollment, token or base URL, a zero
    /// timeout, or a zero page bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enrollment.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "enrollment",
                reason: "must not be empty".to_string(),
            });
        }
        if self.token.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "token",
                reason: "must not be empty".to_string(),
            });
        }
        if self.base_url.is_empty() {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_pages == 0 {
            return Err(ConfigError::Invalid {
                field: "max_pages",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Usage collector settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageCollectorConfig {
    /// Shared settings.
    pub collector: CollectorConfig,
    /// Fixed billing day; `None` means the current local date at each scrape.
    pub billing_period: Option<NaiveDate>,
}

impl UsageCollectorConfig {
    /// Usage settings that follow the current date.
    #[must_use]
    pub fn new(collector: CollectorConfig) -> Self {
        Self {
            collector,
            billing_period: None,
        }
    }

    /// Pin the billing period.
    #[must_use]
    pub fn with_billing_period(mut self, period: NaiveDate) -> Self {
        self.billing_period = Some(period);
        self
    }
}

/// Parse a `YYYY-MM-DD` billing period.
///
/// # Errors
///
/// Returns an error if the value is not a calendar date in that form.
pub fn parse_billing_period(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), BILLING_PERIOD_FORMAT).map_err(|e| {
        ConfigError::Invalid {
            field: "billing_period",
            reason: format!("'{value}' is not YYYY-MM-DD: {e}"),
        }
    })
}

/// Configuration for both collectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    /// Balance-summary collector.
    pub balance: CollectorConfig,
    /// Usage-detail collector.
    pub usage: UsageCollectorConfig,
}

impl ExporterConfig {
    /// Create configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `AZURE_EA_ENROLLMENT`: Enterprise Agreement enrollment number
    /// - `AZURE_EA_TOKEN`: API access key
    ///
    /// # Optional Environment Variables
    /// - `AZURE_EA_TIMEOUT_SECS`: Request timeout (default: 30)
    /// - `AZURE_EA_BASE_URL`: API root (default: <https://consumption.azure.com/v3>)
    /// - `AZURE_EA_MAX_PAGES`: Usage page bound (default: 1000)
    /// - `AZURE_EA_BILLING_PERIOD`: Usage day as `YYYY-MM-DD` (default: today)
    /// - `AZURE_EA_BALANCE_METRIC`: Balance metric name (default: `azure_ea_balance`)
    /// - `AZURE_EA_USAGE_METRIC`: Usage metric name (default: `azure_ea_usage_cost`)
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ExporterConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let enrollment = lookup("AZURE_EA_ENROLLMENT")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("AZURE_EA_ENROLLMENT"))?;
        let token = lookup("AZURE_EA_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("AZURE_EA_TOKEN"))?;

        let timeout_secs = match lookup("AZURE_EA_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                field: "timeout",
                reason: format!("'{raw}': {e}"),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let max_pages = match lookup("AZURE_EA_MAX_PAGES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::Invalid {
                    field: "max_pages",
                    reason: format!("'{raw}': {e}"),
                })?,
            None => DEFAULT_MAX_PAGES,
        };

        let base_url = lookup("AZURE_EA_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let billing_period = lookup("AZURE_EA_BILLING_PERIOD")
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_billing_period(&v))
            .transpose()?;

        let balance_metric = lookup("AZURE_EA_BALANCE_METRIC")
            .unwrap_or_else(|| DEFAULT_BALANCE_METRIC.to_string());
        let usage_metric =
            lookup("AZURE_EA_USAGE_METRIC").unwrap_or_else(|| DEFAULT_USAGE_METRIC.to_string());

        let shared = |metric: String| {
            CollectorConfig::new(metric, enrollment.clone(), token.clone())
                .with_timeout(Duration::from_secs(timeout_secs))
                .with_base_url(base_url.clone())
                .with_max_pages(max_pages)
        };

        let balance = shared(balance_metric);
        balance.validate()?;

        let usage = UsageCollectorConfig {
            collector: shared(usage_metric),
            billing_period,
        };
        usage.collector.validate()?;

        Ok(Self { balance, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = ExporterConfig::from_lookup(lookup(&[
            ("AZURE_EA_ENROLLMENT", "123456"),
            ("AZURE_EA_TOKEN", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.balance.metric_name, DEFAULT_BALANCE_METRIC);
        assert_eq!(config.usage.collector.metric_name, DEFAULT_USAGE_METRIC);
        assert_eq!(config.balance.enrollment, "123456");
        assert_eq!(config.balance.timeout, Duration::from_secs(30));
        assert_eq!(config.balance.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.usage.collector.max_pages, DEFAULT_MAX_PAGES);
        assert!(config.usage.billing_period.is_none());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ExporterConfig::from_lookup(lookup(&[
            ("AZURE_EA_ENROLLMENT", "123456"),
            ("AZURE_EA_TOKEN", "secret"),
            ("AZURE_EA_TIMEOUT_SECS", "5"),
            ("AZURE_EA_BASE_URL", "http://localhost:8080/v3/"),
            ("AZURE_EA_MAX_PAGES", "7"),
            ("AZURE_EA_BILLING_PERIOD", "2017-04-30"),
            ("AZURE_EA_USAGE_METRIC", "ea_cost"),
        ]))
        .unwrap();

        assert_eq!(config.usage.collector.timeout, Duration::from_secs(5));
        assert_eq!(config.usage.collector.base_url, "http://localhost:8080/v3");
        assert_eq!(config.usage.collector.max_pages, 7);
        assert_eq!(config.usage.collector.metric_name, "ea_cost");
        assert_eq!(
            config.usage.billing_period,
            NaiveDate::from_ymd_opt(2017, 4, 30)
        );
    }

    #[test]
    fn test_from_lookup_missing_token() {
        let err = ExporterConfig::from_lookup(lookup(&[("AZURE_EA_ENROLLMENT", "123456")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("AZURE_EA_TOKEN"));
    }

    #[test]
    fn test_from_lookup_rejects_zero_timeout() {
        let err = ExporterConfig::from_lookup(lookup(&[
            ("AZURE_EA_ENROLLMENT", "123456"),
            ("AZURE_EA_TOKEN", "secret"),
            ("AZURE_EA_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "timeout", .. }));
    }

    #[test]
    fn test_parse_billing_period() {
        assert_eq!(
            parse_billing_period("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_billing_period("2023-02-29").is_err());
        assert!(parse_billing_period("29/02/2024").is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = CollectorConfig::new("azure_ea_balance", "123456", "super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
