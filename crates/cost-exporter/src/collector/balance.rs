//! Balance-summary collector.

use prometheus::core::Desc;
use prometheus::proto::MetricFamily;
use tracing::{debug, instrument, warn};

use super::family::{build_counter_family, counter_desc};
use super::traits::BillingCollector;
use crate::aggregate::{RecordSchema, Rounding};
use crate::api::{EaClient, HttpTransport, ReqwestTransport};
use crate::config::CollectorConfig;
use crate::error::CollectError;

/// Grouping columns of a balance-summary entry.
pub const BALANCE_KEY_FIELDS: &[&str] = &["billingPeriodId", "currencyCode"];

/// Balance entries are summed on `totalUsage` and emitted unrounded.
pub const BALANCE_SCHEMA: RecordSchema = RecordSchema {
    key_fields: BALANCE_KEY_FIELDS,
    measure_field: "totalUsage",
    rounding: Rounding::Unrounded,
};

/// Emits the enrollment's balance summary grouped by billing period and
/// currency.
#[derive(Debug)]
pub struct BalanceCollector<T = ReqwestTransport> {
    client: EaClient<T>,
    desc: Desc,
}

impl BalanceCollector<ReqwestTransport> {
    /// Create a collector that talks to the billing API over HTTPS.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built, the settings fail
    /// validation, or the metric name is invalid.
    pub fn new(config: &CollectorConfig) -> Result<Self, CollectError> {
        Self::with_transport(ReqwestTransport::new()?, config)
    }
}

impl<T: HttpTransport> BalanceCollector<T> {
    /// Create a collector over a custom transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings fail validation or the metric name is
    /// invalid.
    pub fn with_transport(transport: T, config: &CollectorConfig) -> Result<Self, CollectError> {
        config.validate()?;
        let desc = counter_desc(&config.metric_name, &config.enrollment, BALANCE_KEY_FIELDS)?;
        Ok(Self {
            client: EaClient::new(transport, config),
            desc,
        })
    }
}

impl<T: HttpTransport> BillingCollector for BalanceCollector<T> {
    fn describe(&self) -> Vec<&Desc> {
        vec![&self.desc]
    }

    #[instrument(skip(self), fields(metric = %self.desc.fq_name))]
    fn collect(&self) -> Result<Vec<MetricFamily>, CollectError> {
        let records = self
            .client
            .fetch_balance_summary()
            .inspect_err(|e| warn!(error = %e, "Balance scrape failed"))?;

        let rows = BALANCE_SCHEMA.aggregate_records(&records)?;
        debug!(series = rows.len(), "Balance summary aggregated");

        Ok(vec![build_counter_family(&self.desc, &rows)])
    }
}
