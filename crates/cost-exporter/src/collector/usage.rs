//! Usage-detail collector.

use chrono::{Local, NaiveDate};
use prometheus::core::Desc;
use prometheus::proto::MetricFamily;
use tracing::{debug, instrument, warn};

use super::family::{build_counter_family, counter_desc};
use super::traits::BillingCollector;
use crate::aggregate::{RecordSchema, Rounding};
use crate::api::{EaClient, HttpTransport, ReqwestTransport};
use crate::config::UsageCollectorConfig;
use crate::error::CollectError;

/// Grouping columns of a usage line item, in label order.
pub const USAGE_KEY_FIELDS: &[&str] = &[
    "departmentName",
    "accountName",
    "subscriptionName",
    "meterCategory",
    "meterSubCategory",
    "meterName",
    "meterRegion",
    "resourceGroup",
];

/// Usage line items are summed on `cost`; each sum is emitted as the nearest
/// integer.
pub const USAGE_SCHEMA: RecordSchema = RecordSchema {
    key_fields: USAGE_KEY_FIELDS,
    measure_field: "cost",
    rounding: Rounding::HalfEven,
};

/// Emits one billing day's usage cost per department, account, subscription,
/// meter and resource group.
#[derive(Debug)]
pub struct UsageCollector<T = ReqwestTransport> {
    client: EaClient<T>,
    desc: Desc,
    billing_period: Option<NaiveDate>,
}

impl UsageCollector<ReqwestTransport> {
    /// Create a collector that talks to the billing API over HTTPS.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built, the settings fail
    /// validation, or the metric name is invalid.
    pub fn new(config: &UsageCollectorConfig) -> Result<Self, CollectError> {
        Self::with_transport(ReqwestTransport::new()?, config)
    }
}

impl<T: HttpTransport> UsageCollector<T> {
    /// Create a collector over a custom transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings fail validation or the metric name is
    /// invalid.
    pub fn with_transport(
        transport: T,
        config: &UsageCollectorConfig,
    ) -> Result<Self, CollectError> {
        let shared = &config.collector;
        shared.validate()?;
        let desc = counter_desc(&shared.metric_name, &shared.enrollment, USAGE_KEY_FIELDS)?;
        Ok(Self {
            client: EaClient::new(transport, shared),
            desc,
            billing_period: config.billing_period,
        })
    }

    /// Day queried by the next scrape.
    #[must_use]
    pub fn billing_period(&self) -> NaiveDate {
        self.billing_period
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

impl<T: HttpTransport> BillingCollector for UsageCollector<T> {
    fn describe(&self) -> Vec<&Desc> {
        vec![&self.desc]
    }

    #[instrument(skip(self), fields(metric = %self.desc.fq_name))]
    fn collect(&self) -> Result<Vec<MetricFamily>, CollectError> {
        let period = self.billing_period();

        let records = self
            .client
            .fetch_usage_details(period)
            .inspect_err(|e| warn!(error = %e, %period, "Usage scrape failed"))?;

        let rows = USAGE_SCHEMA.aggregate_records(&records)?;
        debug!(series = rows.len(), %period, "Usage details aggregated");

        Ok(vec![build_counter_family(&self.desc, &rows)])
    }
}
