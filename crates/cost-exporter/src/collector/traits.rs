//! Collector trait.

use prometheus::core::Desc;
use prometheus::proto::MetricFamily;

use crate::error::CollectError;

/// A billing metric source that can be enumerated and scraped.
///
/// Unlike [`prometheus::core::Collector`], `collect` reports failures so a
/// scrape fails visibly instead of emitting partial data.
pub trait BillingCollector: Send + Sync {
    /// Static metric metadata. Never touches the network.
    fn describe(&self) -> Vec<&Desc>;

    /// Fetch, normalize and aggregate billing data into metric families.
    ///
    /// # Errors
    ///
    /// Returns an error if any request fails, a record is malformed, or
    /// pagination does not terminate.
    fn collect(&self) -> Result<Vec<MetricFamily>, CollectError>;
}
