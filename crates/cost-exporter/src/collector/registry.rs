//! Pull-style registry over billing collectors.

use std::collections::HashSet;

use prometheus::core::Desc;
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, TextEncoder};
use tracing::{debug, info};

use super::traits::BillingCollector;
use crate::error::CollectError;

/// Holds collectors and renders their metrics in the text exposition format.
#[derive(Default)]
pub struct ScrapeRegistry {
    collectors: Vec<Box<dyn BillingCollector>>,
    names: HashSet<String>,
}

impl ScrapeRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collector. Only its descriptors are consulted.
    ///
    /// # Errors
    ///
    /// Returns [`prometheus::Error::AlreadyReg`] if one of its metric names is
    /// already registered.
    pub fn register(&mut self, collector: Box<dyn BillingCollector>) -> Result<(), CollectError> {
        let names: Vec<String> = collector
            .describe()
            .iter()
            .map(|desc| desc.fq_name.clone())
            .collect();

        if names.iter().any(|name| self.names.contains(name)) {
            return Err(prometheus::Error::AlreadyReg.into());
        }

        debug!(metrics = ?names, "Registered collector");
        self.names.extend(names);
        self.collectors.push(collector);
        Ok(())
    }

    /// Number of registered collectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// Descriptors of every registered collector, without scraping.
    #[must_use]
    pub fn describe(&self) -> Vec<&Desc> {
        self.collectors.iter().flat_map(|c| c.describe()).collect()
    }

    /// Scrape every collector in registration order.
    ///
    /// # Errors
    ///
    /// The first collector failure aborts the whole gather.
    pub fn gather(&self) -> Result<Vec<MetricFamily>, CollectError> {
        let mut families = Vec::new();
        for collector in &self.collectors {
            families.extend(collector.collect()?);
        }
        info!(families = families.len(), "Scrape complete");
        Ok(families)
    }

    /// Scrape and encode in the Prometheus text format.
    ///
    /// Families without series are omitted from the output, `# HELP` and
    /// `# TYPE` lines included, since the text encoder rejects them. Use
    /// [`ScrapeRegistry::describe`] or [`ScrapeRegistry::gather`] to see a
    /// metric that had no data this scrape.
    ///
    /// # Errors
    ///
    /// Returns any gather failure, or an encoder error.
    pub fn encode(&self) -> Result<String, CollectError> {
        let families: Vec<MetricFamily> = self
            .gather()?
            .into_iter()
            .filter(|family| !family.get_metric().is_empty())
            .collect();

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()).into())
    }

    /// MIME type of [`ScrapeRegistry::encode`] output.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}
