#![allow(clippy::doc_markdown)] // Allow brand names like Azure, Prometheus without backticks

//! Prometheus metrics for Azure Enterprise Agreement billing.
//!
//! This crate turns the EA billing API into counter families that a
//! pull-based registry can scrape:
//!
//! - **Balance** - the enrollment balance summary, grouped by billing period
//!   and currency
//! - **Usage** - one day of usage line items, grouped by department, account,
//!   subscription, meter and resource group, with paginated retrieval
//!
//! Every scrape is stateless: records are fetched, text values lower-cased,
//! rows grouped and summed, and the result emitted as one counter family.
//! Any fetch or schema failure fails the scrape.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ea_cost_exporter::{BalanceCollector, ExporterConfig, ScrapeRegistry, UsageCollector};
//!
//! fn main() -> anyhow::Result<()> {
//!     // AZURE_EA_ENROLLMENT and AZURE_EA_TOKEN are required
//!     let config = ExporterConfig::from_env()?;
//!
//!     let mut registry = ScrapeRegistry::new();
//!     registry.register(Box::new(BalanceCollector::new(&config.balance)?))?;
//!     registry.register(Box::new(UsageCollector::new(&config.usage)?))?;
//!
//!     print!("{}", registry.encode()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Describing without scraping
//!
//! [`BillingCollector::describe`] returns descriptors only, so a registry can
//! list metric names and label schemas without calling the billing API.
//!
//! ```rust,ignore
//! for desc in registry.describe() {
//!     println!("{} {:?}", desc.fq_name, desc.variable_labels);
//! }
//! ```
//!
//! ## Testing against a fake API
//!
//! Collectors are generic over [`HttpTransport`]; `with_transport` accepts any
//! implementation, and `CollectorConfig::with_base_url` points the default
//! transport at a local server.

pub mod aggregate;
pub mod api;
pub mod collector;
pub mod config;
pub mod error;

pub use aggregate::{AggregateRow, GroupKey, RecordSchema, Rounding};
pub use api::{EaClient, FieldValue, HttpResponse, HttpTransport, RawRecord, ReqwestTransport};
pub use collector::{BalanceCollector, BillingCollector, ScrapeRegistry, UsageCollector};
pub use config::{CollectorConfig, ExporterConfig, UsageCollectorConfig};
pub use error::{CollectError, ConfigError, FetchError, PaginationError, SchemaError};
