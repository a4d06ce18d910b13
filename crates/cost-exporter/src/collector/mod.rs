//! Billing collectors and the registry that scrapes them.
//!
//! - `traits` - the [`BillingCollector`] describe/collect contract
//! - `family` - counter family construction
//! - `balance` - enrollment balance summary
//! - `usage` - per-day usage detail, paginated
//! - `registry` - duplicate-checked registration and text exposition

mod balance;
mod family;
mod registry;
mod traits;
mod usage;

pub use balance::{BalanceCollector, BALANCE_KEY_FIELDS, BALANCE_SCHEMA};
pub use family::{build_counter_family, counter_desc, help_text};
pub use registry::ScrapeRegistry;
pub use traits::BillingCollector;
pub use usage::{UsageCollector, USAGE_KEY_FIELDS, USAGE_SCHEMA};
