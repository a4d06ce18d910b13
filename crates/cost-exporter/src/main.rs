//! EA cost exporter CLI - one-shot scrape of Azure Enterprise Agreement billing.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ea_cost_exporter::config::parse_billing_period;
use ea_cost_exporter::{BalanceCollector, ExporterConfig, ScrapeRegistry, UsageCollector};

/// Scrape Azure Enterprise Agreement billing into Prometheus text format.
#[derive(Parser)]
#[command(name = "ea-cost-exporter")]
#[command(about = "Azure Enterprise Agreement billing exporter")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape the billing API once and print the exposition to stdout
    Scrape {
        /// Collectors to run
        #[arg(long, value_enum, default_value = "all")]
        collector: Which,

        /// Usage day as YYYY-MM-DD (overrides AZURE_EA_BILLING_PERIOD)
        #[arg(long)]
        billing_period: Option<String>,
    },

    /// Print metric names, label schemas and help text without scraping
    Describe {
        /// Collectors to describe
        #[arg(long, value_enum, default_value = "all")]
        collector: Which,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Which {
    All,
    Balance,
    Usage,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays a clean exposition
    let filter = if cli.verbose {
        EnvFilter::new("ea_cost_exporter=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ea_cost_exporter=info,warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = ExporterConfig::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Scrape {
            collector,
            billing_period,
        } => {
            if let Some(raw) = billing_period {
                config.usage.billing_period = Some(parse_billing_period(&raw)?);
            }
            let registry = build_registry(&config, collector)?;
            tracing::info!(
                enrollment = %config.balance.enrollment,
                collectors = registry.len(),
                "Starting scrape"
            );
            let text = registry.encode().context("Scrape failed")?;
            print!("{text}");
            Ok(())
        }
        Commands::Describe { collector } => {
            let registry = build_registry(&config, collector)?;
            for desc in registry.describe() {
                println!("# HELP {} {}", desc.fq_name, desc.help);
                println!("# TYPE {} counter", desc.fq_name);
                println!("# LABELS {} {}", desc.fq_name, desc.variable_labels.join(","));
            }
            Ok(())
        }
    }
}

fn build_registry(config: &ExporterConfig, which: Which) -> Result<ScrapeRegistry> {
    let mut registry = ScrapeRegistry::new();

    if matches!(which, Which::All | Which::Balance) {
        let balance = BalanceCollector::new(&config.balance)
            .context("Failed to create balance collector")?;
        registry.register(Box::new(balance))?;
    }
    if matches!(which, Which::All | Which::Usage) {
        let usage =
            UsageCollector::new(&config.usage).context("Failed to create usage collector")?;
        registry.register(Box::new(usage))?;
    }

    Ok(registry)
}
