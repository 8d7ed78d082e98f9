//! regional-prices - Compare a brand's prices across regional storefronts
//!
//! Thin CLI over the scrape-and-aggregate pipeline.

use anyhow::Result;
use clap::{Parser, Subcommand};
use regional_prices::commands::CompareCommand;
use regional_prices::config::{Config, OutputFormat};
use regional_prices::format::Formatter;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "regional-prices",
    version,
    about = "Compare a brand's product prices across regional storefronts",
    long_about = "Fetches each configured regional storefront for a brand, extracts product prices, and reports the cheapest region and savings per product."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "RP_PROXY")]
    proxy: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a brand's prices across regions
    #[command(alias = "c")]
    Compare {
        /// Brand name as configured
        brand: String,

        /// Region codes to include (comma-separated, default: all)
        #[arg(short, long, value_delimiter = ',')]
        regions: Vec<String>,

        /// Maximum products per region
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// List configured brands
    Brands,

    /// List a brand's regional storefronts
    Regions {
        /// Brand name as configured
        brand: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Compare { brand, regions, max } => {
            if let Some(max) = max {
                config.max_products_per_region = max;
            }

            let cmd = CompareCommand::new(config);
            let output = cmd.execute(&brand, &regions).await?;
            println!("{}", output);
        }

        Commands::Brands => {
            let formatter = Formatter::new(config.format);
            println!("{}", formatter.format_brands(&config.brands));
        }

        Commands::Regions { brand } => {
            let sites = config.require_brand(&brand)?;
            let formatter = Formatter::new(config.format);
            println!("{}", formatter.format_regions(sites));
        }
    }

    Ok(())
}
