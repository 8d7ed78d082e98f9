//! Regional price comparison command implementation.

use crate::config::Config;
use crate::extract::GenericExtractor;
use crate::fetch::{HttpFetcher, RegionalFetcher};
use crate::format::Formatter;
use crate::pipeline::{RegionalScrapePipeline, ResultCache};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Compares a brand's prices across its configured regions.
pub struct CompareCommand {
    config: Config,
    cache: ResultCache,
}

impl CompareCommand {
    /// Creates a new compare command.
    pub fn new(config: Config) -> Self {
        let cache = ResultCache::new(Duration::from_secs(config.cache_ttl_secs));
        Self { config, cache }
    }

    /// Runs the comparison and returns formatted output.
    pub async fn execute(&self, brand: &str, region_codes: &[String]) -> Result<String> {
        let fetcher = HttpFetcher::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_fetcher(Arc::new(fetcher), brand, region_codes).await
    }

    /// Runs the comparison with a provided fetcher (for testing).
    pub async fn execute_with_fetcher(
        &self,
        fetcher: Arc<dyn RegionalFetcher>,
        brand: &str,
        region_codes: &[String],
    ) -> Result<String> {
        self.config.validate().context("Invalid brand configuration")?;

        let regions = self.config.select_regions(brand, region_codes)?;
        let sites = self.config.brand(brand).map_or(brand, |b| b.name.as_str());
        debug!(
            "Selected regions for {}: {}",
            sites,
            regions.iter().map(|r| r.region_code.as_str()).collect::<Vec<_>>().join(", ")
        );

        let extractor = GenericExtractor::new(self.config.max_products_per_region);
        let pipeline = RegionalScrapePipeline::new(fetcher, Box::new(extractor));
        let result = pipeline.run_cached(sites, &regions, Some(&self.cache)).await?;

        info!(
            "Compared {} products for {} ({} failed regions)",
            result.products.len(),
            result.brand,
            result.failures.len()
        );

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_result(&result))
    }
}
