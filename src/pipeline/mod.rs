//! Fetch → extract → aggregate orchestration for one brand search.

pub mod cache;

use crate::aggregate::{ProductAggregator, RegionCandidates};
use crate::analyze::{analyze, MarketStats};
use crate::config::ConfigError;
use crate::extract::ExtractionStrategy;
use crate::fetch::{FetchFailure, RegionalFetcher};
use crate::models::{DealSummary, Product};
use crate::regions::RegionConfig;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use cache::{CacheKey, ResultCache};

/// Outcome of one brand search.
///
/// Always produced once configuration is valid, even if every region failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub brand: String,
    /// Requested region codes, in configured order
    pub regions: Vec<String>,
    pub products: Vec<Product>,
    /// Regions that could not be fetched
    pub failures: Vec<FetchFailure>,
    /// Regions fetched successfully but with no products detected
    pub empty_regions: Vec<String>,
}

impl PipelineResult {
    /// Pairs each product with its deal summary, if comparable.
    pub fn deals(&self) -> Vec<(&Product, Option<DealSummary>)> {
        self.products.iter().map(|p| (p, analyze(p))).collect()
    }

    pub fn stats(&self) -> MarketStats {
        MarketStats::from_products(&self.products)
    }

    /// True when every requested region was fetched.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs the scrape pipeline. Holds no state between runs.
pub struct RegionalScrapePipeline {
    fetcher: Arc<dyn RegionalFetcher>,
    extractor: Box<dyn ExtractionStrategy>,
}

impl RegionalScrapePipeline {
    pub fn new(fetcher: Arc<dyn RegionalFetcher>, extractor: Box<dyn ExtractionStrategy>) -> Self {
        Self { fetcher, extractor }
    }

    /// Searches a brand across the given regions.
    ///
    /// Region configs are validated before any request is sent; that is the
    /// only error path. Fetches run concurrently, but candidates are
    /// aggregated in the order of `regions`.
    pub async fn run(
        &self,
        brand: &str,
        regions: &[RegionConfig],
    ) -> Result<PipelineResult, ConfigError> {
        let brand = brand.trim();
        validate_run(brand, regions)?;

        info!("Searching {} across {} regions", brand, regions.len());

        let fetches = regions.iter().map(|region| self.fetcher.fetch(region, brand));
        let pages = join_all(fetches).await;

        let mut collected = Vec::with_capacity(regions.len());
        let mut failures = Vec::new();
        let mut empty_regions = Vec::new();

        for (region, page) in regions.iter().zip(pages) {
            match page {
                Ok(html) => {
                    let url = region.url_for(brand);
                    let candidates = self.extractor.extract(&html, &region.region_code, &url);
                    if candidates.is_empty() {
                        info!("{}: no products detected", region.region_code);
                        empty_regions.push(region.region_code.clone());
                    } else {
                        info!("{}: {} candidates", region.region_code, candidates.len());
                    }
                    collected.push(RegionCandidates::new(region.clone(), candidates));
                }
                Err(failure) => {
                    warn!("{}", failure);
                    failures.push(failure);
                }
            }
        }

        let products = ProductAggregator::new(brand).aggregate(&collected);
        info!(
            "{}: {} products, {} failed regions",
            brand,
            products.len(),
            failures.len()
        );

        Ok(PipelineResult {
            brand: brand.to_string(),
            regions: regions.iter().map(|r| r.region_code.clone()).collect(),
            products,
            failures,
            empty_regions,
        })
    }

    /// Like [`run`](Self::run), consulting a caller-owned cache first.
    ///
    /// Only complete results (no failed regions) are stored. Entries are keyed
    /// by region set, so a hit reports `regions` in the order of this call while
    /// products keep the first-seen order of the run that filled the entry.
    pub async fn run_cached(
        &self,
        brand: &str,
        regions: &[RegionConfig],
        cache: Option<&ResultCache>,
    ) -> Result<PipelineResult, ConfigError> {
        let Some(cache) = cache else {
            return self.run(brand, regions).await;
        };

        validate_run(brand, regions)?;
        let key = CacheKey::for_regions(brand, regions);
        if let Some(mut hit) = cache.get(&key) {
            info!("Using cached results for {}", brand.trim());
            hit.regions = regions.iter().map(|r| r.region_code.clone()).collect();
            return Ok(hit);
        }

        let result = self.run(brand, regions).await?;
        if result.is_complete() {
            cache.insert(key, result.clone());
        } else {
            debug!("Not caching partial result for {}", result.brand);
        }
        Ok(result)
    }
}

fn validate_run(brand: &str, regions: &[RegionConfig]) -> Result<(), ConfigError> {
    if brand.is_empty() {
        return Err(ConfigError::EmptyBrandName);
    }
    if regions.is_empty() {
        return Err(ConfigError::NoRegions { brand: brand.to_string() });
    }

    let mut seen = HashSet::new();
    for region in regions {
        region.validate(brand)?;
        if !seen.insert(region.region_code.to_uppercase()) {
            return Err(ConfigError::DuplicateRegion {
                brand: brand.to_string(),
                region: region.region_code.clone(),
            });
        }
    }
    Ok(())
}
