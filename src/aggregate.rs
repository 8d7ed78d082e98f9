//! Merging of per-region candidates into cross-region products.

use crate::models::{PriceQuote, Product, RawProductCandidate};
use crate::normalize::{canonical_name, parse_price};
use crate::regions::RegionConfig;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Candidates extracted from one region's page.
#[derive(Debug, Clone)]
pub struct RegionCandidates {
    pub region: RegionConfig,
    pub candidates: Vec<RawProductCandidate>,
}

impl RegionCandidates {
    /// Pairs a region with its candidates.
    pub fn new(region: RegionConfig, candidates: Vec<RawProductCandidate>) -> Self {
        Self { region, candidates }
    }
}

/// Builds canonical [`Product`] records for one brand search.
pub struct ProductAggregator {
    brand: String,
}

impl ProductAggregator {
    /// Creates an aggregator for a brand.
    pub fn new(brand: impl Into<String>) -> Self {
        Self { brand: brand.into() }
    }

    /// Merges candidates by canonical name.
    ///
    /// Regions are visited in the given order and candidates in document
    /// order. Products come out in first-seen order. Within one region the
    /// first candidate for a name wins; later duplicates are dropped.
    pub fn aggregate(&self, regions: &[RegionCandidates]) -> Vec<Product> {
        let mut products: Vec<Product> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for entry in regions {
            let region = &entry.region;
            let format = region.price_format();
            let code = region.region_code.as_str();

            for candidate in &entry.candidates {
                let key = canonical_name(&candidate.raw_name);
                if key.is_empty() {
                    debug!("{}: skipping candidate with empty name {:?}", code, candidate.raw_name);
                    continue;
                }

                let slot = *index.entry(key.clone()).or_insert_with(|| {
                    products.push(Product::new(key.clone(), candidate.raw_name.clone(), &self.brand));
                    products.len() - 1
                });
                let product = &mut products[slot];

                if product.has_region(code) {
                    trace!("{}: duplicate '{}' dropped", code, key);
                    continue;
                }

                let quote = PriceQuote {
                    amount: parse_price(&candidate.raw_price_text, format),
                    currency_name: region.currency_name.clone(),
                    currency_symbol: region.currency_symbol.clone(),
                    raw_text: candidate.raw_price_text.clone(),
                };
                if quote.amount.is_none() && !candidate.raw_price_text.is_empty() {
                    debug!("{}: unparseable price {:?} for '{}'", code, candidate.raw_price_text, key);
                }

                product.prices.insert(code.to_string(), quote);
                product.links.insert(code.to_string(), candidate.link_url.clone());
            }
        }

        debug!("Aggregated {} products across {} regions", products.len(), regions.len());
        products
    }
}
