//! regional-prices - Compare a brand's product prices across regional storefronts
//!
//! Fetches each region's listing page, extracts product name/price pairs with
//! a generic selector strategy, and merges them into cross-region comparisons.

pub mod aggregate;
pub mod analyze;
pub mod commands;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod format;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod regions;

pub use analyze::{analyze, MarketStats};
pub use config::{Config, ConfigError};
pub use models::{DealSummary, PriceQuote, Product, RawProductCandidate};
pub use pipeline::{PipelineResult, RegionalScrapePipeline, ResultCache};
pub use regions::{BrandSites, PriceFormat, RegionConfig};
