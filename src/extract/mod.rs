//! Product extraction from regional listing pages.
//!
//! Sites are handled through [`ExtractionStrategy`]; new storefronts normally
//! only need configuration, with [`GenericExtractor`] doing the parsing.

pub mod generic;
pub mod selectors;

use crate::models::RawProductCandidate;

pub use generic::GenericExtractor;

/// Turns a listing page into raw per-region product candidates.
pub trait ExtractionStrategy: Send + Sync {
    /// Extracts candidates in document order.
    ///
    /// `page_url` is the URL the page was fetched from and is used to resolve
    /// relative links. An empty result means no products were detected; it is
    /// not an error.
    fn extract(&self, html: &str, region_code: &str, page_url: &str) -> Vec<RawProductCandidate>;
}
