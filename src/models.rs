//! Data models for regional candidates, price quotes, and cross-region products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An unverified product extracted from one region's page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProductCandidate {
    /// Region the page belongs to
    pub region_code: String,
    /// Product name as shown on the page
    pub raw_name: String,
    /// Price text as shown on the page (empty when no price node was found)
    pub raw_price_text: String,
    /// Absolute product URL, if the block had a usable link
    pub link_url: Option<String>,
}

impl RawProductCandidate {
    /// Creates a candidate.
    pub fn new(
        region_code: impl Into<String>,
        raw_name: impl Into<String>,
        raw_price_text: impl Into<String>,
        link_url: Option<String>,
    ) -> Self {
        Self {
            region_code: region_code.into(),
            raw_name: raw_name.into(),
            raw_price_text: raw_price_text.into(),
            link_url,
        }
    }
}

/// A region's price for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Parsed amount; `None` when the price text had no numeric run
    pub amount: Option<Decimal>,
    /// Currency code (USD, GBP, ...)
    pub currency_name: String,
    /// Currency symbol ($, £, ...)
    pub currency_symbol: String,
    /// Original price text
    pub raw_text: String,
}

impl PriceQuote {
    /// Returns true if the quote can take part in numeric comparisons.
    pub fn is_comparable(&self) -> bool {
        self.amount.is_some()
    }

    /// Formats the quote for display, e.g. `£85.00`.
    pub fn display(&self) -> String {
        match self.amount {
            Some(amount) => format!("{}{:.2}", self.currency_symbol, amount),
            None => "N/A".to_string(),
        }
    }
}

/// A product merged across regions by canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Normalized name used as the cross-region key
    pub canonical_name: String,
    /// Raw name of the first candidate seen
    pub display_name: String,
    /// Brand searched
    pub brand: String,
    /// At most one quote per region
    pub prices: BTreeMap<String, PriceQuote>,
    /// Link per priced region (`None` when the block had no link)
    pub links: BTreeMap<String, Option<String>>,
}

impl Product {
    /// Creates a product with no regional entries yet.
    pub fn new(
        canonical_name: impl Into<String>,
        display_name: impl Into<String>,
        brand: impl Into<String>,
    ) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            display_name: display_name.into(),
            brand: brand.into(),
            prices: BTreeMap::new(),
            links: BTreeMap::new(),
        }
    }

    /// Returns the numeric amount for a region, if present and parsed.
    pub fn amount(&self, region_code: &str) -> Option<Decimal> {
        self.prices.get(region_code).and_then(|q| q.amount)
    }

    /// Returns `(region, amount)` for every region with a parsed amount,
    /// in region-code order.
    pub fn comparable_prices(&self) -> Vec<(&str, Decimal)> {
        self.prices
            .iter()
            .filter_map(|(region, quote)| quote.amount.map(|a| (region.as_str(), a)))
            .collect()
    }

    /// Returns true if the region contributed an entry (parsed or not).
    pub fn has_region(&self, region_code: &str) -> bool {
        self.prices.contains_key(region_code)
    }
}

/// Cross-region price statistics for one product.
///
/// Amounts are compared as raw numbers; no currency conversion is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealSummary {
    pub cheapest_region: String,
    pub cheapest_amount: Decimal,
    pub most_expensive_region: String,
    pub most_expensive_amount: Decimal,
    pub savings_amount: Decimal,
    /// Savings relative to the most expensive price, 1 decimal place
    pub savings_percent: Decimal,
    /// Percent above the cheapest price, 2 decimal places
    pub markup_by_region: BTreeMap<String, Decimal>,
    /// True when the compared quotes are not all in one currency
    pub currency_mismatch: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn quote(amount: Option<&str>, currency: &str, symbol: &str) -> PriceQuote {
        PriceQuote {
            amount: amount.map(|a| Decimal::from_str(a).unwrap()),
            currency_name: currency.to_string(),
            currency_symbol: symbol.to_string(),
            raw_text: amount.map(|a| format!("{}{}", symbol, a)).unwrap_or_default(),
        }
    }

    #[test]
    fn test_quote_display() {
        assert_eq!(quote(Some("85"), "GBP", "£").display(), "£85.00");
        assert_eq!(quote(Some("1234.5"), "USD", "$").display(), "$1234.50");
        assert_eq!(quote(None, "USD", "$").display(), "N/A");
    }

    #[test]
    fn test_product_amounts() {
        let mut product = Product::new("running shoe", "Running Shoe", "Acme");
        product.prices.insert("US".to_string(), quote(Some("100"), "USD", "$"));
        product.prices.insert("UK".to_string(), quote(Some("85"), "GBP", "£"));
        product.prices.insert("DE".to_string(), quote(None, "EUR", "€"));

        assert_eq!(product.amount("US"), Some(Decimal::from(100)));
        assert_eq!(product.amount("DE"), None);
        assert_eq!(product.amount("FR"), None);
        assert!(product.has_region("DE"));
        assert!(!product.has_region("FR"));

        let comparable = product.comparable_prices();
        assert_eq!(comparable, vec![("UK", Decimal::from(85)), ("US", Decimal::from(100))]);
    }

    #[test]
    fn test_product_serde() {
        let mut product = Product::new("running shoe", "Running Shoe", "Acme");
        product.prices.insert("US".to_string(), quote(Some("100.00"), "USD", "$"));
        product.links.insert("US".to_string(), None);

        let json = serde_json::to_string(&product).unwrap();
        assert!(json.contains("\"canonical_name\":\"running shoe\""));
        assert!(json.contains("\"amount\":\"100.00\""));
        assert!(json.contains("\"US\":null"));

        let parsed: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, product);
    }
}
