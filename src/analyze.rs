//! Cross-region deal analysis and market statistics.

use crate::models::{DealSummary, Product};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Computes the cheapest / most expensive regions for a product.
///
/// Returns `None` unless at least two regions carry a parsed amount.
/// Amounts are compared as plain numbers; `currency_mismatch` is set when
/// the compared quotes do not share one currency.
pub fn analyze(product: &Product) -> Option<DealSummary> {
    let prices = product.comparable_prices();
    if prices.len() < 2 {
        return None;
    }

    // prices iterate in region-code order, strict comparisons keep the
    // lexically first region on ties
    let (mut cheapest_region, mut cheapest_amount) = prices[0];
    let (mut dearest_region, mut dearest_amount) = prices[0];
    for &(region, amount) in &prices[1..] {
        if amount < cheapest_amount {
            cheapest_region = region;
            cheapest_amount = amount;
        }
        if amount > dearest_amount {
            dearest_region = region;
            dearest_amount = amount;
        }
    }

    let savings_amount = dearest_amount - cheapest_amount;
    let savings_percent = percent_of(savings_amount, dearest_amount)
        .map(|p| round(p, 1))
        .unwrap_or(Decimal::ZERO);

    let mut markup_by_region = BTreeMap::new();
    if !cheapest_amount.is_zero() {
        for &(region, amount) in &prices {
            if let Some(markup) = percent_of(amount - cheapest_amount, cheapest_amount) {
                markup_by_region.insert(region.to_string(), round(markup, 2));
            }
        }
    }

    let currencies: BTreeSet<&str> = product
        .prices
        .values()
        .filter(|q| q.is_comparable())
        .map(|q| q.currency_name.as_str())
        .collect();

    Some(DealSummary {
        cheapest_region: cheapest_region.to_string(),
        cheapest_amount,
        most_expensive_region: dearest_region.to_string(),
        most_expensive_amount: dearest_amount,
        savings_amount,
        savings_percent,
        markup_by_region,
        currency_mismatch: currencies.len() > 1,
    })
}

fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    part.checked_div(whole)?.checked_mul(HUNDRED)
}

fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Summary statistics over one run's products.
///
/// This is the aggregate-only view handed to downstream commentary; it never
/// carries raw page content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketStats {
    pub products_found: usize,
    /// Distinct regions that priced at least one product
    pub regions_found: usize,
    /// Products with a deal summary (two or more parsed prices)
    pub comparable_products: usize,
    pub avg_price: Option<Decimal>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// How many times each region was the cheapest
    pub cheapest_region_counts: BTreeMap<String, usize>,
}

impl MarketStats {
    pub fn from_products(products: &[Product]) -> Self {
        let mut regions = BTreeSet::new();
        let mut amounts = Vec::new();
        let mut stats = MarketStats {
            products_found: products.len(),
            ..Default::default()
        };

        for product in products {
            for (region, amount) in product.comparable_prices() {
                regions.insert(region);
                amounts.push(amount);
            }
            if let Some(deal) = analyze(product) {
                stats.comparable_products += 1;
                *stats.cheapest_region_counts.entry(deal.cheapest_region).or_insert(0) += 1;
            }
        }

        stats.regions_found = regions.len();
        stats.min_price = amounts.iter().min().copied();
        stats.max_price = amounts.iter().max().copied();
        // page text can parse to values near Decimal::MAX; an unrepresentable
        // total or an empty set leaves the average unset
        stats.avg_price = amounts
            .iter()
            .try_fold(Decimal::ZERO, |total, amount| total.checked_add(*amount))
            .and_then(|total| total.checked_div(Decimal::from(amounts.len())))
            .map(|avg| round(avg, 2));

        stats
    }
}
