//! Output formatting for comparison results (table, JSON).

use crate::config::OutputFormat;
use crate::models::Product;
use crate::pipeline::PipelineResult;
use crate::regions::BrandSites;
use serde_json::json;

const NAME_WIDTH: usize = 36;
const PRICE_WIDTH: usize = 12;
const BEST_WIDTH: usize = 6;

/// Formats pipeline output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a comparison result.
    pub fn format_result(&self, result: &PipelineResult) -> String {
        match self.format {
            OutputFormat::Json => self.json_result(result),
            OutputFormat::Table => self.table_result(result),
        }
    }

    /// Formats the configured brand list.
    pub fn format_brands(&self, brands: &[BrandSites]) -> String {
        match self.format {
            OutputFormat::Json => {
                let list: Vec<_> = brands
                    .iter()
                    .map(|b| json!({ "name": b.name, "regions": b.region_codes() }))
                    .collect();
                serde_json::to_string_pretty(&list).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Table => {
                if brands.is_empty() {
                    return "No brands configured.".to_string();
                }
                let mut lines = vec![
                    format!("{:<20} {}", "Brand", "Regions"),
                    format!("{:-<20} {:-<30}", "", ""),
                ];
                for brand in brands {
                    lines.push(format!("{:<20} {}", brand.name, brand.region_codes().join(", ")));
                }
                lines.join("\n")
            }
        }
    }

    /// Formats one brand's regional storefronts.
    pub fn format_regions(&self, brand: &BrandSites) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(brand).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => {
                let mut lines = vec![
                    format!("Regions for {}:\n", brand.name),
                    format!("{:<6} {:<10} {:<6} {}", "Code", "Currency", "Format", "URL"),
                    format!("{:-<6} {:-<10} {:-<6} {:-<40}", "", "", "", ""),
                ];
                for region in &brand.regions {
                    let separator = region.price_format().decimal_separator();
                    lines.push(format!(
                        "{:<6} {:<10} {:<6} {}",
                        region.region_code,
                        format!("{} {}", region.currency_name, region.currency_symbol).trim_end(),
                        format!("0{}00", separator),
                        region.base_url
                    ));
                }
                lines.join("\n")
            }
        }
    }

    // JSON formatting

    fn json_result(&self, result: &PipelineResult) -> String {
        let deals: Vec<_> = result
            .deals()
            .into_iter()
            .map(|(product, deal)| json!({ "product": product.canonical_name, "deal": deal }))
            .collect();

        let value = json!({
            "brand": result.brand,
            "regions": result.regions,
            "products": result.products,
            "deals": deals,
            "failures": result.failures,
            "empty_regions": result.empty_regions,
            "stats": result.stats(),
        });

        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    // Table formatting

    fn table_result(&self, result: &PipelineResult) -> String {
        let mut lines = Vec::new();

        if result.products.is_empty() {
            lines.push(format!("No products found for {}.", result.brand));
        } else {
            let mut header = format!("{:<NAME_WIDTH$}", "Product");
            let mut rule = format!("{:-<NAME_WIDTH$}", "");
            for region in &result.regions {
                header.push_str(&format!("  {:>PRICE_WIDTH$}", region));
                rule.push_str(&format!("  {:->PRICE_WIDTH$}", ""));
            }
            header.push_str(&format!("  {:<BEST_WIDTH$}  {}", "Best", "Savings"));
            rule.push_str(&format!("  {:-<BEST_WIDTH$}  {:-<7}", "", ""));
            lines.push(header);
            lines.push(rule);

            let mut mismatch = false;
            for (product, deal) in result.deals() {
                let mut row = format!("{:<NAME_WIDTH$}", truncate(&product.display_name, NAME_WIDTH));
                for region in &result.regions {
                    row.push_str(&format!("  {:>PRICE_WIDTH$}", price_cell(product, region)));
                }
                match deal {
                    Some(deal) => {
                        mismatch |= deal.currency_mismatch;
                        row.push_str(&format!(
                            "  {:<BEST_WIDTH$}  {}%",
                            deal.cheapest_region, deal.savings_percent
                        ));
                    }
                    None => row.push_str(&format!("  {:<BEST_WIDTH$}  {}", "-", "-")),
                }
                lines.push(row);
            }

            let stats = result.stats();
            lines.push(String::new());
            lines.push(format!(
                "Total: {} products ({} comparable)",
                stats.products_found, stats.comparable_products
            ));
            if mismatch {
                lines.push(
                    "Note: prices in different currencies are compared without conversion."
                        .to_string(),
                );
            }
        }

        if !result.failures.is_empty() {
            lines.push(String::new());
            lines.push("Failed regions:".to_string());
            for failure in &result.failures {
                lines.push(format!("  {}: {}", failure.region_code, failure.reason));
            }
        }

        if !result.empty_regions.is_empty() {
            lines.push(String::new());
            lines.push(format!("No products detected: {}", result.empty_regions.join(", ")));
        }

        lines.join("\n")
    }
}

/// `-` when the region did not list the product, `N/A` when its price was unreadable.
fn price_cell(product: &Product, region: &str) -> String {
    product.prices.get(region).map_or_else(|| "-".to_string(), |quote| quote.display())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width - 3).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchFailure, FetchFailureReason};
    use crate::models::PriceQuote;
    use crate::regions::RegionConfig;
    use rust_decimal::Decimal;

    fn quote(amount: Option<i64>, currency: &str, symbol: &str) -> PriceQuote {
        PriceQuote {
            amount: amount.map(Decimal::from),
            currency_name: currency.to_string(),
            currency_symbol: symbol.to_string(),
            raw_text: String::new(),
        }
    }

    fn make_result() -> PipelineResult {
        let mut shoe = Product::new("running shoe", "Running Shoe", "Acme");
        shoe.prices.insert("US".to_string(), quote(Some(100), "USD", "$"));
        shoe.prices.insert("UK".to_string(), quote(Some(85), "GBP", "£"));
        shoe.links.insert("US".to_string(), Some("https://example.com/us/rs".to_string()));
        shoe.links.insert("UK".to_string(), None);

        let mut cap = Product::new("cap", "Cap", "Acme");
        cap.prices.insert("US".to_string(), quote(None, "USD", "$"));
        cap.links.insert("US".to_string(), None);

        PipelineResult {
            brand: "Acme".to_string(),
            regions: vec!["US".to_string(), "UK".to_string(), "DE".to_string()],
            products: vec![shoe, cap],
            failures: vec![FetchFailure::new("DE", FetchFailureReason::Timeout)],
            empty_regions: Vec::new(),
        }
    }

    #[test]
    fn test_table_result() {
        let output = Formatter::new(OutputFormat::Table).format_result(&make_result());

        assert!(output.contains("Product"));
        assert!(output.contains("Best"));
        assert!(output.contains("Savings"));
        assert!(output.contains("Running Shoe"));
        assert!(output.contains("$100.00"));
        assert!(output.contains("£85.00"));
        assert!(output.contains("15.0%"));
        assert!(output.contains("N/A"));
        assert!(output.contains("Total: 2 products (1 comparable)"));
        assert!(output.contains("Failed regions:"));
        assert!(output.contains("DE: request timed out"));
        assert!(output.contains("compared without conversion"));
    }

    #[test]
    fn test_table_all_failed() {
        let result = PipelineResult {
            brand: "Acme".to_string(),
            regions: vec!["US".to_string(), "UK".to_string()],
            products: Vec::new(),
            failures: vec![
                FetchFailure::new("US", FetchFailureReason::Status(404)),
                FetchFailure::new("UK", FetchFailureReason::Blocked),
            ],
            empty_regions: Vec::new(),
        };

        let output = Formatter::new(OutputFormat::Table).format_result(&result);
        assert!(output.starts_with("No products found for Acme."));
        assert!(output.contains("US: unexpected HTTP status 404"));
        assert!(output.contains("UK: blocked by bot protection"));
    }

    #[test]
    fn test_table_empty_regions() {
        let mut result = make_result();
        result.failures.clear();
        result.empty_regions = vec!["DE".to_string()];

        let output = Formatter::new(OutputFormat::Table).format_result(&result);
        assert!(!output.contains("Failed regions:"));
        assert!(output.contains("No products detected: DE"));
    }

    #[test]
    fn test_table_long_name_truncation() {
        let mut result = make_result();
        result.products[0].display_name =
            "Ultra Lightweight Breathable Everyday Running Shoe With Extra Cushioning".to_string();

        let output = Formatter::new(OutputFormat::Table).format_result(&result);
        assert!(output.contains("Ultra Lightweight Breathable"));
        assert!(output.contains("..."));
        assert!(!output.contains("Extra Cushioning"));
    }

    #[test]
    fn test_json_result() {
        let output = Formatter::new(OutputFormat::Json).format_result(&make_result());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["brand"], "Acme");
        assert_eq!(value["products"].as_array().unwrap().len(), 2);
        assert_eq!(value["deals"][0]["product"], "running shoe");
        assert_eq!(value["deals"][0]["deal"]["cheapest_region"], "UK");
        assert_eq!(value["deals"][0]["deal"]["savings_percent"], "15.0");
        assert!(value["deals"][1]["deal"].is_null());
        assert_eq!(value["failures"][0]["region_code"], "DE");
        assert_eq!(value["failures"][0]["reason"]["kind"], "timeout");
        assert_eq!(value["stats"]["products_found"], 2);
    }

    #[test]
    fn test_result_with_extreme_prices() {
        let mut result = make_result();
        for quote in result.products[0].prices.values_mut() {
            quote.amount = Some(Decimal::MAX);
        }

        let table = Formatter::new(OutputFormat::Table).format_result(&result);
        assert!(table.contains("Total: 2 products (1 comparable)"));

        let json = Formatter::new(OutputFormat::Json).format_result(&result);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["stats"]["avg_price"].is_null());
        assert_eq!(value["stats"]["max_price"], Decimal::MAX.to_string());
    }

    #[test]
    fn test_brands_and_regions() {
        let brand = BrandSites {
            name: "Acme".to_string(),
            regions: vec![
                RegionConfig::new("US", "https://example.com/us?q={brand}", "USD", "$"),
                RegionConfig::new("DE", "https://example.com/de?q={brand}", "EUR", "€"),
            ],
        };

        let table = Formatter::new(OutputFormat::Table);
        let brands = table.format_brands(std::slice::from_ref(&brand));
        assert!(brands.contains("Acme"));
        assert!(brands.contains("US, DE"));
        assert_eq!(table.format_brands(&[]), "No brands configured.");

        let regions = table.format_regions(&brand);
        assert!(regions.contains("Regions for Acme"));
        assert!(regions.contains("EUR €"));
        assert!(regions.contains("0,00"));
        assert!(regions.contains("https://example.com/us?q={brand}"));

        let json = Formatter::new(OutputFormat::Json).format_brands(&[brand]);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["regions"][1], "DE");
    }
}
