//! Best-effort extractor for arbitrary storefront listing markup.

use super::selectors::{self, BlockMode, ContainerTier};
use super::ExtractionStrategy;
use crate::models::RawProductCandidate;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use tracing::{debug, trace};
use url::Url;

/// Names this short are only used when nothing longer is found.
const MIN_PREFERRED_NAME_LEN: usize = 4;

/// Generic extraction over repeated product blocks.
#[derive(Debug, Clone)]
pub struct GenericExtractor {
    max_candidates: usize,
}

impl GenericExtractor {
    /// Creates an extractor returning at most `max_candidates` per page.
    pub fn new(max_candidates: usize) -> Self {
        Self { max_candidates }
    }

    /// Collects the product blocks of a tier in document order.
    fn blocks<'a>(&self, document: &'a Html, tier: &ContainerTier) -> Vec<ElementRef<'a>> {
        let matches: Vec<ElementRef> = document.select(&tier.selector).collect();

        match tier.mode {
            BlockMode::Outermost => {
                let ids: HashSet<_> = matches.iter().map(|e| e.id()).collect();
                matches
                    .into_iter()
                    .filter(|e| !e.ancestors().any(|a| ids.contains(&a.id())))
                    .collect()
            }
            BlockMode::Loose => {
                let named: Vec<(ElementRef, bool)> = matches
                    .into_iter()
                    .filter(|e| extract_name(*e).is_some())
                    .map(|e| (e, has_price_node(e)))
                    .collect();

                let priced: HashSet<_> =
                    named.iter().filter(|(_, p)| *p).map(|(e, _)| e.id()).collect();
                let innermost: HashSet<_> = named
                    .iter()
                    .filter(|(e, p)| {
                        *p && !e.descendants().skip(1).any(|d| priced.contains(&d.id()))
                    })
                    .map(|(e, _)| e.id())
                    .collect();
                let unpriced: HashSet<_> =
                    named.iter().filter(|(_, p)| !*p).map(|(e, _)| e.id()).collect();

                // sold-out tiles have no price node; keep them unless they sit
                // inside a kept block or another unpriced one
                named
                    .into_iter()
                    .filter(|(e, p)| {
                        if *p {
                            innermost.contains(&e.id())
                        } else {
                            !e.ancestors()
                                .any(|a| innermost.contains(&a.id()) || unpriced.contains(&a.id()))
                        }
                    })
                    .map(|(e, _)| e)
                    .collect()
            }
        }
    }

    /// Turns one block into a candidate, or `None` for an unusable fragment.
    fn extract_block(
        &self,
        block: ElementRef,
        region_code: &str,
        base: Option<&Url>,
    ) -> Option<RawProductCandidate> {
        let raw_name = extract_name(block)?;
        let raw_price_text = extract_price_text(block).unwrap_or_default();
        let link_url = extract_link(block, base);

        Some(RawProductCandidate {
            region_code: region_code.to_string(),
            raw_name,
            raw_price_text,
            link_url,
        })
    }
}

impl ExtractionStrategy for GenericExtractor {
    fn extract(&self, html: &str, region_code: &str, page_url: &str) -> Vec<RawProductCandidate> {
        let document = Html::parse_document(html);
        let base = Url::parse(page_url).ok();

        for tier in selectors::CONTAINER_TIERS.iter() {
            let blocks = self.blocks(&document, tier);
            if blocks.is_empty() {
                continue;
            }

            let mut candidates = Vec::new();
            for block in blocks {
                if candidates.len() >= self.max_candidates {
                    break;
                }
                match self.extract_block(block, region_code, base.as_ref()) {
                    Some(candidate) => {
                        trace!("Candidate: {} - {:?}", candidate.raw_name, candidate.raw_price_text);
                        candidates.push(candidate);
                    }
                    None => trace!("Skipping block without a name"),
                }
            }

            if !candidates.is_empty() {
                debug!(
                    "{}: {} candidates using selector {}",
                    region_code,
                    candidates.len(),
                    tier.source
                );
                return candidates;
            }
        }

        debug!("{}: no product blocks detected", region_code);
        Vec::new()
    }
}

/// Collapses runs of whitespace into single spaces.
fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef) -> String {
    collapse(&element.text().collect::<String>())
}

/// Finds the block's name, preferring texts longer than three characters.
fn extract_name(block: ElementRef) -> Option<String> {
    let mut fallback = None;

    for selector in selectors::NAME.iter() {
        let Some(node) = block.select(selector).next() else {
            continue;
        };
        let text = element_text(node);
        if text.chars().count() >= MIN_PREFERRED_NAME_LEN {
            return Some(text);
        }
        if fallback.is_none() && !text.is_empty() {
            fallback = Some(text);
        }
    }

    fallback
}

fn has_price_node(block: ElementRef) -> bool {
    selectors::PRICE.iter().any(|s| block.select(s).next().is_some())
}

/// Finds the first non-empty price text, falling back to `data-price`.
fn extract_price_text(block: ElementRef) -> Option<String> {
    for selector in selectors::PRICE.iter() {
        for node in block.select(selector) {
            let text = element_text(node);
            if !text.is_empty() {
                return Some(text);
            }
            if let Some(value) = node.value().attr(selectors::PRICE_ATTR) {
                if !value.trim().is_empty() {
                    return Some(value.trim().to_string());
                }
            }
        }
    }
    None
}

/// Resolves the block's link against the page URL.
fn extract_link(block: ElementRef, base: Option<&Url>) -> Option<String> {
    let own = (block.value().name() == "a").then(|| block.value().attr("href")).flatten();
    let href = own
        .or_else(|| block.select(&selectors::LINK).next().and_then(|a| a.value().attr("href")))?
        .trim();

    if href.is_empty() || href.starts_with('#') || href.to_lowercase().starts_with("javascript:") {
        return None;
    }

    match base {
        Some(base) => base.join(href).ok().map(String::from),
        None => Url::parse(href).ok().map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://shop.example.com/us/search?q=acme";

    fn extract(html: &str) -> Vec<RawProductCandidate> {
        GenericExtractor::new(10).extract(html, "US", PAGE)
    }

    #[test]
    fn test_extract_product_cards() {
        let html = r#"
            <html><body>
                <div class="product-card">
                    <a href="/p/running-shoe"><h2>Running Shoe</h2></a>
                    <span class="price">$100.00</span>
                </div>
                <div class="product-card">
                    <a href="https://shop.example.com/p/trail-shoe"><h2>Trail   Shoe</h2></a>
                    <span class="product-price">$120.00</span>
                </div>
            </body></html>
        "#;

        let candidates = extract(html);
        assert_eq!(candidates.len(), 2);

        assert_eq!(candidates[0].region_code, "US");
        assert_eq!(candidates[0].raw_name, "Running Shoe");
        assert_eq!(candidates[0].raw_price_text, "$100.00");
        assert_eq!(
            candidates[0].link_url.as_deref(),
            Some("https://shop.example.com/p/running-shoe")
        );

        assert_eq!(candidates[1].raw_name, "Trail Shoe");
        assert_eq!(candidates[1].raw_price_text, "$120.00");
    }

    #[test]
    fn test_extract_missing_price_kept() {
        let html = r#"
            <div class="product-item"><h3>Align Pant</h3><a href="align">View</a></div>
        "#;

        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].raw_name, "Align Pant");
        assert_eq!(candidates[0].raw_price_text, "");
        assert_eq!(candidates[0].link_url.as_deref(), Some("https://shop.example.com/us/align"));
    }

    #[test]
    fn test_extract_missing_link_kept() {
        let html = r#"
            <div class="product-item"><h2>Define Jacket</h2><p class="price">£98</p></div>
            <div class="product-item"><h2>Swiftly Tee</h2><a href="javascript:void(0)">x</a></div>
            <div class="product-item"><h2>Scuba Hoodie</h2><a href="#">x</a></div>
        "#;

        let candidates = extract(html);
        assert_eq!(candidates.len(), 3);
        assert!(candidates.iter().all(|c| c.link_url.is_none()));
    }

    #[test]
    fn test_extract_block_itself_is_link() {
        let html = r#"
            <a class="product-card" href="/p/1"><h2>Card Link Product</h2><span class="price">$5</span></a>
        "#;
        let candidates = extract(html);
        assert_eq!(candidates[0].link_url.as_deref(), Some("https://shop.example.com/p/1"));
    }

    #[test]
    fn test_extract_skips_nameless_fragment() {
        let html = r#"
            <div class="product-card"><span class="price">$10</span></div>
            <div class="product-card"><h2>Named Product</h2><span class="price">$20</span></div>
        "#;

        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].raw_name, "Named Product");
    }

    #[test]
    fn test_extract_short_name_fallback() {
        let html = r#"
            <div class="product-card"><h2>Tee</h2><span class="price">$20</span></div>
            <div class="product-card"><h2>New</h2><span class="product-name">Fast and Free Tee</span></div>
        "#;

        let candidates = extract(html);
        assert_eq!(candidates[0].raw_name, "Tee");
        assert_eq!(candidates[1].raw_name, "Fast and Free Tee");
    }

    #[test]
    fn test_extract_data_price_attribute() {
        let html = r#"
            <div class="product-card"><h2>Everywhere Belt Bag</h2><span data-price="38.00"></span></div>
        "#;
        let candidates = extract(html);
        assert_eq!(candidates[0].raw_price_text, "38.00");
    }

    #[test]
    fn test_extract_cap_in_document_order() {
        let mut html = String::from("<html><body>");
        for i in 1..=8 {
            html.push_str(&format!(
                r#"<div data-product="{i}"><h2>Product Number {i}</h2><span class="price">${i}0</span></div>"#
            ));
        }
        html.push_str("</body></html>");

        let candidates = GenericExtractor::new(3).extract(&html, "US", PAGE);
        let names: Vec<_> = candidates.iter().map(|c| c.raw_name.as_str()).collect();
        assert_eq!(names, vec!["Product Number 1", "Product Number 2", "Product Number 3"]);

        assert!(GenericExtractor::new(0).extract(&html, "US", PAGE).is_empty());
    }

    #[test]
    fn test_extract_tier_priority() {
        // [data-product] wins over .product-card even when it appears later
        let html = r#"
            <div class="product-card"><h2>Card Product</h2><span class="price">$1</span></div>
            <div data-product="x"><h2>Data Product</h2><span class="price">$2</span></div>
        "#;
        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].raw_name, "Data Product");
    }

    #[test]
    fn test_extract_falls_through_empty_tier() {
        // .product-item matches but has no names, so the next tier is used
        let html = r#"
            <div class="product-item"><img src="a.jpg"></div>
            <article class="product"><h2>Article Product</h2><span class="price">$3</span></article>
        "#;
        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].raw_name, "Article Product");
    }

    #[test]
    fn test_extract_nested_containers_outermost() {
        let html = r#"
            <div class="product-card">
                <h2>Outer Product</h2>
                <span class="price">$50</span>
                <div class="product-card"><h2>Inner Swatch</h2></div>
            </div>
        "#;
        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].raw_name, "Outer Product");
    }

    #[test]
    fn test_extract_loose_tier_innermost_priced() {
        let html = r#"
            <body class="product-listing">
                <div class="grid">
                    <div class="product-tile">
                        <div class="product-tile__name">Wunder Train Tight</div>
                        <div class="product-tile__price">$98.00</div>
                    </div>
                    <div class="product-tile">
                        <div class="product-tile__name">Fast and Free Tight</div>
                        <div class="product-tile__price">$128.00</div>
                    </div>
                </div>
            </body>
        "#;

        let candidates = extract(html);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].raw_name, "Wunder Train Tight");
        assert_eq!(candidates[0].raw_price_text, "$98.00");
        assert_eq!(candidates[1].raw_name, "Fast and Free Tight");
    }

    #[test]
    fn test_extract_loose_tier_keeps_unpriced_tile() {
        let html = r#"
            <div class="product-grid">
                <div class="product-tile">
                    <a href="/p/wunder"><span class="product-tile__name">Wunder Train Tight</span></a>
                    <span class="product-tile__price">$98.00</span>
                </div>
                <div class="product-tile product-tile--soldout">
                    <a href="/p/scuba"><span class="product-tile__name">Scuba Hoodie</span></a>
                    <span class="badge">Sold out</span>
                </div>
            </div>
        "#;

        let candidates = extract(html);
        let names: Vec<_> = candidates.iter().map(|c| c.raw_name.as_str()).collect();
        assert_eq!(names, vec!["Wunder Train Tight", "Scuba Hoodie"]);
        assert_eq!(candidates[1].raw_price_text, "");
        assert_eq!(candidates[1].link_url.as_deref(), Some("https://shop.example.com/p/scuba"));
    }

    #[test]
    fn test_extract_malformed_html() {
        let html = r#"
            <div class="product-card"><h2>Broken <b>Markup</h2><span class="price">$10
            <div class="product-card"><h2>Still Parsed</h2><span class="price">$20</span></div>
            <div class="product-card"><h2></h2></div>
        "#;

        let candidates = extract(html);
        assert!(!candidates.is_empty());
        assert_eq!(candidates[0].raw_name, "Broken Markup");
        assert!(candidates.iter().all(|c| !c.raw_name.is_empty()));
    }

    #[test]
    fn test_extract_no_products() {
        assert!(extract("").is_empty());
        assert!(extract("<html><body><p>Nothing here</p></body></html>").is_empty());
        assert!(extract("<<<>>>").is_empty());
    }

    #[test]
    fn test_extract_invalid_page_url() {
        let html = r#"
            <div class="product-card"><h2>Relative Link</h2><a href="/p/1">x</a></div>
            <div class="product-card"><h2>Absolute Link</h2><a href="https://cdn.example.com/p/2">x</a></div>
        "#;
        let candidates = GenericExtractor::new(10).extract(html, "US", "not a url");
        assert_eq!(candidates[0].link_url, None);
        assert_eq!(candidates[1].link_url.as_deref(), Some("https://cdn.example.com/p/2"));
    }
}
