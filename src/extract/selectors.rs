//! CSS selectors for generic product extraction.
//!
//! Brand sites are not under our control, so these target common e-commerce
//! markup rather than any one storefront. When a site defeats them, capture
//! an HTML sample, adjust the lists, and add a test fixture.

use scraper::Selector;
use std::sync::LazyLock;

/// How matches of a container tier are turned into product blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMode {
    /// Explicit product containers; nested matches are ignored.
    Outermost,
    /// Loose substring matches. The innermost named blocks with a price node
    /// count, plus the outermost named blocks without one that lie outside
    /// them.
    Loose,
}

/// A container selector tier.
pub struct ContainerTier {
    pub selector: Selector,
    pub mode: BlockMode,
    pub source: &'static str,
}

fn tier(source: &'static str, mode: BlockMode) -> ContainerTier {
    ContainerTier { selector: Selector::parse(source).unwrap(), mode, source }
}

/// Product container tiers, tried in order until one yields candidates.
pub static CONTAINER_TIERS: LazyLock<Vec<ContainerTier>> = LazyLock::new(|| {
    vec![
        tier("[data-product]", BlockMode::Outermost),
        tier(".product-item", BlockMode::Outermost),
        tier(".product-card", BlockMode::Outermost),
        tier("article.product", BlockMode::Outermost),
        tier("li.product", BlockMode::Outermost),
        tier("[class*='product']", BlockMode::Loose),
    ]
});

/// Name-like nodes, in priority order.
pub static NAME: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "h2",
        "h1",
        "h3",
        "a.product-name",
        ".product-title",
        "[class*='title']",
        "[class*='name']",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

/// Price-like nodes, in priority order.
pub static PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["[class*='price']", "[data-price]"].iter().map(|s| Selector::parse(s).unwrap()).collect()
});

/// Attribute holding a machine-readable price.
pub static PRICE_ATTR: &str = "data-price";

/// Any link with a target.
pub static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
