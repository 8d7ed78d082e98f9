//! Regional storefront configuration: URLs, currencies and price conventions.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Placeholder substituted with the URL-encoded brand name.
pub const BRAND_PLACEHOLDER: &str = "{brand}";

/// Decimal/thousands separator convention used by a storefront's price text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceFormat {
    /// `1,234.56`
    DotDecimal,
    /// `1.234,56`
    CommaDecimal,
}

impl PriceFormat {
    /// Returns the conventional format for an ISO currency code.
    pub fn for_currency(currency: &str) -> Self {
        match currency.trim().to_uppercase().as_str() {
            "EUR" | "BRL" | "SEK" | "PLN" | "DKK" | "NOK" | "CZK" | "HUF" | "TRY" | "IDR"
            | "ARS" | "CLP" | "COP" | "VND" | "RUB" | "RON" => PriceFormat::CommaDecimal,
            _ => PriceFormat::DotDecimal,
        }
    }

    /// The character separating whole and fractional units.
    pub fn decimal_separator(&self) -> char {
        match self {
            PriceFormat::DotDecimal => '.',
            PriceFormat::CommaDecimal => ',',
        }
    }
}

impl fmt::Display for PriceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceFormat::DotDecimal => write!(f, "dot_decimal"),
            PriceFormat::CommaDecimal => write!(f, "comma_decimal"),
        }
    }
}

impl FromStr for PriceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot_decimal" | "dot" => Ok(PriceFormat::DotDecimal),
            "comma_decimal" | "comma" => Ok(PriceFormat::CommaDecimal),
            _ => Err(format!("Unknown price format: {}. Use: dot_decimal, comma_decimal", s)),
        }
    }
}

/// One regional storefront of a brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Region code (US, UK, UAE, ...)
    #[serde(rename = "code")]
    pub region_code: String,
    /// Listing page URL, optionally containing `{brand}`
    #[serde(rename = "url")]
    pub base_url: String,
    /// Currency code (USD, GBP, ...)
    #[serde(rename = "currency")]
    pub currency_name: String,
    /// Currency symbol ($, £, ...)
    #[serde(rename = "symbol", default)]
    pub currency_symbol: String,
    /// Explicit price convention; derived from the currency when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_format: Option<PriceFormat>,
}

impl RegionConfig {
    /// Creates a region with the currency's conventional price format.
    pub fn new(
        region_code: impl Into<String>,
        base_url: impl Into<String>,
        currency_name: impl Into<String>,
        currency_symbol: impl Into<String>,
    ) -> Self {
        Self {
            region_code: region_code.into(),
            base_url: base_url.into(),
            currency_name: currency_name.into(),
            currency_symbol: currency_symbol.into(),
            price_format: None,
        }
    }

    /// Overrides the price format.
    pub fn with_price_format(mut self, format: PriceFormat) -> Self {
        self.price_format = Some(format);
        self
    }

    /// Returns the effective price format for this region.
    pub fn price_format(&self) -> PriceFormat {
        self.price_format.unwrap_or_else(|| PriceFormat::for_currency(&self.currency_name))
    }

    /// Builds the listing URL for a brand.
    pub fn url_for(&self, brand: &str) -> String {
        if self.base_url.contains(BRAND_PLACEHOLDER) {
            self.base_url.replace(BRAND_PLACEHOLDER, &urlencoding::encode(brand))
        } else {
            self.base_url.clone()
        }
    }

    /// Returns the Accept-Language header value for this region.
    pub fn accept_language(&self) -> &'static str {
        match self.region_code.to_uppercase().as_str() {
            "UK" | "GB" => "en-GB,en;q=0.9",
            "DE" | "AT" => "de-DE,de;q=0.9,en;q=0.8",
            "FR" => "fr-FR,fr;q=0.9,en;q=0.8",
            "ES" | "MX" => "es-ES,es;q=0.9,en;q=0.8",
            "IT" => "it-IT,it;q=0.9,en;q=0.8",
            "NL" => "nl-NL,nl;q=0.9,en;q=0.8",
            "JP" => "ja-JP,ja;q=0.9,en;q=0.8",
            "IN" => "en-IN,en;q=0.9,hi;q=0.8",
            "BR" => "pt-BR,pt;q=0.9,en;q=0.8",
            "UAE" | "AE" => "en-AE,en;q=0.9,ar;q=0.8",
            "AU" => "en-AU,en;q=0.9",
            "CA" => "en-CA,en;q=0.9,fr;q=0.8",
            _ => "en-US,en;q=0.9",
        }
    }

    /// Checks that every required field is present and the URL is usable.
    pub fn validate(&self, brand: &str) -> Result<(), ConfigError> {
        let missing = |field: &'static str| ConfigError::MissingField {
            brand: brand.to_string(),
            region: self.region_code.clone(),
            field,
        };

        if self.region_code.trim().is_empty() {
            return Err(missing("code"));
        }
        if self.base_url.trim().is_empty() {
            return Err(missing("url"));
        }
        if self.currency_name.trim().is_empty() {
            return Err(missing("currency"));
        }

        let sample = self.base_url.replace(BRAND_PLACEHOLDER, "brand");
        match Url::parse(&sample) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
            Ok(url) => Err(ConfigError::InvalidUrl {
                region: self.region_code.clone(),
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => Err(ConfigError::InvalidUrl {
                region: self.region_code.clone(),
                url: self.base_url.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

/// A brand and its regional storefronts, in configured order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandSites {
    /// Brand display name
    pub name: String,
    /// Regional storefronts; the order is the region iteration order
    #[serde(default)]
    pub regions: Vec<RegionConfig>,
}

impl BrandSites {
    /// Returns region codes in configured order.
    pub fn region_codes(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.region_code.as_str()).collect()
    }

    /// Finds a region by code (case-insensitive).
    pub fn region(&self, code: &str) -> Option<&RegionConfig> {
        self.regions.iter().find(|r| r.region_code.eq_ignore_ascii_case(code))
    }
}
