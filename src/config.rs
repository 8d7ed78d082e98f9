//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::regions::{BrandSites, RegionConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Malformed or unusable configuration. Surfaced before any fetch begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("brand '{brand}', region '{region}': missing required field '{field}'")]
    MissingField { brand: String, region: String, field: &'static str },

    #[error("region '{region}': invalid url \"{url}\": {reason}")]
    InvalidUrl { region: String, url: String, reason: String },

    #[error("brand entry with an empty name")]
    EmptyBrandName,

    #[error("brand '{brand}' lists region '{region}' more than once")]
    DuplicateRegion { brand: String, region: String },

    #[error("unknown brand '{brand}' (configured: {configured})")]
    UnknownBrand { brand: String, configured: String },

    #[error("brand '{brand}' has no regions matching the request")]
    NoRegions { brand: String },
}

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum candidates kept per region page
    #[serde(default = "default_max_products_per_region")]
    pub max_products_per_region: usize,

    /// User-agent strings rotated across requests
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Attempts per region before giving up
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Random jitter added to the retry delay (0 to this value)
    #[serde(default = "default_retry_jitter_ms")]
    pub retry_jitter_ms: u64,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Lifetime of cached pipeline results in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Brand catalog
    #[serde(default)]
    pub brands: Vec<BrandSites>,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_products_per_region() -> usize {
    10
}

fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36".to_string(),
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".to_string(),
    ]
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_retry_jitter_ms() -> u64 {
    500
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_products_per_region: default_max_products_per_region(),
            user_agents: default_user_agents(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_jitter_ms: default_retry_jitter_ms(),
            proxy: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            format: OutputFormat::Table,
            brands: Vec::new(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("regional-prices.toml");
        if local_config.exists() {
            debug!("Found regional-prices.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("regional-prices").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(proxy) = std::env::var("RP_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(timeout) = std::env::var("RP_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }

        if let Ok(max) = std::env::var("RP_MAX_PRODUCTS") {
            if let Ok(m) = max.parse() {
                self.max_products_per_region = m;
            }
        }

        self
    }

    /// Validates the brand catalog.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for brand in &self.brands {
            if brand.name.trim().is_empty() {
                return Err(ConfigError::EmptyBrandName);
            }

            let mut seen = HashSet::new();
            for region in &brand.regions {
                region.validate(&brand.name)?;
                if !seen.insert(region.region_code.to_uppercase()) {
                    return Err(ConfigError::DuplicateRegion {
                        brand: brand.name.clone(),
                        region: region.region_code.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns configured brand names in order.
    pub fn brand_names(&self) -> Vec<&str> {
        self.brands.iter().map(|b| b.name.as_str()).collect()
    }

    /// Finds a brand by name (case-insensitive).
    pub fn brand(&self, name: &str) -> Option<&BrandSites> {
        self.brands.iter().find(|b| b.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Like [`brand`](Self::brand), but an unknown name is an error listing
    /// the configured brands.
    pub fn require_brand(&self, name: &str) -> Result<&BrandSites, ConfigError> {
        self.brand(name).ok_or_else(|| {
            let names = self.brand_names();
            ConfigError::UnknownBrand {
                brand: name.trim().to_string(),
                configured: if names.is_empty() { "none".to_string() } else { names.join(", ") },
            }
        })
    }

    /// Resolves requested region codes to configs, in configured order.
    ///
    /// An empty request selects every region of the brand. Unknown codes are
    /// skipped with a warning.
    pub fn select_regions(
        &self,
        brand: &str,
        codes: &[String],
    ) -> Result<Vec<RegionConfig>, ConfigError> {
        let sites = self.require_brand(brand)?;

        for code in codes {
            if sites.region(code).is_none() {
                warn!("Region {} not available for {}", code, sites.name);
            }
        }

        let selected: Vec<RegionConfig> = sites
            .regions
            .iter()
            .filter(|r| codes.is_empty() || codes.iter().any(|c| r.region_code.eq_ignore_ascii_case(c)))
            .cloned()
            .collect();

        if selected.is_empty() {
            return Err(ConfigError::NoRegions { brand: sites.name.clone() });
        }

        Ok(selected)
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use: table, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
