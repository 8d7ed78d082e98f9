//! HTTP client for regional storefront pages using wreq for TLS fingerprint emulation.

use crate::config::Config;
use crate::fetch::selectors;
use crate::regions::RegionConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Why a region's page could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchFailureReason {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("blocked by bot protection")]
    Blocked,
}

impl FetchFailureReason {
    /// Returns true if another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchFailureReason::Timeout | FetchFailureReason::Network(_) => true,
            FetchFailureReason::Status(code) => *code == 429 || *code >= 500,
            FetchFailureReason::Blocked => false,
        }
    }
}

/// A failed fetch for one region. Recorded, never fatal to a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{region_code}: {reason}")]
pub struct FetchFailure {
    pub region_code: String,
    pub reason: FetchFailureReason,
}

impl FetchFailure {
    /// Creates a failure record.
    pub fn new(region_code: impl Into<String>, reason: FetchFailureReason) -> Self {
        Self { region_code: region_code.into(), reason }
    }
}

/// Trait for retrieving a region's listing page - enables mocking for tests.
#[async_trait]
pub trait RegionalFetcher: Send + Sync {
    /// Fetches the raw HTML of a brand's listing page in one region.
    async fn fetch(&self, region: &RegionConfig, brand: &str) -> Result<String, FetchFailure>;
}

/// Storefront HTTP client with browser impersonation and retries.
pub struct HttpFetcher {
    client: Client,
    user_agents: Vec<String>,
    retry_attempts: u32,
    retry_delay_ms: u64,
    retry_jitter_ms: u64,
}

impl HttpFetcher {
    /// Creates a new fetcher with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            user_agents: config.user_agents.clone(),
            retry_attempts: config.retry_attempts.max(1),
            retry_delay_ms: config.retry_delay_ms,
            retry_jitter_ms: config.retry_jitter_ms,
        })
    }

    /// Picks a random user agent, if any are configured.
    fn pick_user_agent(&self) -> Option<&str> {
        if self.user_agents.is_empty() {
            return None;
        }
        let idx = rand::rng().random_range(0..self.user_agents.len());
        Some(self.user_agents[idx].as_str())
    }

    /// Performs a single GET attempt.
    async fn get(&self, region: &RegionConfig, url: &str) -> Result<String, FetchFailureReason> {
        debug!("GET {}", url);

        let mut request = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", region.accept_language())
            .header("Cache-Control", "no-cache")
            .header("Upgrade-Insecure-Requests", "1");

        if let Some(agent) = self.pick_user_agent() {
            request = request.header("User-Agent", agent);
        }

        let response = request.send().await.map_err(classify_error)?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(FetchFailureReason::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(classify_error)?;

        if selectors::is_blocked(&body) {
            return Err(FetchFailureReason::Blocked);
        }

        Ok(body)
    }

    /// Sleeps between attempts.
    async fn delay(&self) {
        if self.retry_delay_ms == 0 && self.retry_jitter_ms == 0 {
            return;
        }

        let jitter = if self.retry_jitter_ms > 0 {
            rand::rng().random_range(0..=self.retry_jitter_ms)
        } else {
            0
        };

        let total_delay = self.retry_delay_ms + jitter;
        debug!("Delaying {}ms before retry", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

fn classify_error(err: wreq::Error) -> FetchFailureReason {
    if err.is_timeout() {
        FetchFailureReason::Timeout
    } else {
        FetchFailureReason::Network(err.to_string())
    }
}

#[async_trait]
impl RegionalFetcher for HttpFetcher {
    async fn fetch(&self, region: &RegionConfig, brand: &str) -> Result<String, FetchFailure> {
        let url = region.url_for(brand);
        info!("Fetching {} from {}", brand, region.region_code);

        let mut attempt = 1;
        loop {
            match self.get(region, &url).await {
                Ok(body) => return Ok(body),
                Err(reason) if reason.is_retryable() && attempt < self.retry_attempts => {
                    warn!(
                        "{} attempt {}/{} failed: {}",
                        region.region_code, attempt, self.retry_attempts, reason
                    );
                    self.delay().await;
                    attempt += 1;
                }
                Err(reason) => {
                    warn!("{} fetch failed: {}", region.region_code, reason);
                    return Err(FetchFailure::new(region.region_code.clone(), reason));
                }
            }
        }
    }
}
