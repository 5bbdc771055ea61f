//! Client for the external scraping endpoint.
//!
//! `POST {base_url}/scrape` with `{"url": ...}`. Transport errors, 5xx, 429 and
//! undecodable bodies are retried with exponential backoff; any other 4xx means
//! the endpoint rejected the URL and fails immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::FetchError;
use super::types::{FetchResult, FetchStrategy, discount_percent};
use crate::config::ScraperConfig;

/// Timeout for the liveness probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait ScraperClient: Send + Sync {
    /// Scrape one listing. Exhausted retries surface as [`FetchError::Unreachable`].
    async fn scrape(&self, url: &str) -> Result<FetchResult, FetchError>;

    /// Lightweight liveness probe.
    async fn is_available(&self) -> bool;
}

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
}

/// Wire format of the scraping endpoint. Everything is optional; validity is
/// decided later on the mapped [`FetchResult`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    original_price: Option<f64>,
    #[serde(default)]
    discount_percent: Option<f64>,
}

impl From<ScrapeResponse> for FetchResult {
    fn from(resp: ScrapeResponse) -> Self {
        let price = resp.price.unwrap_or(0.0);
        let discount = resp
            .discount_percent
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| d.round() as i64)
            .or_else(|| discount_percent(resp.original_price, price));

        Self {
            title: resp.title.unwrap_or_default().trim().to_string(),
            price,
            image_url: resp.image_url.filter(|u| !u.is_empty()),
            original_price: resp.original_price,
            discount_percent: discount,
            strategy: FetchStrategy::Scraper,
        }
    }
}

/// Outcome of a single attempt.
enum Attempt {
    Done(FetchResult),
    Retry(String),
    Fail(FetchError),
}

pub struct HttpScraperClient {
    client: Client,
    base_url: String,
    max_attempts: u32,
    base_delay: Duration,
}

impl HttpScraperClient {
    pub fn new(client: Client, config: &ScraperConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_attempts: config.max_attempts.max(1),
            base_delay: config.retry_base_delay,
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(1u32 << (attempt.saturating_sub(1)).min(16))
    }

    async fn attempt(&self, url: &str) -> Attempt {
        let response = match self
            .client
            .post(format!("{}/scrape", self.base_url))
            .json(&ScrapeRequest { url })
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return Attempt::Retry(format!("request failed: {e}")),
        };

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Attempt::Retry(format!("HTTP {status}"));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Attempt::Fail(FetchError::unreachable(
                url,
                1,
                format!("scraper rejected URL: HTTP {status} {body}"),
            ));
        }

        match response.json::<ScrapeResponse>().await {
            Ok(body) => Attempt::Done(body.into()),
            Err(e) => Attempt::Retry(format!("undecodable response: {e}")),
        }
    }
}

#[async_trait]
impl ScraperClient for HttpScraperClient {
    async fn scrape(&self, url: &str) -> Result<FetchResult, FetchError> {
        let mut last_reason = String::new();

        for attempt in 1..=self.max_attempts {
            match self.attempt(url).await {
                Attempt::Done(result) => {
                    debug!(url = %url, attempt, "Scrape succeeded");
                    return Ok(result);
                }
                Attempt::Fail(e) => return Err(e),
                Attempt::Retry(reason) => {
                    if attempt < self.max_attempts {
                        let delay = self.backoff(attempt);
                        debug!(
                            url = %url,
                            reason = %reason,
                            "Scrape attempt {}/{} failed, retrying in {:?}",
                            attempt,
                            self.max_attempts,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_reason = reason;
                }
            }
        }

        warn!(
            url = %url,
            reason = %last_reason,
            "Scraper gave up after {} attempts",
            self.max_attempts
        );
        Err(FetchError::unreachable(url, self.max_attempts, last_reason))
    }

    async fn is_available(&self) -> bool {
        match self
            .client
            .get(format!("{}/", self.base_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Scraper liveness probe failed");
                false
            }
        }
    }
}
