//! Source gateway: picks a fetch strategy per listing and falls back to the
//! scraper whenever the authenticated path fails.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::error::FetchError;
use super::scraper::ScraperClient;
use super::types::{FetchResult, FetchStrategy};
use super::upstream::UpstreamApi;
use super::url::{classify, extract_item_id, normalize_url};
use crate::credentials::CredentialManager;

/// Anything that can turn a listing URL into a price.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError>;

    /// Pipeline-wide circuit breaker: when false the whole cycle is skipped.
    async fn is_available(&self) -> bool;
}

pub struct SourceGateway {
    credentials: Arc<CredentialManager>,
    upstream: Arc<dyn UpstreamApi>,
    scraper: Arc<dyn ScraperClient>,
    authenticated_domains: Vec<String>,
}

impl SourceGateway {
    pub fn new(
        credentials: Arc<CredentialManager>,
        upstream: Arc<dyn UpstreamApi>,
        scraper: Arc<dyn ScraperClient>,
        authenticated_domains: Vec<String>,
    ) -> Self {
        Self {
            credentials,
            upstream,
            scraper,
            authenticated_domains,
        }
    }

    async fn fetch_authenticated(&self, url: &str) -> Result<FetchResult, FetchError> {
        let item_id =
            extract_item_id(url).ok_or_else(|| FetchError::MissingItemId(url.to_string()))?;
        let credential = self.credentials.get_valid_credential().await?;
        self.upstream.fetch_item(&item_id, &credential).await
    }
}

#[async_trait]
impl ProductSource for SourceGateway {
    #[instrument(skip(self), fields(strategy = tracing::field::Empty))]
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let normalized = normalize_url(url);
        if normalized.is_empty() {
            return Err(FetchError::InvalidUpstreamData("empty URL".to_string()));
        }

        let strategy = classify(&normalized, &self.authenticated_domains);
        tracing::Span::current().record("strategy", tracing::field::display(strategy));

        if strategy == FetchStrategy::Authenticated {
            match self.fetch_authenticated(&normalized).await {
                Ok(result) if result.is_valid() => return Ok(result),
                Ok(result) => {
                    debug!(
                        reason = ?result.validation_error(),
                        "Authenticated lookup returned unusable data; falling back to scraper"
                    );
                }
                Err(e) => {
                    debug!(error = %e, "Authenticated lookup failed; falling back to scraper");
                }
            }
        }

        let result = self.scraper.scrape(&normalized).await?;
        if let Some(reason) = result.validation_error() {
            warn!(url = %normalized, %reason, "Scraper returned invalid data");
            return Err(FetchError::InvalidUpstreamData(format!(
                "{normalized}: {reason}"
            )));
        }
        Ok(result)
    }

    async fn is_available(&self) -> bool {
        self.scraper.is_available().await
    }
}
