//! Authenticated item lookup against the official upstream API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::error::FetchError;
use super::types::{FetchResult, FetchStrategy, discount_percent};
use crate::config::UpstreamConfig;
use crate::credentials::UpstreamCredential;

#[async_trait]
pub trait UpstreamApi: Send + Sync {
    async fn fetch_item(
        &self,
        item_id: &str,
        credential: &UpstreamCredential,
    ) -> Result<FetchResult, FetchError>;
}

#[derive(Debug, Default, Deserialize)]
struct Picture {
    #[serde(default)]
    secure_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    original_price: Option<f64>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    pictures: Vec<Picture>,
}

impl From<ItemResponse> for FetchResult {
    fn from(resp: ItemResponse) -> Self {
        let price = resp.price.unwrap_or(0.0);
        let image_url = resp
            .pictures
            .into_iter()
            .next()
            .and_then(|p| p.secure_url.or(p.url))
            .or(resp.thumbnail)
            .filter(|u| !u.is_empty());
        let original_price = resp.original_price.filter(|o| *o > price);

        Self {
            title: resp.title.unwrap_or_default().trim().to_string(),
            price,
            image_url,
            original_price,
            discount_percent: discount_percent(original_price, price),
            strategy: FetchStrategy::Authenticated,
        }
    }
}

/// `GET {api_url}/items/{id}` with a bearer token.
pub struct HttpUpstreamApi {
    client: Client,
    api_url: String,
}

impl HttpUpstreamApi {
    pub fn new(client: Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl UpstreamApi for HttpUpstreamApi {
    async fn fetch_item(
        &self,
        item_id: &str,
        credential: &UpstreamCredential,
    ) -> Result<FetchResult, FetchError> {
        let url = format!("{}/items/{}", self.api_url, item_id);
        debug!(item_id = %item_id, "Fetching item from upstream API");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, credential.bearer())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::unreachable(
                url,
                1,
                format!("HTTP {status}: {body}"),
            ));
        }

        let body: ItemResponse = response
            .json()
            .await
            .map_err(|e| FetchError::InvalidUpstreamData(format!("item {item_id}: {e}")))?;
        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_picture_wins_over_thumbnail() {
        let resp: ItemResponse = serde_json::from_str(
            r#"{
                "title": "Tenis",
                "price": 299.9,
                "original_price": 399.9,
                "thumbnail": "http://thumb",
                "pictures": [{"secure_url": "https://pic1", "url": "http://pic1"}, {"url": "http://pic2"}]
            }"#,
        )
        .unwrap();
        let result = FetchResult::from(resp);
        assert_eq!(result.image_url.as_deref(), Some("https://pic1"));
        assert_eq!(result.discount_percent, Some(25));
        assert_eq!(result.strategy, FetchStrategy::Authenticated);
    }

    #[test]
    fn test_thumbnail_fallback_and_no_discount() {
        let resp: ItemResponse = serde_json::from_str(
            r#"{"title": "Tenis", "price": 100.0, "original_price": null, "thumbnail": "http://thumb"}"#,
        )
        .unwrap();
        let result = FetchResult::from(resp);
        assert_eq!(result.image_url.as_deref(), Some("http://thumb"));
        assert_eq!(result.original_price, None);
        assert_eq!(result.discount_percent, None);
    }
}
