//! OAuth2 token endpoint client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::error::CredentialError;
use super::types::TokenResponse;
use crate::config::UpstreamConfig;

/// Authorization-code and refresh-token grants.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, CredentialError>;
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, CredentialError>;
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<&'a str>,
}

/// Token endpoint reached over HTTP (`POST {api_url}/oauth/token`).
pub struct HttpTokenEndpoint {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl HttpTokenEndpoint {
    pub fn new(client: Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            token_url: format!("{}/oauth/token", config.api_url.trim_end_matches('/')),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }

    async fn post(&self, request: &TokenRequest<'_>) -> Result<TokenResponse, CredentialError> {
        debug!(grant_type = request.grant_type, "Requesting upstream token");

        let response = self
            .client
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CredentialError::UpstreamRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl TokenEndpoint for HttpTokenEndpoint {
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, CredentialError> {
        self.post(&TokenRequest {
            grant_type: "authorization_code",
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            code: Some(code),
            refresh_token: None,
            redirect_uri: Some(&self.redirect_uri),
        })
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, CredentialError> {
        self.post(&TokenRequest {
            grant_type: "refresh_token",
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            code: None,
            refresh_token: Some(refresh_token),
            redirect_uri: None,
        })
        .await
    }
}

/// Parameters for the browser-facing authorization URL.
#[derive(Debug, Clone)]
pub struct AuthorizationTarget {
    pub auth_url: String,
    pub client_id: String,
    pub redirect_uri: String,
}

impl AuthorizationTarget {
    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self {
            auth_url: config.auth_url.clone(),
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }

    /// `{auth_url}?response_type=code&client_id=..&redirect_uri=..`
    pub fn url(&self) -> Result<String, CredentialError> {
        let url = url::Url::parse_with_params(
            &self.auth_url,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ],
        )
        .map_err(|e| CredentialError::Internal(format!("invalid authorization url: {e}")))?;
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_request_omits_code() {
        let body = serde_json::to_value(TokenRequest {
            grant_type: "refresh_token",
            client_id: "id",
            client_secret: "secret",
            code: None,
            refresh_token: Some("r"),
            redirect_uri: None,
        })
        .unwrap();
        assert_eq!(body["grant_type"], "refresh_token");
        assert_eq!(body["refresh_token"], "r");
        assert!(body.get("code").is_none());
        assert!(body.get("redirect_uri").is_none());
    }

    #[test]
    fn test_authorization_url_encodes_params() {
        let target = AuthorizationTarget {
            auth_url: "https://auth.example.com/authorization".to_string(),
            client_id: "123".to_string(),
            redirect_uri: "https://app.example.com/callback?x=1".to_string(),
        };
        let url = target.url().unwrap();
        assert!(url.starts_with("https://auth.example.com/authorization?response_type=code"));
        assert!(url.contains("client_id=123"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback%3Fx%3D1"));
    }
}
