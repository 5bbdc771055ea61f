//! Upstream credential manager.
//!
//! Owns the single cached [`UpstreamCredential`]. Reads go through a
//! `parking_lot::RwLock`; refreshes are serialized by a `tokio::sync::Mutex`
//! and re-check the cache after acquiring it, so concurrent fetches that all
//! see an expiring token trigger exactly one refresh.

use std::sync::Arc;

use chrono::{Duration, Utc};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::error::CredentialError;
use super::oauth::{AuthorizationTarget, TokenEndpoint};
use super::store::CredentialStore;
use super::types::{CredentialState, UpstreamCredential};

/// Refresh ahead of expiry by this many minutes.
pub const DEFAULT_REFRESH_HORIZON_MINUTES: i64 = 5;

pub struct CredentialManager {
    endpoint: Arc<dyn TokenEndpoint>,
    store: Arc<dyn CredentialStore>,
    cached: RwLock<Option<UpstreamCredential>>,
    refresh_lock: Mutex<()>,
    horizon: Duration,
    authorization: Option<AuthorizationTarget>,
}

impl CredentialManager {
    pub fn new(endpoint: Arc<dyn TokenEndpoint>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            endpoint,
            store,
            cached: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            horizon: Duration::minutes(DEFAULT_REFRESH_HORIZON_MINUTES),
            authorization: None,
        }
    }

    pub fn with_authorization(mut self, target: AuthorizationTarget) -> Self {
        self.authorization = Some(target);
        self
    }

    /// Hydrate the cache from durable storage.
    ///
    /// A stored credential that is already inside the refresh horizon is
    /// refreshed right away; a failed refresh is logged and reflected in the
    /// returned state.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<CredentialState, CredentialError> {
        let stored = self.store.load().await?;
        let Some(credential) = stored else {
            info!("No stored upstream credential; authorization required");
            *self.cached.write() = None;
            return Ok(CredentialState::Absent);
        };

        info!(
            account_id = %credential.account_id,
            expires_at = %credential.expires_at,
            "Loaded upstream credential"
        );
        let needs_refresh = credential.is_expiring_within(Utc::now(), self.horizon)
            && credential.refresh_token.is_some();
        *self.cached.write() = Some(credential);

        if needs_refresh {
            let _guard = self.refresh_lock.lock().await;
            if let Err(e) = self.refresh_locked().await {
                warn!(error = %e, "Startup refresh of upstream credential failed");
            }
        }

        Ok(self.state())
    }

    /// Current lifecycle state of the cached credential.
    pub fn state(&self) -> CredentialState {
        match self.cached.read().as_ref() {
            None => CredentialState::Absent,
            Some(c) => c.state(Utc::now(), self.horizon),
        }
    }

    /// Browser URL that starts the authorization-code flow.
    pub fn authorization_url(&self) -> Result<String, CredentialError> {
        self.authorization
            .as_ref()
            .ok_or_else(|| CredentialError::Internal("authorization is not configured".to_string()))?
            .url()
    }

    /// Return a credential that stays valid beyond the refresh horizon,
    /// refreshing it first when needed.
    pub async fn get_valid_credential(&self) -> Result<UpstreamCredential, CredentialError> {
        if let Some(credential) = self.fresh_cached() {
            return Ok(credential);
        }

        let _guard = self.refresh_lock.lock().await;

        // Double-check after acquiring lock (another task may have refreshed)
        if let Some(credential) = self.fresh_cached() {
            return Ok(credential);
        }

        match self.refresh_locked().await {
            Ok(credential) => Ok(credential),
            Err(e) if e.is_transient() => {
                // Upstream hiccup: an unexpired token is still usable.
                let current = self.cached.read().clone();
                match current {
                    Some(c) if !c.is_expired(Utc::now()) => {
                        debug!(error = %e, "Refresh failed transiently; using unexpired token");
                        Ok(c)
                    }
                    _ => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// One-time exchange of an authorization code. Persists the result and
    /// replaces the cache.
    #[instrument(skip(self, code))]
    pub async fn exchange_authorization_code(
        &self,
        code: &str,
    ) -> Result<UpstreamCredential, CredentialError> {
        let _guard = self.refresh_lock.lock().await;

        let response = self.endpoint.exchange_code(code).await?;
        let credential = response.into_credential(None, Utc::now());
        self.store.save(&credential).await?;
        *self.cached.write() = Some(credential.clone());

        info!(
            account_id = %credential.account_id,
            expires_at = %credential.expires_at,
            "Upstream authorization completed"
        );
        Ok(credential)
    }

    /// Force a refresh with the stored refresh token.
    pub async fn refresh(&self) -> Result<UpstreamCredential, CredentialError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    fn fresh_cached(&self) -> Option<UpstreamCredential> {
        let now = Utc::now();
        self.cached
            .read()
            .as_ref()
            .filter(|c| !c.is_expiring_within(now, self.horizon))
            .cloned()
    }

    /// Caller must hold `refresh_lock`.
    async fn refresh_locked(&self) -> Result<UpstreamCredential, CredentialError> {
        let current = self.cached.read().clone();
        let Some(current) = current else {
            return Err(CredentialError::NoCredential);
        };
        let Some(refresh_token) = current.refresh_token.as_deref() else {
            warn!("Missing refresh_token - cannot auto-refresh");
            return Err(CredentialError::MissingRefreshToken);
        };

        debug!(account_id = %current.account_id, "Refreshing upstream credential");

        let response = match self.endpoint.refresh(refresh_token).await {
            Ok(r) => r,
            Err(e) if e.is_transient() => {
                warn!(error = %e, "Upstream credential refresh failed (transient)");
                return Err(e);
            }
            Err(e) => {
                warn!(error = %e, "Upstream rejected refresh; clearing credential");
                *self.cached.write() = None;
                return Err(CredentialError::RefreshFailed(e.to_string()));
            }
        };

        let refreshed = response.into_credential(Some(&current), Utc::now());
        if let Err(e) = self.store.save(&refreshed).await {
            warn!(error = %e, "Failed to persist refreshed credential (non-fatal)");
        }
        *self.cached.write() = Some(refreshed.clone());

        info!(
            account_id = %refreshed.account_id,
            expires_at = %refreshed.expires_at,
            "Upstream credential refreshed"
        );
        Ok(refreshed)
    }
}
