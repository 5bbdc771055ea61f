//! Upstream credential management.
//!
//! - [`UpstreamCredential`]: the single OAuth credential of the deployment
//! - [`TokenEndpoint`]: authorization-code and refresh-token grants
//! - [`CredentialStore`]: durable mirror of the credential
//! - [`CredentialManager`]: cache, serialized refresh and persistence

mod error;
mod manager;
mod oauth;
mod store;
mod types;

pub use error::CredentialError;
pub use manager::{CredentialManager, DEFAULT_REFRESH_HORIZON_MINUTES};
pub use oauth::{AuthorizationTarget, HttpTokenEndpoint, TokenEndpoint};
pub use store::CredentialStore;
pub use types::{
    CredentialState, DEFAULT_ACCOUNT_ID, DEFAULT_TOKEN_LIFETIME_SECS, TokenResponse,
    UpstreamCredential,
};
