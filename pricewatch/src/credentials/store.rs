//! Credential persistence abstraction.
//!
//! The concrete SQL implementation lives in the database repository layer.

use async_trait::async_trait;

use super::error::CredentialError;
use super::types::UpstreamCredential;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Most recently written credential, if any.
    async fn load(&self) -> Result<Option<UpstreamCredential>, CredentialError>;

    /// Persist the credential, overwriting the record for its account.
    async fn save(&self, credential: &UpstreamCredential) -> Result<(), CredentialError>;
}
