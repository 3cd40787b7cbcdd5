use async_trait::async_trait;

use crate::credential::errors::StoreError;
use crate::credential::models::Credential;
use crate::credential::models::NewCredential;
use crate::credential::models::Username;

/// Persistence operations for credential records.
///
/// This is the only seam through which the authentication core touches shared
/// mutable state. Implementations own consistency: concurrent `create` calls
/// for the same username must not both succeed.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Retrieve a credential by unique login name.
    ///
    /// # Returns
    /// Optional credential (None if no account with this username)
    ///
    /// # Errors
    /// * `Database` - Lookup failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<Credential>, StoreError>;

    /// Persist a new credential record and assign its numeric id.
    ///
    /// # Errors
    /// * `DuplicateUsername` - Unique-username constraint fired
    /// * `Database` - Insert failed
    async fn create(&self, credential: NewCredential) -> Result<Credential, StoreError>;
}
