use std::collections::HashMap;
use std::sync::Arc;

use authkit::PasswordHasher;
use authkit::TokenService;
use chrono::Utc;

use crate::credential::errors::AuthError;
use crate::credential::errors::StoreError;
use crate::credential::models::Credential;
use crate::credential::models::NewCredential;
use crate::credential::models::RegisterCommand;
use crate::credential::models::Role;
use crate::credential::models::Username;
use crate::credential::ports::CredentialStore;

/// Orchestrates the two public authentication entry points.
///
/// `login` verifies credentials and issues a token; `register` creates a
/// credential record and issues a token for the fresh account. Everything
/// else (per-request validation) happens in the gate, which talks to the
/// token service directly.
pub struct AuthOrchestrator<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    tokens: Arc<TokenService>,
    password_hasher: PasswordHasher,
}

impl<S> AuthOrchestrator<S>
where
    S: CredentialStore,
{
    pub fn new(store: Arc<S>, tokens: Arc<TokenService>) -> Self {
        Self {
            store,
            tokens,
            password_hasher: PasswordHasher::new(),
        }
    }

    /// Verify a username/password pair and issue a token for the account.
    ///
    /// An unknown username and a wrong password return the same
    /// `InvalidCredentials` error; the distinction exists only in the logs.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or password mismatch
    /// * `Database` - Credential lookup failed
    /// * `TokenIssue` - Token could not be generated
    pub async fn login(&self, username: &Username, password: &str) -> Result<String, AuthError> {
        let credential = match self.store.find_by_username(username).await? {
            Some(credential) => credential,
            None => {
                tracing::warn!(username = %username, "Login rejected: unknown username");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let password_matches = self
            .password_hasher
            .verify(password, &credential.password_hash)?;

        if !password_matches {
            tracing::warn!(username = %username, "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_for(&credential)
    }

    /// Create a new account and immediately issue a token for it.
    ///
    /// The plaintext password is hashed before it goes anywhere near the
    /// store. The existence pre-check keeps the common duplicate case cheap;
    /// the store's unique constraint closes the race.
    ///
    /// # Errors
    /// * `UsernameTaken` - An account with this login name already exists
    /// * `Password` - Hashing failed
    /// * `Database` - Persistence failed
    /// * `TokenIssue` - Token could not be generated
    pub async fn register(&self, command: RegisterCommand) -> Result<String, AuthError> {
        if self
            .store
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            return Err(AuthError::UsernameTaken(command.username.to_string()));
        }

        let password_hash = self.password_hasher.hash(&command.password)?;

        let new_credential = NewCredential {
            username: command.username,
            password_hash,
            roles: vec![Role::User],
            profile: command.profile,
            created_at: Utc::now(),
        };

        let credential = self.store.create(new_credential).await.map_err(|e| match e {
            StoreError::DuplicateUsername(username) => AuthError::UsernameTaken(username),
            other => AuthError::from(other),
        })?;

        tracing::info!(username = %credential.username, id = %credential.id, "Account registered");

        self.issue_for(&credential)
    }

    fn issue_for(&self, credential: &Credential) -> Result<String, AuthError> {
        let roles: Vec<&str> = credential.roles.iter().map(Role::as_str).collect();

        let mut extra_claims = HashMap::new();
        extra_claims.insert("roles".to_string(), serde_json::json!(roles));

        Ok(self.tokens.issue(credential.username.as_str(), extra_claims)?)
    }
}

#[cfg(test)]
mod tests {
    use authkit::TokenRejection;
    use chrono::Duration;
    use mockall::mock;

    use super::*;
    use crate::credential::models::CredentialId;
    use crate::credential::models::EmailAddress;
    use crate::credential::models::Profile;

    mock! {
        pub TestCredentialStore {}

        #[async_trait::async_trait]
        impl CredentialStore for TestCredentialStore {
            async fn find_by_username(&self, username: &Username) -> Result<Option<Credential>, StoreError>;
            async fn create(&self, credential: NewCredential) -> Result<Credential, StoreError>;
        }
    }

    fn token_service() -> Arc<TokenService> {
        Arc::new(TokenService::from_secret(
            b"orchestrator_test_secret_32_bytes_plus!!",
            Duration::minutes(60),
        ))
    }

    fn profile() -> Profile {
        Profile {
            firstname: "Alice".to_string(),
            lastname: "Smith".to_string(),
            email: EmailAddress::new("alice@example.com".to_string()).unwrap(),
        }
    }

    fn stored_credential(username: &str, password: &str) -> Credential {
        Credential {
            id: CredentialId(1),
            username: Username::new(username.to_string()).unwrap(),
            password_hash: PasswordHasher::new().hash(password).unwrap(),
            roles: vec![Role::User],
            profile: profile(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_login_success_issues_token_for_subject() {
        let mut store = MockTestCredentialStore::new();
        let credential = stored_credential("alice", "pw123");
        store
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(credential.clone())));

        let tokens = token_service();
        let orchestrator = AuthOrchestrator::new(Arc::new(store), Arc::clone(&tokens));

        let username = Username::new("alice".to_string()).unwrap();
        let token = orchestrator.login(&username, "pw123").await.unwrap();

        let identity = tokens.validate(&token).unwrap();
        assert_eq!(identity.subject, "alice");
        assert_eq!(identity.claims.string_list("roles"), vec!["user"]);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut store = MockTestCredentialStore::new();
        let credential = stored_credential("alice", "pw123");
        store
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(credential.clone())));

        let orchestrator = AuthOrchestrator::new(Arc::new(store), token_service());

        let username = Username::new("alice".to_string()).unwrap();
        let result = orchestrator.login(&username, "wrong").await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_indistinguishable_from_wrong_password() {
        let mut store = MockTestCredentialStore::new();
        store
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let orchestrator = AuthOrchestrator::new(Arc::new(store), token_service());

        let username = Username::new("nobody".to_string()).unwrap();
        let result = orchestrator.login(&username, "pw123").await;

        // Same variant as the password-mismatch path
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_register_hashes_password_and_issues_token() {
        let mut store = MockTestCredentialStore::new();
        store
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        store
            .expect_create()
            .withf(|new| {
                new.username.as_str() == "alice"
                    && new.password_hash.starts_with("$argon2")
                    && new.roles == vec![Role::User]
            })
            .times(1)
            .returning(|new| {
                Ok(Credential {
                    id: CredentialId(7),
                    username: new.username,
                    password_hash: new.password_hash,
                    roles: new.roles,
                    profile: new.profile,
                    created_at: new.created_at,
                })
            });

        let tokens = token_service();
        let orchestrator = AuthOrchestrator::new(Arc::new(store), Arc::clone(&tokens));

        let command = RegisterCommand::new(
            Username::new("alice".to_string()).unwrap(),
            "pw123".to_string(),
            profile(),
        );

        let token = orchestrator.register(command).await.unwrap();
        assert_eq!(tokens.validate(&token).unwrap().subject, "alice");
    }

    #[tokio::test]
    async fn test_register_duplicate_username_pre_check() {
        let mut store = MockTestCredentialStore::new();
        let existing = stored_credential("alice", "pw123");
        store
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        store.expect_create().times(0);

        let orchestrator = AuthOrchestrator::new(Arc::new(store), token_service());

        let command = RegisterCommand::new(
            Username::new("alice".to_string()).unwrap(),
            "pw456".to_string(),
            profile(),
        );

        let result = orchestrator.register(command).await;
        assert!(matches!(result, Err(AuthError::UsernameTaken(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_username_lost_race() {
        // Pre-check passes but the store's unique constraint fires
        let mut store = MockTestCredentialStore::new();
        store
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        store
            .expect_create()
            .times(1)
            .returning(|new| Err(StoreError::DuplicateUsername(new.username.to_string())));

        let orchestrator = AuthOrchestrator::new(Arc::new(store), token_service());

        let command = RegisterCommand::new(
            Username::new("alice".to_string()).unwrap(),
            "pw123".to_string(),
            profile(),
        );

        let result = orchestrator.register(command).await;
        assert!(matches!(result, Err(AuthError::UsernameTaken(_))));
    }

    #[tokio::test]
    async fn test_registered_password_verifies_on_login() {
        // register then login against the same (captured) record
        let created: Arc<std::sync::Mutex<Option<Credential>>> =
            Arc::new(std::sync::Mutex::new(None));

        let mut store = MockTestCredentialStore::new();
        store
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        let captured = Arc::clone(&created);
        store.expect_create().times(1).returning(move |new| {
            let credential = Credential {
                id: CredentialId(1),
                username: new.username,
                password_hash: new.password_hash,
                roles: new.roles,
                profile: new.profile,
                created_at: new.created_at,
            };
            *captured.lock().unwrap() = Some(credential.clone());
            Ok(credential)
        });

        let tokens = token_service();
        let orchestrator = AuthOrchestrator::new(Arc::new(store), Arc::clone(&tokens));

        let command = RegisterCommand::new(
            Username::new("alice".to_string()).unwrap(),
            "pw123".to_string(),
            profile(),
        );
        orchestrator.register(command).await.unwrap();

        let stored = created.lock().unwrap().clone().unwrap();

        let mut login_store = MockTestCredentialStore::new();
        login_store
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));
        let orchestrator = AuthOrchestrator::new(Arc::new(login_store), Arc::clone(&tokens));

        let username = Username::new("alice".to_string()).unwrap();
        let token = orchestrator.login(&username, "pw123").await.unwrap();
        assert!(tokens.is_valid_for(&token, "alice"));
    }

    #[tokio::test]
    async fn test_login_token_expires_per_configured_ttl() {
        let mut store = MockTestCredentialStore::new();
        let credential = stored_credential("alice", "pw123");
        store
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(credential.clone())));

        // Already-elapsed TTL: the issued token must validate as expired
        let tokens = Arc::new(TokenService::from_secret(
            b"orchestrator_test_secret_32_bytes_plus!!",
            Duration::minutes(-1),
        ));
        let orchestrator = AuthOrchestrator::new(Arc::new(store), Arc::clone(&tokens));

        let username = Username::new("alice".to_string()).unwrap();
        let token = orchestrator.login(&username, "pw123").await.unwrap();

        assert_eq!(tokens.validate(&token).unwrap_err(), TokenRejection::Expired);
    }
}
