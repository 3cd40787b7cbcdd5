use std::collections::HashMap;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use api_service::credential::errors::StoreError;
use api_service::credential::models::Credential;
use api_service::credential::models::CredentialId;
use api_service::credential::models::NewCredential;
use api_service::credential::models::Username;
use api_service::credential::ports::CredentialStore;
use api_service::credential::service::AuthOrchestrator;
use api_service::inbound::http::policy::RoutePolicy;
use api_service::inbound::http::router::create_router;
use async_trait::async_trait;
use authkit::TokenService;
use chrono::Duration;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-token-signing-32-bytes!";

/// Test application that spawns a real server on a random port, backed by an
/// in-memory credential store.
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    /// Shares the server's signing key, so tests can validate issued tokens
    /// and mint tokens of their own
    pub tokens: Arc<TokenService>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_ttl_minutes(60).await
    }

    /// Spawn with an explicit token TTL. A negative TTL makes the server
    /// issue already-expired tokens.
    pub async fn spawn_with_ttl_minutes(ttl_minutes: i64) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let tokens = Arc::new(TokenService::from_secret(
            TEST_SECRET,
            Duration::minutes(ttl_minutes),
        ));
        let store = Arc::new(InMemoryCredentialStore::new());
        let orchestrator = Arc::new(AuthOrchestrator::new(store, Arc::clone(&tokens)));
        let policy = Arc::new(RoutePolicy::default());

        let router = create_router(orchestrator, Arc::clone(&tokens), policy);

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            tokens,
        }
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Register an account and return the issued token.
    pub async fn register(&self, username: &str, password: &str) -> String {
        let response = self
            .post("/auth/register")
            .json(&serde_json::json!({
                "username": username,
                "password": password,
                "firstname": "Test",
                "lastname": "User",
                "email": format!("{}@example.com", username),
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("Register response carried no token")
            .to_string()
    }
}

/// Credential store holding records in a mutex-guarded map. Mirrors the
/// Postgres store's contract, including the duplicate-username guarantee.
pub struct InMemoryCredentialStore {
    records: Mutex<HashMap<String, Credential>>,
    next_id: AtomicI64,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Credential>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.get(username.as_str()).cloned())
    }

    async fn create(&self, credential: NewCredential) -> Result<Credential, StoreError> {
        let mut records = self.records.lock().unwrap();

        if records.contains_key(credential.username.as_str()) {
            return Err(StoreError::DuplicateUsername(credential.username.to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = Credential {
            id: CredentialId(id),
            username: credential.username,
            password_hash: credential.password_hash,
            roles: credential.roles,
            profile: credential.profile,
            created_at: credential.created_at,
        };

        records.insert(stored.username.as_str().to_string(), stored.clone());
        Ok(stored)
    }
}
