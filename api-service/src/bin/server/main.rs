use std::sync::Arc;

use anyhow::Context;
use api_service::config::Config;
use api_service::credential::service::AuthOrchestrator;
use api_service::inbound::http::policy::RoutePolicy;
use api_service::inbound::http::router::create_router;
use api_service::outbound::repositories::PostgresCredentialStore;
use authkit::TokenService;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "api-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    // Fatal before any listener binds: an unauthenticatable process must not
    // accept traffic
    let config = Config::load().context("configuration incomplete (is AUTH__SECRET set?)")?;

    let token_ttl = Duration::minutes(config.auth.token_ttl_minutes);
    let tokens = Arc::new(
        TokenService::from_base64_secret(&config.auth.secret, token_ttl)
            .context("auth.secret is not a valid base64-encoded signing key")?,
    );

    tracing::info!(
        http_port = config.server.http_port,
        token_ttl_minutes = config.auth.token_ttl_minutes,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let store = Arc::new(PostgresCredentialStore::new(pg_pool));
    let orchestrator = Arc::new(AuthOrchestrator::new(store, Arc::clone(&tokens)));
    let policy = Arc::new(RoutePolicy::default());

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let application = create_router(orchestrator, tokens, policy);
    axum::serve(http_listener, application).await?;

    Ok(())
}
