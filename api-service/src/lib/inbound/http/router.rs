use std::sync::Arc;
use std::time::Duration;

use authkit::TokenService;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::gate;
use super::handlers::login::login;
use super::handlers::me::me;
use super::handlers::register::register;
use super::policy::RoutePolicy;
use crate::credential::ports::CredentialStore;
use crate::credential::service::AuthOrchestrator;

pub struct AppState<S>
where
    S: CredentialStore,
{
    pub orchestrator: Arc<AuthOrchestrator<S>>,
    pub tokens: Arc<TokenService>,
    pub policy: Arc<RoutePolicy>,
}

// Manual impl: #[derive(Clone)] would demand S: Clone, which the Arcs don't need
impl<S> Clone for AppState<S>
where
    S: CredentialStore,
{
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            tokens: Arc::clone(&self.tokens),
            policy: Arc::clone(&self.policy),
        }
    }
}

/// Assemble the HTTP application.
///
/// The authentication gate is a single explicit middleware layer wrapping the
/// whole router, so the order of the security check relative to handler
/// dispatch is fixed here, not implied by route grouping: every request
/// passes the gate (which consults the route policy first) before any handler
/// runs.
pub fn create_router<S>(
    orchestrator: Arc<AuthOrchestrator<S>>,
    tokens: Arc<TokenService>,
    policy: Arc<RoutePolicy>,
) -> Router
where
    S: CredentialStore,
{
    let state = AppState {
        orchestrator,
        tokens,
        policy,
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .route("/auth/login", post(login::<S>))
        .route("/auth/register", post(register::<S>))
        .route("/api/me", get(me))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::authenticate::<S>,
        ))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
