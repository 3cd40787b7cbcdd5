use authkit::Claims;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::credential::ports::CredentialStore;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::policy::Access;
use crate::inbound::http::router::AppState;

/// Identity attached to a request by the authentication gate.
///
/// Request-scoped: inserted into the request's extensions before handler
/// dispatch and discarded with the request. Handlers read it to know who is
/// calling; a handler behind the gate never runs without one.
#[derive(Debug, Clone)]
pub enum RequestIdentity {
    /// The path was open; no token was demanded
    Anonymous,
    /// A valid bearer token was presented
    Authenticated { subject: String, claims: Claims },
}

impl RequestIdentity {
    pub fn subject(&self) -> Option<&str> {
        match self {
            RequestIdentity::Anonymous => None,
            RequestIdentity::Authenticated { subject, .. } => Some(subject),
        }
    }
}

/// Per-request authentication gate.
///
/// Runs before every handler. The route policy is consulted first: open paths
/// pass through with an anonymous identity. Guarded paths must carry
/// `Authorization: Bearer <token>`; a missing or malformed header, or a token
/// the token service rejects, terminates the request with 401 here - the
/// handler is never invoked.
pub async fn authenticate<S>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response>
where
    S: CredentialStore,
{
    if state.policy.access(req.uri().path()) == Access::Open {
        req.extensions_mut().insert(RequestIdentity::Anonymous);
        return Ok(next.run(req).await);
    }

    let token = extract_bearer_token(&req)?;

    let identity = state.tokens.validate(token).map_err(|rejection| {
        tracing::warn!(
            path = %req.uri().path(),
            reason = %rejection,
            "Request rejected by authentication gate"
        );
        ApiError::Unauthorized("Invalid or expired token".to_string()).into_response()
    })?;

    req.extensions_mut().insert(RequestIdentity::Authenticated {
        subject: identity.subject,
        claims: identity.claims,
    });

    Ok(next.run(req).await)
}

fn extract_bearer_token(req: &Request) -> Result<&str, Response> {
    let no_credentials = || {
        tracing::warn!(
            path = %req.uri().path(),
            "Request rejected by authentication gate: no bearer credentials"
        );
        ApiError::Unauthorized("Authentication required".to_string()).into_response()
    };

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| no_credentials())?;

    header_value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| no_credentials())
}
