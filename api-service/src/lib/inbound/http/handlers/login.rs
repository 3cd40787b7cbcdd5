use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokenResponseData;
use crate::credential::models::Username;
use crate::credential::ports::CredentialStore;
use crate::inbound::http::router::AppState;

pub async fn login<S>(
    State(state): State<AppState<S>>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<TokenResponseData>, ApiError>
where
    S: CredentialStore,
{
    // A syntactically invalid username cannot name an account; report it the
    // same way as any other failed login
    let username = Username::new(body.username)
        .map_err(|_| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let token = state
        .orchestrator
        .login(&username, &body.password)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(StatusCode::OK, TokenResponseData { token }))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    username: String,
    password: String,
}
