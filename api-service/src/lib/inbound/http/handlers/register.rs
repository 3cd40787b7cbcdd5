use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::TokenResponseData;
use crate::credential::errors::EmailError;
use crate::credential::errors::UsernameError;
use crate::credential::models::EmailAddress;
use crate::credential::models::Profile;
use crate::credential::models::RegisterCommand;
use crate::credential::models::Username;
use crate::credential::ports::CredentialStore;
use crate::inbound::http::router::AppState;

/// Registration creates the credential record and logs the account in: the
/// response carries a token just like a successful login.
pub async fn register<S>(
    State(state): State<AppState<S>>,
    Json(body): Json<RegisterRequestBody>,
) -> Result<ApiSuccess<TokenResponseData>, ApiError>
where
    S: CredentialStore,
{
    let token = state
        .orchestrator
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(StatusCode::OK, TokenResponseData { token }))
}

/// HTTP request body for registration (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequestBody {
    username: String,
    password: String,
    firstname: String,
    lastname: String,
    email: String,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterRequestError {
    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),
}

impl RegisterRequestBody {
    fn try_into_command(self) -> Result<RegisterCommand, ParseRegisterRequestError> {
        let username = Username::new(self.username)?;
        let email = EmailAddress::new(self.email)?;
        let profile = Profile {
            firstname: self.firstname,
            lastname: self.lastname,
            email,
        };
        Ok(RegisterCommand::new(username, self.password, profile))
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}
