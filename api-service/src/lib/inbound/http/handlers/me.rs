use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::gate::RequestIdentity;

/// Report the caller's identity as the gate reconstructed it from the token.
pub async fn me(
    Extension(identity): Extension<RequestIdentity>,
) -> Result<ApiSuccess<MeResponseData>, ApiError> {
    match identity {
        RequestIdentity::Authenticated { subject, claims } => Ok(ApiSuccess::new(
            StatusCode::OK,
            MeResponseData {
                subject,
                roles: claims.string_list("roles"),
            },
        )),
        RequestIdentity::Anonymous => {
            Err(ApiError::Unauthorized("Authentication required".to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeResponseData {
    pub subject: String,
    pub roles: Vec<String>,
}
