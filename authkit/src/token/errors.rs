use thiserror::Error;

/// Error type for token construction and issuance.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Signing key is not valid base64: {0}")]
    InvalidKey(String),

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),
}

/// Typed rejection produced by token validation.
///
/// Validation runs on every authenticated request, so a bad token is never a
/// fault: it is always one of these two outcomes. The split is deliberately
/// coarse. Anything that cannot be proven authentic (parse failure, signature
/// mismatch, missing claims) collapses into `MalformedOrUntrusted`; only a
/// token whose signature verifies but whose expiry has passed is `Expired`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenRejection {
    #[error("Token is malformed or not signed by a trusted key")]
    MalformedOrUntrusted,

    #[error("Token is expired")]
    Expired,
}
