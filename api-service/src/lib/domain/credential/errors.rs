use authkit::PasswordError;
use authkit::TokenError;
use thiserror::Error;

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for Role parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role: {0}")]
    Unknown(String),
}

/// Error surface of a credential store implementation.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store's unique-username constraint fired. This, not the
    /// orchestrator's pre-check, is the guarantee that two concurrent
    /// registrations for the same name cannot both succeed.
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Top-level error for authentication operations.
///
/// `InvalidCredentials` deliberately covers both an unknown username and a
/// wrong password, so a caller cannot probe which accounts exist.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    #[error("Password error: {0}")]
    Password(String),

    #[error("Token issuance failed: {0}")]
    TokenIssue(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername(username) => AuthError::UsernameTaken(username),
            StoreError::Database(msg) => AuthError::Database(msg),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Password(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::TokenIssue(err.to_string())
    }
}
