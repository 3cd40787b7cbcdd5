use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::credential::errors::EmailError;
use crate::credential::errors::RoleError;
use crate::credential::errors::UsernameError;

/// Credential record guarding an account.
///
/// The login name is immutable after creation. The password hash is opaque
/// PHC-format material; the custom `Debug` implementation redacts it so it
/// cannot leak through logs.
#[derive(Clone)]
pub struct Credential {
    pub id: CredentialId,
    pub username: Username,
    pub password_hash: String,
    /// Non-empty; defaults to [`Role::User`] on registration
    pub roles: Vec<Role>,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("roles", &self.roles)
            .field("profile", &self.profile)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Store-generated numeric credential identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CredentialId(pub i64);

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-32 characters and contains only alphanumeric, underscore, and hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 32;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters (except _ and -)
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let length = username.len();
        if length < Self::MIN_LENGTH {
            return Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        if length > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(UsernameError::InvalidCharacters);
        }

        Ok(Self(username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Named role granting a coarse level of access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(RoleError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile fields captured at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub firstname: String,
    pub lastname: String,
    pub email: EmailAddress,
}

/// Credential record as handed to the store, before an id exists.
#[derive(Clone)]
pub struct NewCredential {
    pub username: Username,
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewCredential")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("roles", &self.roles)
            .field("profile", &self.profile)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Command to register a new account with validated fields.
///
/// Carries the plaintext password between the handler and the orchestrator;
/// `Debug` redacts it.
#[derive(Clone)]
pub struct RegisterCommand {
    pub username: Username,
    pub password: String,
    pub profile: Profile,
}

impl RegisterCommand {
    pub fn new(username: Username, password: String, profile: Profile) -> Self {
        Self {
            username,
            password,
            profile,
        }
    }
}

impl fmt::Debug for RegisterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterCommand")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("profile", &self.profile)
            .finish()
    }
}
