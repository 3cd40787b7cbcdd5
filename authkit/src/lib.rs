//! Authentication primitives
//!
//! Building blocks for stateless, token-based authentication:
//! - Password hashing and verification (Argon2id)
//! - Signed, time-bounded bearer tokens (HS256 JWT)
//!
//! The crate knows nothing about HTTP or storage. Services wire these
//! primitives into their own request pipeline and credential store.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use authkit::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Tokens
//! ```
//! use std::collections::HashMap;
//!
//! use authkit::TokenService;
//! use chrono::Duration;
//!
//! // base64 of a 32-byte secret
//! let tokens = TokenService::from_base64_secret(
//!     "c2VjcmV0X2tleV9hdF9sZWFzdF8zMl9ieXRlc19sb25nISE=",
//!     Duration::minutes(60),
//! )
//! .unwrap();
//!
//! let token = tokens.issue("alice", HashMap::new()).unwrap();
//! let identity = tokens.validate(&token).unwrap();
//! assert_eq!(identity.subject, "alice");
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::Claims;
pub use token::Identity;
pub use token::TokenError;
pub use token::TokenRejection;
pub use token::TokenService;
