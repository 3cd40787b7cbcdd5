use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

/// Claim set carried by every issued token.
///
/// Subject, issued-at, and expiration are mandatory; everything else rides in
/// the flattened `extra` map. Timestamps are unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (the credential's login name)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Additional custom fields (flattened into the token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Claim names that [`crate::TokenService::issue`] owns; values under
    /// these keys in an extra-claims map are discarded rather than allowed to
    /// shadow the real ones.
    pub const RESERVED: [&'static str; 3] = ["sub", "iat", "exp"];

    /// Check whether the token is past its expiration at `current_timestamp`.
    ///
    /// A token is live up to and including its `exp` second; validity requires
    /// `exp` strictly after the current time.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }

    /// Read a custom claim as a list of strings (e.g. role names).
    ///
    /// Returns an empty vector if the claim is absent or not a string array.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        self.extra
            .get(key)
            .and_then(|v| v.as_array())
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}
