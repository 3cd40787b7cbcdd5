use std::collections::HashMap;

use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;
use super::errors::TokenRejection;

/// Issues and validates signed, time-bounded bearer tokens.
///
/// Tokens are HS256 JWTs. The signing key and time-to-live are fixed at
/// construction; validation is a pure function of the token string, the key,
/// and the current wall-clock time. There is no server-side token state and
/// therefore no revocation: a token dies only by passing its expiry.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

/// Identity reconstructed from a validated token.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// Login name the token was issued for
    pub subject: String,
    /// Full decoded claim set
    pub claims: Claims,
}

impl TokenService {
    /// Create a token service from a base64-encoded secret.
    ///
    /// This is the configuration path: the secret arrives base64-encoded and
    /// a value that does not decode is a construction error, surfaced at
    /// startup rather than on the first request.
    ///
    /// # Errors
    /// * `InvalidKey` - Secret is not valid base64
    pub fn from_base64_secret(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        let encoding_key = EncodingKey::from_base64_secret(secret)
            .map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        let decoding_key = DecodingKey::from_base64_secret(secret)
            .map_err(|e| TokenError::InvalidKey(e.to_string()))?;

        Ok(Self {
            encoding_key,
            decoding_key,
            algorithm: Algorithm::HS256,
            ttl,
        })
    }

    /// Create a token service from raw secret bytes.
    ///
    /// The secret should be at least 32 bytes for HS256.
    pub fn from_secret(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            ttl,
        }
    }

    /// Issue a token for `subject`, expiring after the configured TTL.
    ///
    /// Extra claims are merged into the token body; entries that would shadow
    /// the reserved `sub`/`iat`/`exp` claims are dropped.
    ///
    /// # Errors
    /// * `EncodingFailed` - Claim serialization or signing failed
    pub fn issue(
        &self,
        subject: &str,
        mut extra_claims: HashMap<String, serde_json::Value>,
    ) -> Result<String, TokenError> {
        extra_claims.retain(|key, _| !Claims::RESERVED.contains(&key.as_str()));

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + self.ttl.num_seconds(),
            extra: extra_claims,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Validate a token string and reconstruct the identity it carries.
    ///
    /// Fails closed: any parse error, signature mismatch, or missing claim is
    /// `MalformedOrUntrusted`. A structurally sound, correctly signed token
    /// whose expiry is not strictly after the current time is `Expired`.
    pub fn validate(&self, token: &str) -> Result<Identity, TokenRejection> {
        let mut validation = Validation::new(self.algorithm);
        // No grace period: expiry semantics must match issuance exactly
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenRejection::Expired,
                    _ => TokenRejection::MalformedOrUntrusted,
                }
            })?;

        let claims = token_data.claims;

        // jsonwebtoken accepts exp == now even with zero leeway; validity
        // requires the expiry to be strictly after the current time
        if claims.is_expired(Utc::now().timestamp()) {
            return Err(TokenRejection::Expired);
        }

        Ok(Identity {
            subject: claims.sub.clone(),
            claims,
        })
    }

    /// Check that a token is valid and belongs to `expected_subject`.
    ///
    /// Convenience for callers that already know whose token they expect.
    pub fn is_valid_for(&self, token: &str, expected_subject: &str) -> bool {
        self.validate(token)
            .map(|identity| identity.subject == expected_subject)
            .unwrap_or(false)
    }
}
