//! Authentication for signed write requests.
//!
//! # Data Flow
//! ```text
//! Authorization / X-Blog-Signature / X-Timestamp headers + raw body bytes
//!     → Authenticator::authenticate (header presence, API token, timestamp parse)
//!     → signature::verify (token presence, replay window, HMAC compare)
//!     → Ok(()) or AuthRejection (→ 401)
//! ```

pub mod signature;

use subtle::ConstantTimeEq;

use crate::config::AuthConfig;

pub use signature::{sign, verify, AuthRejection, SignedEnvelope, REPLAY_WINDOW_MS};

/// Header carrying the hex HMAC digest.
pub const SIGNATURE_HEADER: &str = "x-blog-signature";
/// Header carrying the signing time in milliseconds.
pub const TIMESTAMP_HEADER: &str = "x-timestamp";

/// Raw header values relevant to authentication, as received.
#[derive(Debug, Clone, Copy, Default)]
pub struct Credentials<'a> {
    pub authorization: Option<&'a str>,
    pub signature: Option<&'a str>,
    pub timestamp: Option<&'a str>,
}

/// Verifies signed requests against the configured secret and API token.
#[derive(Clone)]
pub struct Authenticator {
    secret: Vec<u8>,
    api_token: String,
}

impl Authenticator {
    pub fn new(secret: impl Into<Vec<u8>>, api_token: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            api_token: api_token.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.secret_key.as_bytes(), config.api_token.trim())
    }

    /// Authenticate a request given its headers and exact body bytes.
    pub fn authenticate(
        &self,
        credentials: &Credentials<'_>,
        raw_body: &[u8],
        now_millis: i64,
    ) -> Result<(), AuthRejection> {
        let (Some(authorization), Some(provided_signature), Some(timestamp)) = (
            credentials.authorization,
            credentials.signature,
            credentials.timestamp,
        ) else {
            return Err(AuthRejection::MissingHeaders);
        };

        let token = signature::bearer_token(Some(authorization)).ok_or(AuthRejection::MissingToken)?;
        if !self.token_matches(token) {
            return Err(AuthRejection::InvalidToken);
        }

        let timestamp = timestamp.trim();
        let timestamp_millis: i64 = timestamp
            .parse()
            .map_err(|_| AuthRejection::MalformedTimestamp)?;
        // Signed over the canonical decimal form only.
        if timestamp_millis.to_string() != timestamp {
            return Err(AuthRejection::MalformedTimestamp);
        }

        let envelope = SignedEnvelope {
            raw_body,
            timestamp_millis,
            provided_signature,
            bearer_token: Some(authorization),
        };
        verify(&self.secret, &envelope, now_millis)
    }

    fn token_matches(&self, token: &str) -> bool {
        if self.api_token.is_empty() || token.len() != self.api_token.len() {
            return false;
        }
        token.as_bytes().ct_eq(self.api_token.as_bytes()).into()
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

/// Current wall-clock time in milliseconds since the epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
