//! HMAC-SHA256 request signing and verification.
//!
//! The digest input is the raw request body followed by the decimal form of
//! the millisecond timestamp. The body is never re-serialized: any change to
//! key order or whitespace would legitimately change the digest.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed distance between the signed timestamp and now.
pub const REPLAY_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Prefix accepted (and emitted) on the signature header.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Prefix stripped from the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Why a signed request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthRejection {
    #[error("Missing auth headers")]
    MissingHeaders,

    #[error("Missing API token")]
    MissingToken,

    #[error("Invalid API token")]
    InvalidToken,

    #[error("Malformed timestamp")]
    MalformedTimestamp,

    #[error("Request expired")]
    Expired,

    #[error("Invalid signature")]
    BadSignature,
}

impl AuthRejection {
    /// Short machine-readable reason, used as a metrics label.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingHeaders => "missing_headers",
            Self::MissingToken => "missing_token",
            Self::InvalidToken => "invalid_token",
            Self::MalformedTimestamp => "malformed_timestamp",
            Self::Expired => "expired",
            Self::BadSignature => "bad_signature",
        }
    }
}

/// The authentication-relevant parts of an inbound signed request.
#[derive(Debug, Clone, Copy)]
pub struct SignedEnvelope<'a> {
    /// Body bytes exactly as received.
    pub raw_body: &'a [u8],
    /// Sender's clock at signing time, in milliseconds since the epoch.
    pub timestamp_millis: i64,
    /// Hex digest, optionally prefixed with `sha256=`.
    pub provided_signature: &'a str,
    /// Raw `Authorization` header value, if any.
    pub bearer_token: Option<&'a str>,
}

/// Strip the `Bearer ` prefix and surrounding whitespace from a header value.
///
/// Returns `None` when nothing is left.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?;
    let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Lowercase hex HMAC-SHA256 of `body || timestamp`.
pub fn compute_signature(secret: &[u8], body: &[u8], timestamp_millis: i64) -> String {
    // HMAC accepts keys of any length; new_from_slice only fails for
    // fixed-size MACs.
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC-SHA256 accepts any key size");
    mac.update(body);
    mac.update(timestamp_millis.to_string().as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Header value (`sha256=<hex>`) a sender attaches to a request.
pub fn sign(secret: &[u8], body: &[u8], timestamp_millis: i64) -> String {
    format!(
        "{}{}",
        SIGNATURE_PREFIX,
        compute_signature(secret, body, timestamp_millis)
    )
}

/// Verify an envelope against `secret` at time `now_millis`.
///
/// Checks run in order: token presence, replay window, signature.
pub fn verify(
    secret: &[u8],
    envelope: &SignedEnvelope<'_>,
    now_millis: i64,
) -> Result<(), AuthRejection> {
    if bearer_token(envelope.bearer_token).is_none() {
        return Err(AuthRejection::MissingToken);
    }

    let skew = now_millis.abs_diff(envelope.timestamp_millis);
    if skew > REPLAY_WINDOW_MS as u64 {
        return Err(AuthRejection::Expired);
    }

    let expected = compute_signature(secret, envelope.raw_body, envelope.timestamp_millis);
    let provided = envelope
        .provided_signature
        .strip_prefix(SIGNATURE_PREFIX)
        .unwrap_or(envelope.provided_signature);

    if signatures_match(expected.as_bytes(), provided.as_bytes()) {
        Ok(())
    } else {
        Err(AuthRejection::BadSignature)
    }
}

/// Constant-time comparison. Length is not secret and may short-circuit.
pub fn signatures_match(expected: &[u8], provided: &[u8]) -> bool {
    if expected.len() != provided.len() {
        return false;
    }
    expected.ct_eq(provided).into()
}
