//! Access token payload inspection.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jiff::Timestamp;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TokenPayload {
    exp: i64,
}

/// Read the expiry out of a JWT without verifying its signature.
///
/// The server remains the authority on token validity; this only decides
/// whether a silent refresh should happen before the token is used.
#[must_use]
pub fn peek_expiry(token: &str) -> Option<Timestamp> {
    let mut parts = token.split('.');

    let _header = parts.next()?;
    let payload = parts.next()?;

    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let payload: TokenPayload = serde_json::from_slice(&bytes).ok()?;

    Timestamp::from_second(payload.exp).ok()
}

/// Whether the token is expired (or unreadable, which counts as expired).
#[must_use]
pub fn is_expired(token: &str, now: Timestamp) -> bool {
    peek_expiry(token).is_none_or(|expiry| expiry <= now)
}
