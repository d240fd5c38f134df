//! Refresh token formatting, parsing, and digest construction.

use std::fmt;

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

/// Refresh token identifier prefix.
pub const REFRESH_TOKEN_PREFIX: &str = "fr";

/// Refresh token format segment.
pub const REFRESH_TOKEN_VERSION: &str = "v1";

/// Number of secret bytes encoded in a token.
pub const REFRESH_TOKEN_SECRET_BYTES: usize = 32;

const REFRESH_TOKEN_SECRET_HEX_CHARS: usize = REFRESH_TOKEN_SECRET_BYTES * 2;

#[derive(Clone)]
pub struct RefreshTokenSecret {
    bytes: [u8; REFRESH_TOKEN_SECRET_BYTES],
}

impl RefreshTokenSecret {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; REFRESH_TOKEN_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; REFRESH_TOKEN_SECRET_BYTES] {
        &self.bytes
    }
}

impl fmt::Debug for RefreshTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshTokenSecret(**redacted**)")?;
        Ok(())
    }
}

impl Drop for RefreshTokenSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[derive(Debug, Clone)]
pub struct ParsedRefreshToken {
    pub token_uuid: Uuid,
    pub secret: RefreshTokenSecret,
}

#[derive(Debug, Error)]
pub enum RefreshTokenError {
    #[error("refresh token format is invalid")]
    InvalidFormat,

    #[error("refresh token secret encoding is invalid")]
    InvalidSecretEncoding,
}

#[must_use]
pub fn generate_refresh_token_secret() -> RefreshTokenSecret {
    let mut secret = [0_u8; REFRESH_TOKEN_SECRET_BYTES];

    OsRng.fill_bytes(&mut secret);

    RefreshTokenSecret::from_bytes(secret)
}

#[must_use]
pub fn format_refresh_token(token_uuid: Uuid, secret: &RefreshTokenSecret) -> String {
    format!(
        "{REFRESH_TOKEN_PREFIX}_{REFRESH_TOKEN_VERSION}_{}.{}",
        token_uuid.simple(),
        encode_secret_hex(secret.as_bytes())
    )
}

pub fn parse_refresh_token(token: &str) -> Result<ParsedRefreshToken, RefreshTokenError> {
    let (prefix_and_id, secret_hex) = token
        .split_once('.')
        .ok_or(RefreshTokenError::InvalidFormat)?;

    let mut id_parts = prefix_and_id.splitn(3, '_');

    let prefix = id_parts.next().ok_or(RefreshTokenError::InvalidFormat)?;
    let version_segment = id_parts.next().ok_or(RefreshTokenError::InvalidFormat)?;
    let token_uuid_segment = id_parts.next().ok_or(RefreshTokenError::InvalidFormat)?;

    if prefix != REFRESH_TOKEN_PREFIX || version_segment != REFRESH_TOKEN_VERSION {
        return Err(RefreshTokenError::InvalidFormat);
    }

    let token_uuid =
        Uuid::try_parse(token_uuid_segment).map_err(|_parse| RefreshTokenError::InvalidFormat)?;

    let secret = decode_secret_hex(secret_hex).ok_or(RefreshTokenError::InvalidSecretEncoding)?;

    Ok(ParsedRefreshToken {
        token_uuid,
        secret: RefreshTokenSecret::from_bytes(secret),
    })
}

/// SHA-256 hex digest of the raw token, the only form the server stores.
#[must_use]
pub fn digest_refresh_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

fn encode_secret_hex(secret: &[u8; REFRESH_TOKEN_SECRET_BYTES]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    let mut encoded = String::with_capacity(REFRESH_TOKEN_SECRET_HEX_CHARS);

    for byte in secret {
        encoded.push(HEX[(byte >> 4) as usize] as char);
        encoded.push(HEX[(byte & 0x0f) as usize] as char);
    }

    encoded
}

fn decode_secret_hex(secret_hex: &str) -> Option<[u8; REFRESH_TOKEN_SECRET_BYTES]> {
    if secret_hex.len() != REFRESH_TOKEN_SECRET_HEX_CHARS {
        return None;
    }

    let mut secret = [0_u8; REFRESH_TOKEN_SECRET_BYTES];
    let secret_bytes = secret_hex.as_bytes();

    for (index, byte) in secret.iter_mut().enumerate() {
        let hi = decode_hex_nibble(*secret_bytes.get(index * 2)?)?;
        let lo = decode_hex_nibble(*secret_bytes.get((index * 2) + 1)?)?;

        *byte = (hi << 4) | lo;
    }

    Some(secret)
}

fn decode_hex_nibble(value: u8) -> Option<u8> {
    match value {
        b'0'..=b'9' => Some(value - b'0'),
        b'a'..=b'f' => Some(value - b'a' + 10),
        b'A'..=b'F' => Some(value - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format_round_trip() {
        let token_uuid = Uuid::nil();
        let secret = RefreshTokenSecret::from_bytes([0xAB; REFRESH_TOKEN_SECRET_BYTES]);
        let token = format_refresh_token(token_uuid, &secret);
        let parsed = parse_refresh_token(&token).expect("token should parse");

        assert_eq!(parsed.token_uuid, token_uuid);
        assert_eq!(parsed.secret.as_bytes(), secret.as_bytes());
    }

    #[test]
    fn parse_rejects_invalid_prefix() {
        assert!(parse_refresh_token("nope_v1_00000000000000000000000000000000.aa").is_err());
    }

    #[test]
    fn parse_rejects_truncated_secret() {
        let token = format!("fr_v1_{}.abcd", Uuid::nil().simple());

        assert!(matches!(
            parse_refresh_token(&token),
            Err(RefreshTokenError::InvalidSecretEncoding)
        ));
    }

    #[test]
    fn digest_is_deterministic_and_token_specific() {
        let secret = RefreshTokenSecret::from_bytes([0xCD; REFRESH_TOKEN_SECRET_BYTES]);
        let token_a = format_refresh_token(Uuid::nil(), &secret);
        let token_b = format_refresh_token(Uuid::max(), &secret);

        assert_eq!(
            digest_refresh_token(&token_a),
            digest_refresh_token(&token_a),
            "digest must be deterministic"
        );
        assert_ne!(
            digest_refresh_token(&token_a),
            digest_refresh_token(&token_b),
            "distinct tokens must digest differently"
        );
    }

    #[test]
    fn generated_secrets_differ() {
        let a = generate_refresh_token_secret();
        let b = generate_refresh_token_secret();

        assert_ne!(a.as_bytes(), b.as_bytes(), "secrets must be random");
    }
}
