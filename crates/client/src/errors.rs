//! Client errors.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The session could not be silently refreshed. The caller must
    /// re-authenticate; this is never retried.
    #[error("session expired, sign in again")]
    SessionExpired,

    #[error("request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("transport error")]
    Transport(#[source] reqwest::Error),

    #[error("storage error")]
    Storage(#[source] io::Error),

    #[error("malformed payload")]
    Decode(#[source] serde_json::Error),

    #[error("internal client error: {0}")]
    Internal(&'static str),
}
