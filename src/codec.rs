//! Share token codec.
//!
//! A token is `percent_encode(base64(json(record)))`. Decoding is strict: any
//! structural problem discards the whole token and yields one opaque
//! [`DecodeError`], so callers can only ever show a generic message.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::models::ShareRecord;

/// Tokens longer than this are rejected before any decoding work.
pub const MAX_TOKEN_LEN: usize = 4096;

#[derive(Debug, thiserror::Error)]
#[error("Invalid share data")]
pub struct DecodeError;

/// Encode a record into a URL-safe token. Never fails for a well-formed record.
pub fn encode(record: &ShareRecord) -> String {
    // Serializing a struct of strings, integers and unit enums cannot fail
    let json = serde_json::to_vec(record).unwrap_or_default();
    let b64 = STANDARD.encode(json);
    urlencoding::encode(&b64).into_owned()
}

/// Decode and validate a token produced by [`encode`].
pub fn decode(token: &str) -> Result<ShareRecord, DecodeError> {
    if token.is_empty() || token.len() > MAX_TOKEN_LEN {
        tracing::debug!("Rejecting share token of length {}", token.len());
        return Err(DecodeError);
    }

    let b64 = urlencoding::decode(token).map_err(|e| {
        tracing::debug!("Share token percent-decoding failed: {}", e);
        DecodeError
    })?;

    let bytes = STANDARD.decode(b64.as_bytes()).map_err(|e| {
        tracing::debug!("Share token base64 decoding failed: {}", e);
        DecodeError
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!("Share token payload rejected: {}", e);
        DecodeError
    })
}
