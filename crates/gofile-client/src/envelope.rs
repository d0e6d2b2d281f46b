//! Response envelope decoding

use crate::types::{Envelope, STATUS_OK};
use crate::{ClientError, Result};
use serde::de::DeserializeOwned;

/// Decode a `{status, data}` body.
///
/// Returns the payload (if any) when `status` is "ok". The HTTP status code
/// plays no part: the envelope status is the only error signal.
pub fn decode_envelope<T>(body: &[u8]) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    // Error envelopes carry arbitrary payloads, so the status goes first
    let envelope: Envelope<serde_json::Value> = serde_json::from_slice(body)?;
    if envelope.status != STATUS_OK {
        return Err(ClientError::api_status(envelope.status));
    }
    match envelope.data {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}

/// Decode an envelope whose payload is required
pub fn decode_data<T>(body: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    decode_envelope(body)?.ok_or(ClientError::MissingData)
}
