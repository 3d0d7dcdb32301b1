//! Wire format for flow records.
//!
//! One JSON object per datagram followed by a single newline. Decoding is
//! structural only: unknown fields are ignored, missing or mistyped fields
//! reject the whole buffer.

use thiserror::Error;

use crate::flow::record::FlowRecord;

/// A buffer that is not a well-formed flow record.
#[derive(Debug, Error)]
#[error("malformed flow record: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Serialize a record into one datagram payload.
pub fn encode(record: &FlowRecord) -> Result<Vec<u8>, serde_json::Error> {
    let mut payload = serde_json::to_vec(record)?;
    payload.push(b'\n');
    Ok(payload)
}

/// Reconstruct a record from a received datagram payload.
pub fn decode(bytes: &[u8]) -> Result<FlowRecord, DecodeError> {
    Ok(serde_json::from_slice(bytes)?)
}
