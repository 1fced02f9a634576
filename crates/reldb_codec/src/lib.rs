//! # RelDB Codec
//!
//! Pluggable value encoders for RelDB.
//!
//! Records are converted to a structured [`Value`] tree through serde and
//! then turned into bytes by an [`Encoder`]. Keeping the encoder behind a
//! trait object lets a store pick its on-disk format at open time while the
//! record types stay plain serde types.
//!
//! ## Available Encoders
//!
//! - [`JsonEncoder`] - compact JSON, the default
//! - [`CborEncoder`] - CBOR via `ciborium`, smaller and faster to parse
//!
//! ## Usage
//!
//! ```
//! use reldb_codec::{marshal, unmarshal, JsonEncoder};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Note {
//!     title: String,
//! }
//!
//! let note = Note { title: "hello".into() };
//! let bytes = marshal(&JsonEncoder, &note).unwrap();
//! let decoded: Note = unmarshal(&JsonEncoder, &bytes).unwrap();
//! assert_eq!(note, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cbor;
mod error;
mod json;

pub use cbor::CborEncoder;
pub use error::{CodecError, CodecResult};
pub use json::JsonEncoder;
pub use serde_json::Value;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Turns structured values into bytes and back.
///
/// Implementations must be deterministic for a given value and must decode
/// everything they encode.
pub trait Encoder: Send + Sync + fmt::Debug {
    /// Short name used in error messages.
    fn name(&self) -> &'static str;

    /// Encodes a value to bytes.
    fn encode(&self, value: &Value) -> CodecResult<Vec<u8>>;

    /// Decodes bytes produced by [`Encoder::encode`].
    fn decode(&self, bytes: &[u8]) -> CodecResult<Value>;
}

/// Encodes a serde record with `encoder`.
///
/// # Errors
///
/// Returns an error if the record cannot be represented as a [`Value`] or
/// the encoder fails.
pub fn marshal<T>(encoder: &dyn Encoder, record: &T) -> CodecResult<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(record).map_err(|e| CodecError::conversion(e.to_string()))?;
    encoder.encode(&value)
}

/// Decodes a serde record with `encoder`.
///
/// # Errors
///
/// Returns an error if the bytes cannot be decoded or do not describe a `T`.
pub fn unmarshal<T>(encoder: &dyn Encoder, bytes: &[u8]) -> CodecResult<T>
where
    T: DeserializeOwned,
{
    let value = encoder.decode(bytes)?;
    serde_json::from_value(value).map_err(|e| CodecError::conversion(e.to_string()))
}
