//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode a value.
    #[error("encoding failed ({encoder}): {message}")]
    EncodingFailed {
        /// Name of the encoder.
        encoder: &'static str,
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode bytes.
    #[error("decoding failed ({encoder}): {message}")]
    DecodingFailed {
        /// Name of the encoder.
        encoder: &'static str,
        /// Description of the decoding error.
        message: String,
    },

    /// A value could not be converted to or from its record type.
    #[error("record conversion failed: {message}")]
    Conversion {
        /// Description of the conversion error.
        message: String,
    },
}

impl CodecError {
    /// Create an encoding failed error.
    pub fn encoding_failed(encoder: &'static str, message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            encoder,
            message: message.into(),
        }
    }

    /// Create a decoding failed error.
    pub fn decoding_failed(encoder: &'static str, message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            encoder,
            message: message.into(),
        }
    }

    /// Create a conversion error.
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }
}
