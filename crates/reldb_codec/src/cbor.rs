//! CBOR encoder.

use crate::error::{CodecError, CodecResult};
use crate::{Encoder, Value};

/// CBOR encoder backed by `ciborium`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CborEncoder;

impl Encoder for CborEncoder {
    fn name(&self) -> &'static str {
        "cbor"
    }

    fn encode(&self, value: &Value) -> CodecResult<Vec<u8>> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(value, &mut bytes)
            .map_err(|e| CodecError::encoding_failed(self.name(), e.to_string()))?;
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<Value> {
        ciborium::de::from_reader(bytes)
            .map_err(|e| CodecError::decoding_failed(self.name(), e.to_string()))
    }
}
