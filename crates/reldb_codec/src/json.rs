//! JSON encoder.

use crate::error::{CodecError, CodecResult};
use crate::{Encoder, Value};

/// Compact JSON encoder backed by `serde_json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, value: &Value) -> CodecResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| CodecError::encoding_failed(self.name(), e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<Value> {
        serde_json::from_slice(bytes)
            .map_err(|e| CodecError::decoding_failed(self.name(), e.to_string()))
    }
}
