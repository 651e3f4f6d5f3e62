use crate::codec;
use crate::error::CodecError;

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Payload field holding a packed endpoint.
pub const ENDPOINT_FIELD: &str = "endpoint";

/// A single row held by the store.
///
/// `version` is the only conflict token. It starts wherever the seed put it and grows by exactly
/// one per successful conditional update. The `payload` is opaque application data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionedRow {
    pub key: i64,
    pub version: i64,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl VersionedRow {
    pub fn new(key: i64, version: i64) -> Self {
        Self {
            key,
            version,
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Packs `address:port` into the payload's endpoint column.
    pub fn with_endpoint(mut self, address: &str, port: i32) -> Result<Self, CodecError> {
        let packed = codec::encode(address, port)?;
        if !self.payload.is_object() {
            self.payload = serde_json::Value::Object(serde_json::Map::new());
        }
        if let serde_json::Value::Object(fields) = &mut self.payload {
            fields.insert(ENDPOINT_FIELD.to_string(), serde_json::json!(packed));
        }
        Ok(self)
    }

    /// Unpacks the endpoint column, if the payload has one.
    pub fn endpoint(&self) -> Option<Result<(IpAddr, u16), CodecError>> {
        let packed = self.payload.get(ENDPOINT_FIELD)?;
        let bytes: Vec<u8> = match serde_json::from_value(packed.clone()) {
            Ok(bytes) => bytes,
            Err(e) => return Some(Err(CodecError::MalformedColumn(e.to_string()))),
        };
        Some(codec::decode(&bytes))
    }
}
