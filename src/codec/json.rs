//! JSON codec.

use super::Codec;
use crate::error::{ConfigError, Result};

/// Codec for JSON documents, registered as "json".
///
/// # Examples
///
/// ```rust
/// use liveconf::codec::{Codec, JsonCodec};
///
/// let doc = JsonCodec.unmarshal(br#"{"name": "hello"}"#).unwrap();
/// assert_eq!(doc["name"], "hello");
/// ```
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn unmarshal(&self, data: &[u8]) -> Result<serde_json::Value> {
        serde_json::from_slice(data).map_err(|e| ConfigError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unmarshal_object() {
        let doc = JsonCodec
            .unmarshal(br#"{"name": "hello", "port": 8080}"#)
            .unwrap();
        assert_eq!(doc, json!({"name": "hello", "port": 8080}));
    }

    #[test]
    fn test_unmarshal_invalid() {
        let result = JsonCodec.unmarshal(b"{not json");
        assert!(matches!(result, Err(ConfigError::Decode(_))));
    }
}
