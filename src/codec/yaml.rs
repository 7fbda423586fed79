//! YAML codec.

use super::Codec;
use crate::error::{ConfigError, Result};

/// Codec for YAML documents, registered as "yaml".
///
/// # Examples
///
/// ```rust
/// use liveconf::codec::{Codec, YamlCodec};
///
/// let doc = YamlCodec.unmarshal(b"name: hello").unwrap();
/// assert_eq!(doc["name"], "hello");
/// ```
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn unmarshal(&self, data: &[u8]) -> Result<serde_json::Value> {
        serde_yaml::from_slice(data).map_err(|e| ConfigError::Decode(e.to_string()))
    }
}
