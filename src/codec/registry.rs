//! Codec trait and the name-keyed codec registry.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Trait for configuration codecs.
///
/// A codec decodes raw document bytes into a generic JSON document. Typed
/// extraction from the document is the responsibility of the caller (see
/// [`Config::unmarshal`](crate::core::Config::unmarshal)).
///
/// Implement this trait to support additional formats and register them by
/// name in a [`CodecRegistry`].
pub trait Codec: Send + Sync {
    /// The name this codec is registered under (e.g. "yaml").
    fn name(&self) -> &'static str;

    /// Decode raw bytes into a generic document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Decode`](crate::error::ConfigError::Decode) if
    /// the bytes are not valid for this format.
    fn unmarshal(&self, data: &[u8]) -> Result<serde_json::Value>;
}

/// Registry mapping codec names to codec implementations.
///
/// The registry is an explicit value passed to the [`Loader`](crate::core::Loader)
/// rather than process-wide mutable state, so tests can install fakes without
/// leaking across the process.
///
/// # Examples
///
/// ```rust
/// use liveconf::codec::CodecRegistry;
///
/// let registry = CodecRegistry::with_defaults();
/// assert!(registry.get("yaml").is_some());
/// assert!(registry.get("json").is_some());
/// assert!(registry.get("toml").is_none());
/// ```
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: HashMap<&'static str, Arc<dyn Codec>>,
}

impl CodecRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in codecs (yaml, json).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::YamlCodec));
        registry.register(Arc::new(super::JsonCodec));
        registry
    }

    /// Register a codec under its own name, replacing any previous entry.
    pub fn register(&mut self, codec: Arc<dyn Codec>) {
        self.codecs.insert(codec.name(), codec);
    }

    /// Look up a codec by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Codec>> {
        self.codecs.get(name).cloned()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UppercaseNames;

    impl Codec for UppercaseNames {
        fn name(&self) -> &'static str {
            "upper"
        }

        fn unmarshal(&self, _data: &[u8]) -> Result<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }
    }

    #[test]
    fn test_defaults_contain_builtins() {
        let registry = CodecRegistry::with_defaults();
        assert_eq!(registry.get("yaml").unwrap().name(), "yaml");
        assert_eq!(registry.get("json").unwrap().name(), "json");
    }

    #[test]
    fn test_register_custom_codec() {
        let mut registry = CodecRegistry::new();
        assert!(registry.get("upper").is_none());

        registry.register(Arc::new(UppercaseNames));
        assert!(registry.get("upper").is_some());
    }

    #[test]
    fn test_empty_registry_has_no_builtins() {
        let registry = CodecRegistry::new();
        assert!(registry.get("yaml").is_none());
    }
}
