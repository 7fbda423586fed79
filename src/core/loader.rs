//! Loading configuration documents into [`Config`] objects.

use super::Config;
use crate::codec::CodecRegistry;
use crate::error::{ConfigError, Result};
use crate::provider::ProviderRegistry;
use std::path::Path;
use std::sync::OnceLock;

/// Options controlling how a document is loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Provider name to load through. Defaults to "file".
    pub provider: Option<String>,
    /// Codec name to decode with. Defaults to inference from the key's
    /// extension: `.json` selects json, anything else yaml.
    pub codec: Option<String>,
    /// Expand `$VAR`/`${VAR}` references in string values of the decoded
    /// document.
    pub expand_env: bool,
}

/// Loads configuration documents through explicit provider and codec
/// registries.
///
/// The registries are owned values rather than process-wide state, so tests
/// can construct a loader over fakes (see [`Loader::with_registries`]). For
/// the common case, [`Loader::new`] wires up the file provider and the
/// yaml/json codecs.
///
/// # Examples
///
/// ```rust,no_run
/// use liveconf::prelude::*;
///
/// # fn example() -> Result<()> {
/// let loader = Loader::new();
/// let config = loader.load("config/app.yaml")?;
/// println!("{} bytes", config.bytes().len());
/// # Ok(())
/// # }
/// ```
pub struct Loader {
    providers: ProviderRegistry,
    codecs: CodecRegistry,
}

impl Loader {
    /// Create a loader with the default registries.
    ///
    /// Must be called from within a tokio runtime; the default file provider
    /// spawns its change detector task.
    pub fn new() -> Self {
        Self::with_registries(ProviderRegistry::with_defaults(), CodecRegistry::with_defaults())
    }

    /// Create a loader over explicit registries.
    pub fn with_registries(providers: ProviderRegistry, codecs: CodecRegistry) -> Self {
        Self { providers, codecs }
    }

    /// Load a document with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider or codec is unknown, or the initial
    /// read or decode fails.
    pub fn load(&self, key: &str) -> Result<Config> {
        self.load_with(key, LoadOptions::default())
    }

    /// Load a document with explicit options.
    ///
    /// # Errors
    ///
    /// See [`Loader::load`].
    pub fn load_with(&self, key: &str, options: LoadOptions) -> Result<Config> {
        let provider_name = options.provider.as_deref().unwrap_or("file");
        let provider = self
            .providers
            .get(provider_name)
            .ok_or_else(|| ConfigError::UnknownProvider(provider_name.to_string()))?;

        let codec_name = options.codec.as_deref().unwrap_or_else(|| codec_for_key(key));
        let codec = self
            .codecs
            .get(codec_name)
            .ok_or_else(|| ConfigError::UnknownCodec(codec_name.to_string()))?;

        Config::load(provider, codec, key, options.expand_env)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Infer a codec name from the key's extension, defaulting to yaml.
fn codec_for_key(key: &str) -> &'static str {
    match Path::new(key).extension().and_then(|ext| ext.to_str()) {
        Some("json") => "json",
        _ => "yaml",
    }
}

static DEFAULT_LOADER: OnceLock<Loader> = OnceLock::new();

/// Load a document through a process-wide default [`Loader`].
///
/// A convenience for applications with a single configuration source; build
/// your own [`Loader`] when you need isolated registries (e.g. in tests).
/// The default loader is created lazily, so the first call must happen from
/// within a tokio runtime.
///
/// # Errors
///
/// See [`Loader::load`].
pub fn load(key: &str) -> Result<Config> {
    DEFAULT_LOADER.get_or_init(Loader::new).load(key)
}
