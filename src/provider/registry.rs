//! Provider trait and the name-keyed provider registry.

use crate::error::Result;
use crate::notify::WatchStream;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Trait for configuration backing stores.
///
/// A provider hands out the current bytes of a named document and, when it
/// can observe the store mutating, a stream of change notifications for it.
pub trait Provider: Send + Sync {
    /// The name this provider is registered under (e.g. "file").
    fn name(&self) -> &'static str;

    /// Read the current content of a document.
    ///
    /// For watch-capable providers this also registers the document for
    /// change notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or cannot be
    /// registered for watching.
    fn read(&self, key: &str) -> Result<Vec<u8>>;

    /// Subscribe to changes of a document.
    ///
    /// Returns an immediately-closed stream when the provider has nothing to
    /// watch for this key; absence of a prior [`read`](Provider::read) is
    /// not an error. The stream ends when `cancel` fires.
    fn watch(&self, cancel: CancellationToken, key: &str) -> WatchStream;
}

/// Registry mapping provider names to provider instances.
///
/// Like [`CodecRegistry`](crate::codec::CodecRegistry), this is an explicit
/// value handed to the [`Loader`](crate::core::Loader) so tests can install
/// fakes without process-wide state.
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: HashMap<&'static str, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Create a registry holding the default file provider.
    ///
    /// Must be called from within a tokio runtime; constructing the file
    /// provider spawns its detector task.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::FileProvider::new()));
        registry
    }

    /// Register a provider under its own name, replacing any previous entry.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.name(), provider);
    }

    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
