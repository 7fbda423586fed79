//! The generic configuration object wrapping a provider and a codec.

use crate::codec::Codec;
use crate::error::{ConfigError, Result};
use crate::notify::ChangeKind;
use crate::provider::Provider;
use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// The current state of a configuration document.
struct Snapshot {
    raw: Vec<u8>,
    document: serde_json::Value,
}

/// A loaded configuration document.
///
/// Wraps a provider + codec pair for one key and holds the current raw bytes
/// and decoded document in a lock-free snapshot, so readers never block
/// reloads. Obtained from [`Loader::load`](crate::core::Loader::load).
///
/// # Examples
///
/// ```rust,no_run
/// use liveconf::prelude::*;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct AppConfig {
///     name: String,
/// }
///
/// # fn example() -> Result<()> {
/// let loader = Loader::new();
/// let config = loader.load("config.yaml")?;
/// let app: AppConfig = config.unmarshal()?;
/// println!("configured name: {}", app.name);
/// # Ok(())
/// # }
/// ```
pub struct Config {
    provider: Arc<dyn Provider>,
    codec: Arc<dyn Codec>,
    key: String,
    expand_env: bool,
    current: Arc<ArcSwap<Snapshot>>,
}

/// A decoded configuration update delivered by [`Config::watch`].
#[derive(Debug, Clone)]
pub struct ConfigUpdate {
    /// What happened to the document.
    pub kind: ChangeKind,
    /// The raw bytes after the change.
    pub raw: Vec<u8>,
    /// The decoded document after the change.
    pub document: serde_json::Value,
}

/// Stream of decoded configuration updates owned by one subscriber.
pub struct UpdateStream {
    rx: mpsc::Receiver<ConfigUpdate>,
}

impl UpdateStream {
    /// Receive the next update, or `None` once the stream is closed.
    pub async fn recv(&mut self) -> Option<ConfigUpdate> {
        self.rx.recv().await
    }
}

impl Config {
    /// Perform the initial read + decode for a key.
    pub(crate) fn load(
        provider: Arc<dyn Provider>,
        codec: Arc<dyn Codec>,
        key: &str,
        expand_env: bool,
    ) -> Result<Self> {
        let raw = provider.read(key)?;
        let document = decode(codec.as_ref(), &raw, expand_env)?;
        Ok(Self {
            provider,
            codec,
            key: key.to_string(),
            expand_env,
            current: Arc::new(ArcSwap::from_pointee(Snapshot { raw, document })),
        })
    }

    /// The key this configuration was loaded from.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Re-read and re-decode the document, replacing the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the read or the decode fails; the previous
    /// snapshot is kept in that case.
    pub fn reload(&self) -> Result<()> {
        let raw = self.provider.read(&self.key)?;
        let document = decode(self.codec.as_ref(), &raw, self.expand_env)?;
        self.current.store(Arc::new(Snapshot { raw, document }));
        Ok(())
    }

    /// The raw bytes of the current snapshot.
    pub fn bytes(&self) -> Vec<u8> {
        self.current.load().raw.clone()
    }

    /// The decoded document of the current snapshot.
    pub fn document(&self) -> serde_json::Value {
        self.current.load().document.clone()
    }

    /// Deserialize the current snapshot into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Deserialize`] if the document does not match
    /// the target type.
    pub fn unmarshal<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.document())
            .map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Subscribe to decoded updates of this document.
    ///
    /// Spawns a task that decodes every change event from the provider. A
    /// successfully decoded change replaces the current snapshot and is
    /// forwarded on the returned stream; a change that fails to decode is
    /// logged and skipped, keeping the previous snapshot. The stream ends
    /// when `cancel` fires or the provider's stream closes.
    ///
    /// Like the provider's own watch, this is an eventually-consistent view
    /// of the latest state, not a complete change log: a subscriber that
    /// stops reading loses intermediate updates.
    pub fn watch(&self, cancel: CancellationToken) -> UpdateStream {
        let mut changes = self.provider.watch(cancel, &self.key);
        let (tx, rx) = mpsc::channel(1);
        let codec = Arc::clone(&self.codec);
        let current = Arc::clone(&self.current);
        let expand_env = self.expand_env;

        tokio::spawn(async move {
            while let Some(change) = changes.recv().await {
                let document = match decode(codec.as_ref(), &change.content, expand_env) {
                    Ok(document) => document,
                    Err(err) => {
                        warn!(path = %change.path, error = %err, "ignoring undecodable update");
                        continue;
                    }
                };
                current.store(Arc::new(Snapshot {
                    raw: change.content.clone(),
                    document: document.clone(),
                }));
                let update = ConfigUpdate {
                    kind: change.kind,
                    raw: change.content,
                    document,
                };
                if tx.send(update).await.is_err() {
                    break;
                }
            }
        });

        UpdateStream { rx }
    }
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            codec: Arc::clone(&self.codec),
            key: self.key.clone(),
            expand_env: self.expand_env,
            current: Arc::clone(&self.current),
        }
    }
}

fn decode(codec: &dyn Codec, raw: &[u8], expand_env: bool) -> Result<serde_json::Value> {
    let mut document = codec.unmarshal(raw)?;
    if expand_env {
        super::expand::expand_document(&mut document);
    }
    Ok(document)
}
