//! Filesystem-backed configuration provider.

use super::Provider;
use crate::error::Result;
use crate::notify::{
    DEFAULT_PUBLISH_TIMEOUT, FsEventSource, WatchRegistry, WatchStream, canonical_path,
    run_detector,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::warn;

/// Configuration provider backed by the local filesystem, registered as
/// "file".
///
/// Reading a path registers it for change notifications: the provider watches
/// the file's *parent directory* through a single native watcher shared by
/// all registered paths, so atomic replace/rename-style config deployments
/// are observed. Subscribers attached via [`watch`](Provider::watch) receive
/// a [`ChangeEvent`](crate::notify::ChangeEvent) for every genuine change
/// (strictly newer modification time) of the file.
///
/// If the native watcher cannot be constructed the provider degrades
/// gracefully: reads keep working and every watch returns an
/// immediately-closed stream.
///
/// # Examples
///
/// ```rust,no_run
/// use liveconf::provider::{FileProvider, Provider};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> liveconf::error::Result<()> {
/// let provider = FileProvider::new();
/// let content = provider.read("config.yaml")?;
///
/// let cancel = CancellationToken::new();
/// let mut changes = provider.watch(cancel.clone(), "config.yaml");
/// while let Some(change) = changes.recv().await {
///     println!("{} changed ({} bytes)", change.path, change.content.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct FileProvider {
    registry: Arc<WatchRegistry>,
    source: Option<FsEventSource>,
    /// Cancels the detector task when the provider is dropped.
    _detector: Option<DropGuard>,
}

impl FileProvider {
    /// Create a file provider with default settings.
    ///
    /// Must be called from within a tokio runtime; the change detector task
    /// is spawned on it.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for configuring a file provider.
    pub fn builder() -> FileProviderBuilder {
        FileProviderBuilder::new()
    }
}

impl Default for FileProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for FileProvider {
    fn name(&self) -> &'static str {
        "file"
    }

    fn read(&self, key: &str) -> Result<Vec<u8>> {
        if let Some(source) = &self.source {
            let canonical = canonical_path(Path::new(key));
            let dir = canonical
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| canonical.clone());
            source.watch_dir(&dir)?;
            self.registry.register(canonical, key);
        }
        Ok(std::fs::read(key)?)
    }

    fn watch(&self, cancel: CancellationToken, key: &str) -> WatchStream {
        if self.source.is_none() {
            return WatchStream::closed();
        }
        let canonical = canonical_path(Path::new(key));
        match self.registry.broadcaster(&canonical) {
            Some(broadcaster) => broadcaster.subscribe(cancel),
            None => WatchStream::closed(),
        }
    }
}

/// Builder for [`FileProvider`].
///
/// # Examples
///
/// ```rust,no_run
/// use liveconf::provider::FileProvider;
/// use std::time::Duration;
///
/// # async fn example() {
/// let provider = FileProvider::builder()
///     .publish_timeout(Duration::from_secs(5))
///     .build();
/// # }
/// ```
pub struct FileProviderBuilder {
    publish_timeout: Duration,
    watch: bool,
}

impl FileProviderBuilder {
    fn new() -> Self {
        Self {
            publish_timeout: DEFAULT_PUBLISH_TIMEOUT,
            watch: true,
        }
    }

    /// How long a change notification waits for each subscriber before being
    /// dropped for that subscriber (default 10s).
    pub fn publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout = timeout;
        self
    }

    /// Disable the native watcher entirely.
    ///
    /// Reads keep working; every watch returns an immediately-closed stream.
    /// This is the same degraded mode the provider falls back to when the
    /// native watcher cannot be constructed.
    pub fn without_watcher(mut self) -> Self {
        self.watch = false;
        self
    }

    /// Build the provider, spawning its detector task.
    pub fn build(self) -> FileProvider {
        let registry = Arc::new(WatchRegistry::new(self.publish_timeout));
        if !self.watch {
            return FileProvider {
                registry,
                source: None,
                _detector: None,
            };
        }
        match FsEventSource::new() {
            Ok((source, events)) => {
                let shutdown = CancellationToken::new();
                tokio::spawn(run_detector(
                    Arc::clone(&registry),
                    events,
                    shutdown.child_token(),
                ));
                FileProvider {
                    registry,
                    source: Some(source),
                    _detector: Some(shutdown.drop_guard()),
                }
            }
            Err(err) => {
                warn!(error = %err, "file watcher unavailable, change notifications disabled");
                FileProvider {
                    registry,
                    source: None,
                    _detector: None,
                }
            }
        }
    }
}
