//! Native filesystem watcher adapter and the change detector task.

use super::broadcast::{ChangeEvent, ChangeKind};
use super::registry::{WatchRegistry, canonical_path};
use crate::error::{ConfigError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Adapter around the single native filesystem watcher a provider owns.
///
/// Watched paths are always directories: watching the parent of a registered
/// file keeps atomic replace/rename-style deployments observable. Events are
/// filtered to write-class kinds before they reach the detector.
pub(crate) struct FsEventSource {
    watcher: Mutex<RecommendedWatcher>,
    watched_dirs: Mutex<HashSet<PathBuf>>,
}

impl FsEventSource {
    /// Create the native watcher and the event channel the detector drains.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform watcher cannot be constructed (e.g.
    /// inotify instance exhaustion). Callers are expected to degrade to
    /// notification-free operation rather than fail.
    pub(crate) fn new() -> Result<(Self, mpsc::UnboundedReceiver<Event>)> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if is_write_class(&event.kind) => {
                let _ = event_tx.send(event);
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "file watcher error"),
        })
        .map_err(|e| ConfigError::Watch(format!("failed to create file watcher: {e}")))?;

        Ok((
            Self {
                watcher: Mutex::new(watcher),
                watched_dirs: Mutex::new(HashSet::new()),
            },
            event_rx,
        ))
    }

    /// Start watching a directory. Re-watching an already-watched directory
    /// is a no-op, so registrations sharing a parent cost one OS watch.
    pub(crate) fn watch_dir(&self, dir: &Path) -> Result<()> {
        let mut dirs = self.watched_dirs.lock();
        if dirs.contains(dir) {
            return Ok(());
        }
        self.watcher
            .lock()
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::Watch(format!("{}: {e}", dir.display())))?;
        dirs.insert(dir.to_path_buf());
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn watched_dir_count(&self) -> usize {
        self.watched_dirs.lock().len()
    }
}

fn is_write_class(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Modify(_) | EventKind::Create(_))
}

/// Detector loop: one task per provider.
///
/// Drains the native event stream and turns raw filesystem events into
/// published change notifications. Runs until the provider is dropped or the
/// event source closes.
pub(crate) async fn run_detector(
    registry: Arc<WatchRegistry>,
    mut events: mpsc::UnboundedReceiver<Event>,
    shutdown: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = events.recv() => match received {
                Some(event) => event,
                None => break,
            },
        };
        for path in &event.paths {
            handle_change(&registry, path).await;
        }
    }
    debug!("change detector stopped");
}

/// Decide whether one event path is a genuine change and publish it if so.
///
/// Transient stat/read failures are logged and absorbed; the next genuine
/// write will still be observed.
async fn handle_change(registry: &WatchRegistry, path: &Path) {
    let canonical = canonical_path(path);
    if !registry.contains(&canonical) {
        // Directory-level watching also observes unregistered siblings.
        return;
    }

    let metadata = match tokio::fs::metadata(&canonical).await {
        Ok(metadata) => metadata,
        Err(err) => {
            debug!(path = %canonical.display(), error = %err, "stat failed, ignoring event");
            return;
        }
    };
    let mod_time = match metadata.modified() {
        Ok(time) => unix_seconds(time),
        Err(err) => {
            debug!(path = %canonical.display(), error = %err, "no modification time, ignoring event");
            return;
        }
    };
    if !registry.is_genuine(&canonical, mod_time) {
        return;
    }

    let content = match tokio::fs::read(&canonical).await {
        Ok(content) => content,
        Err(err) => {
            warn!(path = %canonical.display(), error = %err, "failed to read changed file");
            return;
        }
    };
    let Some((origin, broadcaster)) = registry.commit(&canonical, mod_time) else {
        return;
    };

    let delivered = broadcaster
        .publish(ChangeEvent {
            path: origin,
            kind: ChangeKind::Put,
            content,
        })
        .await;
    debug!(path = %canonical.display(), mod_time, delivered, "published change");
}

fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs() as i64,
        Err(_) => 0,
    }
}
