//! Canonical path registry with modification-time deduplication.

use super::broadcast::Broadcaster;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// State tracked for one registered path.
struct WatchEntry {
    /// The path exactly as the caller first spelled it.
    origin: String,
    /// Modification time (unix seconds) of the last published change.
    mod_time: i64,
    broadcaster: Arc<Broadcaster>,
}

/// Registry of watched paths, keyed by canonical path.
///
/// A single mutex guards entry lookup and mod-time updates. Entries are
/// created on first registration and live for the provider's lifetime; the
/// expected working set is a small, static set of configuration files.
pub(crate) struct WatchRegistry {
    entries: Mutex<HashMap<PathBuf, WatchEntry>>,
    publish_timeout: Duration,
}

impl WatchRegistry {
    pub(crate) fn new(publish_timeout: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            publish_timeout,
        }
    }

    /// Create the entry for a path if absent and return its broadcaster.
    ///
    /// Idempotent: registering an already-known path keeps the existing
    /// broadcaster and recorded mod-time.
    pub(crate) fn register(&self, canonical: PathBuf, origin: &str) -> Arc<Broadcaster> {
        let mut entries = self.entries.lock();
        let entry = entries.entry(canonical).or_insert_with(|| WatchEntry {
            origin: origin.to_string(),
            mod_time: 0,
            broadcaster: Arc::new(Broadcaster::new(self.publish_timeout)),
        });
        Arc::clone(&entry.broadcaster)
    }

    pub(crate) fn contains(&self, canonical: &Path) -> bool {
        self.entries.lock().contains_key(canonical)
    }

    pub(crate) fn broadcaster(&self, canonical: &Path) -> Option<Arc<Broadcaster>> {
        let entries = self.entries.lock();
        entries.get(canonical).map(|e| Arc::clone(&e.broadcaster))
    }

    /// Whether an observed modification time marks a genuine change.
    ///
    /// Only a strictly newer timestamp counts; equal or older timestamps are
    /// duplicate or stale events. Unregistered paths are never genuine.
    pub(crate) fn is_genuine(&self, canonical: &Path, mod_time: i64) -> bool {
        let entries = self.entries.lock();
        entries
            .get(canonical)
            .is_some_and(|e| mod_time > e.mod_time)
    }

    /// Record a genuine change, returning the original path spelling and the
    /// broadcaster to publish on.
    ///
    /// Re-checks the timestamp under the lock and returns `None` if the
    /// change is no longer strictly newer, so duplicate events between stat
    /// and commit collapse to a single publish.
    pub(crate) fn commit(
        &self,
        canonical: &Path,
        mod_time: i64,
    ) -> Option<(String, Arc<Broadcaster>)> {
        let mut entries = self.entries.lock();
        let entry = entries.get_mut(canonical)?;
        if mod_time <= entry.mod_time {
            return None;
        }
        entry.mod_time = mod_time;
        Some((entry.origin.clone(), Arc::clone(&entry.broadcaster)))
    }
}

/// Canonicalize a path into the registry's lookup key.
///
/// Resolves through the filesystem when the path exists (covering symlinked
/// locations such as `/tmp` on macOS); otherwise falls back to joining the
/// current directory and lexically resolving `.` and `..` components.
pub(crate) fn canonical_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    normalize(&absolute)
}

/// Lexically resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut components = path.components().peekable();
    let mut normalized = if let Some(c @ Component::Prefix(..)) = components.peek().copied() {
        components.next();
        PathBuf::from(c.as_os_str())
    } else {
        PathBuf::new()
    };
    for component in components {
        match component {
            Component::Prefix(..) => {}
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_resolves_dots() {
        assert_eq!(
            normalize(Path::new("/etc/./app/../app/config.yaml")),
            PathBuf::from("/etc/app/config.yaml")
        );
        assert_eq!(
            normalize(Path::new("/etc/app/")),
            PathBuf::from("/etc/app")
        );
    }

    #[test]
    fn test_canonical_path_spellings_agree() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("a")).unwrap();
        let config_path = temp_dir.path().join("a/config.yaml");
        fs::write(&config_path, "name: hello").unwrap();

        let spelled = temp_dir.path().join("./a/../a/config.yaml");
        assert_eq!(canonical_path(&spelled), canonical_path(&config_path));
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = WatchRegistry::new(Duration::from_secs(1));
        let canonical = PathBuf::from("/etc/app/config.yaml");

        let first = registry.register(canonical.clone(), "config.yaml");
        assert!(registry.commit(&canonical, 100).is_some());

        // Re-registration keeps the broadcaster and the recorded mod-time.
        let second = registry.register(canonical.clone(), "config.yaml");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!registry.is_genuine(&canonical, 100));
    }

    #[test]
    fn test_mod_time_dedup() {
        let registry = WatchRegistry::new(Duration::from_secs(1));
        let canonical = PathBuf::from("/etc/app/config.yaml");
        registry.register(canonical.clone(), "config.yaml");

        assert!(registry.is_genuine(&canonical, 1));
        let (origin, _) = registry.commit(&canonical, 100).unwrap();
        assert_eq!(origin, "config.yaml");

        // Equal and older timestamps are duplicates.
        assert!(!registry.is_genuine(&canonical, 100));
        assert!(registry.commit(&canonical, 100).is_none());
        assert!(registry.commit(&canonical, 99).is_none());

        // Strictly newer timestamps publish again.
        assert!(registry.commit(&canonical, 101).is_some());
    }

    #[test]
    fn test_unregistered_path_is_never_genuine() {
        let registry = WatchRegistry::new(Duration::from_secs(1));
        let canonical = PathBuf::from("/etc/app/other.yaml");

        assert!(!registry.contains(&canonical));
        assert!(!registry.is_genuine(&canonical, i64::MAX));
        assert!(registry.commit(&canonical, 1).is_none());
        assert!(registry.broadcaster(&canonical).is_none());
    }
}
