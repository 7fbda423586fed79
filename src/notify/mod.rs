//! Filesystem-backed change notification.
//!
//! One detector task per provider multiplexes native filesystem events across
//! all watched files, deduplicates spurious events by modification time, and
//! fans out change notifications to any number of independent subscribers
//! with bounded backpressure and cancellation.

mod broadcast;
mod registry;
mod watcher;

pub use broadcast::{ChangeEvent, ChangeKind, WatchStream};

pub(crate) use broadcast::DEFAULT_PUBLISH_TIMEOUT;
pub(crate) use registry::{WatchRegistry, canonical_path};
pub(crate) use watcher::{FsEventSource, run_detector};
