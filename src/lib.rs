//! # liveconf
//!
//! Live-reloadable structured configuration with filesystem change
//! notifications.
//!
//! ## Overview
//!
//! `liveconf` loads named configuration documents from a backing store
//! (a *provider*), decodes them with a named *codec* into a generic
//! document, and can notify you when the underlying store mutates. The
//! built-in file provider shares one native filesystem watcher across all
//! registered paths, deduplicates the noisy event streams platforms emit by
//! comparing modification times, and fans genuine changes out to any number
//! of independent subscribers with bounded backpressure.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use liveconf::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct AppConfig {
//!     name: String,
//! }
//!
//! # async fn example() -> liveconf::error::Result<()> {
//! let loader = Loader::new();
//! let config = loader.load("config/app.yaml")?;
//! let app: AppConfig = config.unmarshal()?;
//! println!("configured name: {}", app.name);
//!
//! // Follow changes until the token is canceled.
//! let cancel = CancellationToken::new();
//! let mut updates = config.watch(cancel.clone());
//! while let Some(update) = updates.recv().await {
//!     let app: AppConfig = serde_json::from_value(update.document)
//!         .map_err(|e| ConfigError::Deserialize(e.to_string()))?;
//!     println!("configuration changed: {}", app.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Semantics
//!
//! - **Latest state, not an event log**: a subscriber that falls behind
//!   loses intermediate updates after a bounded timeout rather than stalling
//!   the watch subsystem. Modification times are compared at second
//!   granularity, so writes landing within the same second coalesce into at
//!   most one notification carrying the content on disk at detection time.
//! - **Graceful degradation**: when the native watcher cannot be created,
//!   reads keep working and watches return immediately-closed streams.
//!   Configuration loading is never blocked by watcher availability.
//! - **Per-path ordering**: genuine changes to one path reach each
//!   subscriber in detection order; there is no ordering across paths.

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod codec;
pub mod core;
pub mod error;
pub mod notify;
pub mod provider;

pub use crate::core::load;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::codec::{Codec, CodecRegistry};
    pub use crate::core::{Config, ConfigUpdate, LoadOptions, Loader, UpdateStream, load};
    pub use crate::error::{ConfigError, Result};
    pub use crate::notify::{ChangeEvent, ChangeKind, WatchStream};
    pub use crate::provider::{FileProvider, Provider, ProviderRegistry};
    pub use tokio_util::sync::CancellationToken;
}
