//! Core configuration loading types.

mod config;
mod expand;
mod loader;

pub use config::{Config, ConfigUpdate, UpdateStream};
pub use loader::{LoadOptions, Loader, load};
