//! Error types for liveconf.

/// Result type alias for liveconf operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error while reading a configuration document.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to set up or use the filesystem watcher.
    #[error("Failed to watch: {0}")]
    Watch(String),

    /// Failed to decode configuration bytes into a document.
    #[error("Failed to decode configuration: {0}")]
    Decode(String),

    /// Failed to deserialize the decoded document into the target type.
    #[error("Failed to deserialize configuration: {0}")]
    Deserialize(String),

    /// No codec registered under the requested name.
    #[error("Unknown codec: {0}")]
    UnknownCodec(String),

    /// No provider registered under the requested name.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}
