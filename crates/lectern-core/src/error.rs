//! Lectern error type.

use thiserror::Error;

/// All errors surfaced by Lectern crates.
#[derive(Debug, Error)]
pub enum LecternError {
    /// Configuration could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// Source text was empty or produced no usable chunks.
    #[error("Content error: {0}")]
    Content(String),

    /// The persisted document index is unreadable or inconsistent.
    #[error("Index error: {0}")]
    Index(String),

    /// No API key configured for the named provider.
    #[error("Missing API key for '{0}'. Export LECTERN_API_KEY or the provider's key variable.")]
    ApiKeyMissing(String),

    /// A remote call exceeded its deadline.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Transport-level HTTP failure (connection, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The remote provider answered, but with an error or an unusable body.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Unknown provider name in the configuration.
    #[error("Unknown provider: '{0}'")]
    ProviderNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, LecternError>;
