//! # Lectern Providers
//!
//! Remote collaborator clients: a unified OpenAI-compatible chat completion
//! provider and the embeddings client. Both are plain reqwest clients; the
//! rest of the system only sees the `Provider` and `Embedder` traits.

pub mod chat;
pub mod embeddings;
pub mod registry;

use lectern_core::config::LecternConfig;
use lectern_core::error::{LecternError, Result};
use lectern_core::traits::Provider;

pub use embeddings::EmbeddingClient;

/// Create a chat provider from configuration.
pub fn create_provider(config: &LecternConfig) -> Result<Box<dyn Provider>> {
    match config.provider.as_str() {
        // Custom endpoint: "custom:https://my-server.com/v1"
        other if other.starts_with("custom:") => {
            Ok(Box::new(chat::ChatProvider::custom(other, config)))
        }
        name => {
            let registry = registry::get_provider_config(name)
                .ok_or_else(|| LecternError::ProviderNotFound(name.into()))?;
            Ok(Box::new(chat::ChatProvider::from_registry(registry, config)))
        }
    }
}
