//! Trait seams between the agent and its remote collaborators.
//!
//! The document index and the agent are written against these traits so the
//! network-backed implementations in `lectern-providers` can be swapped for
//! stubs in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Message, ProviderResponse};

/// Sampling parameters for one chat completion request.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A chat completion backend (OpenAI-compatible API).
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider identifier ("openai", "groq", ...).
    fn name(&self) -> &str;

    /// Generate one assistant reply for the given conversation.
    async fn chat(&self, messages: &[Message], params: &GenerateParams)
    -> Result<ProviderResponse>;
}

/// A text embedding backend.
///
/// `embed` maps a batch of texts to equal-length vectors, one per input and
/// in input order. Implementations surface every failure (missing key,
/// timeout, transport, malformed response) and never retry.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Name of the embedding model producing the vectors.
    fn model_name(&self) -> &str;

    /// Embed a batch of texts in one call.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
