//! # Lectern Agent
//!
//! The chat engine: for each question it searches the document index,
//! injects the retrieved lecture context as a system message, and asks the
//! chat provider for an answer. The conversation history itself belongs to
//! the caller (console loop or gateway); the agent is stateless per request.

use std::sync::Arc;

use lectern_core::config::LecternConfig;
use lectern_core::error::Result;
use lectern_core::traits::{Embedder, GenerateParams, Provider};
use lectern_core::types::{Message, Role};
use lectern_index::{DocumentStore, prompt};
use lectern_providers::EmbeddingClient;

/// Shared handle to the process's single document store.
pub type SharedStore = Arc<tokio::sync::Mutex<DocumentStore>>;

/// The Lectern chat engine.
pub struct Agent {
    config: LecternConfig,
    provider: Box<dyn Provider>,
    embedder: Box<dyn Embedder>,
    store: Option<SharedStore>,
}

impl Agent {
    /// Create an agent from configuration, wiring up the configured chat
    /// provider and the embeddings client.
    pub fn new(config: LecternConfig) -> Result<Self> {
        let provider = lectern_providers::create_provider(&config)?;
        let embedder: Box<dyn Embedder> =
            Box::new(EmbeddingClient::new(&config.embedding, &config.api_key)?);
        Ok(Self { config, provider, embedder, store: None })
    }

    /// Create an agent with explicit collaborators (used by tests).
    pub fn with_parts(
        config: LecternConfig,
        provider: Box<dyn Provider>,
        embedder: Box<dyn Embedder>,
    ) -> Self {
        Self { config, provider, embedder, store: None }
    }

    /// Attach the document store used for retrieval-augmented answers.
    pub fn set_store(&mut self, store: SharedStore) {
        self.store = Some(store);
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model_name(&self) -> &str {
        &self.config.model
    }

    /// Generate one assistant reply for the given conversation.
    ///
    /// `history` must end with the user's latest message; the caller keeps
    /// ownership of it and appends the returned reply itself, so a failed
    /// call leaves the history exactly as it was.
    pub async fn generate_response(&self, history: &[Message]) -> Result<String> {
        let mut messages = vec![Message::system(&self.config.system_prompt)];

        // Retrieval phase: inject lecture context for the latest question.
        // A retrieval failure degrades to a context-free answer; it never
        // fails the chat turn.
        if let Some(query) = latest_user_message(history) {
            if let Some(context) = self.search_context(query).await {
                messages.push(Message::system(context));
            }
        }

        messages.extend(history.iter().cloned());

        let params = GenerateParams {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self.provider.chat(&messages, &params).await?;
        Ok(response
            .content
            .unwrap_or_else(|| "I'm not sure how to respond.".into()))
    }

    /// Search the document store and assemble the context system prompt.
    async fn search_context(&self, query: &str) -> Option<String> {
        let store = self.store.as_ref()?;
        let store = store.lock().await;
        if !store.has_content() {
            return None;
        }

        match store
            .search(query, self.embedder.as_ref(), self.config.retrieval.top_k)
            .await
        {
            Ok(results) if results.is_empty() => None,
            Ok(results) => {
                tracing::debug!(
                    "Retrieved {} chunk(s) for context (best score {:.3})",
                    results.len(),
                    results[0].score
                );
                Some(prompt::build_system_prompt(results.iter().map(|r| &r.chunk)))
            }
            Err(e) => {
                tracing::warn!("Context retrieval failed, answering without it: {e}");
                None
            }
        }
    }
}

fn latest_user_message(history: &[Message]) -> Option<&str> {
    history
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
}
