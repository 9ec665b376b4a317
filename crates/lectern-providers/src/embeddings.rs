//! Embedding client for OpenAI-compatible `/embeddings` endpoints.

use async_trait::async_trait;
use lectern_core::config::EmbeddingConfig;
use lectern_core::error::{LecternError, Result};
use lectern_core::traits::Embedder;
use serde_json::{Value, json};

/// Batched text-to-vector client.
///
/// One `reqwest::Client` (and its connection pool) per instance, reused for
/// every batch and released when the client is dropped. Calls are never
/// retried here; a transient failure surfaces to the ingestion or search
/// caller as a terminal error for that call.
pub struct EmbeddingClient {
    model: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl EmbeddingClient {
    /// Build a client from config; the API key comes from `api_key` when
    /// non-empty, else `LECTERN_API_KEY` / `OPENAI_API_KEY`.
    pub fn new(config: &EmbeddingConfig, api_key: &str) -> Result<Self> {
        let api_key = if api_key.is_empty() {
            std::env::var("LECTERN_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .unwrap_or_default()
        } else {
            api_key.to_string()
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LecternError::Http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            model: config.model.clone(),
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.api_key.is_empty() {
            return Err(LecternError::ApiKeyMissing("embeddings".into()));
        }

        let url = format!("{}/embeddings", self.base_url);
        let body = json!({ "model": self.model, "input": texts });

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LecternError::Timeout(
                        "The embeddings API did not answer in time. Please try again later."
                            .into(),
                    )
                } else {
                    LecternError::Http(format!("Embeddings request failed ({url}): {e}"))
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(LecternError::Provider(format!(
                "Embeddings API error {status}: {text}"
            )));
        }

        let json: Value = resp.json().await.map_err(|e| {
            LecternError::Provider(format!("Invalid JSON from the embeddings API: {e}"))
        })?;

        parse_embeddings(&json, texts.len())
    }
}

/// Extract the vectors from an `/embeddings` response body.
///
/// Anything off about the shape is a `Provider` error: missing `data`
/// array, a count that does not match the inputs, or a non-numeric value
/// inside an embedding. Vectors are never silently shortened.
fn parse_embeddings(payload: &Value, expected: usize) -> Result<Vec<Vec<f32>>> {
    let data = payload["data"].as_array().ok_or_else(|| {
        LecternError::Provider("The embeddings API returned an unexpected response format".into())
    })?;
    if data.len() != expected {
        return Err(LecternError::Provider(format!(
            "The embeddings API returned {} embedding(s) for {expected} input(s)",
            data.len()
        )));
    }

    let mut embeddings = Vec::with_capacity(data.len());
    for item in data {
        let vector = item["embedding"].as_array().ok_or_else(|| {
            LecternError::Provider(
                "The embeddings API returned an unexpected embedding payload".into(),
            )
        })?;
        let mut values = Vec::with_capacity(vector.len());
        for value in vector {
            let value = value.as_f64().ok_or_else(|| {
                LecternError::Provider(
                    "The embeddings API returned a non-numeric embedding value".into(),
                )
            })?;
            values.push(value as f32);
        }
        embeddings.push(values);
    }
    Ok(embeddings)
}
