//! Unified OpenAI-compatible chat provider.
//!
//! A single struct that handles chat completions for every configured
//! backend; providers differ only by endpoint URL, auth style, and API key.

use async_trait::async_trait;
use lectern_core::config::LecternConfig;
use lectern_core::error::{LecternError, Result};
use lectern_core::traits::{GenerateParams, Provider};
use lectern_core::types::{Message, ProviderResponse};
use serde_json::{Value, json};

use crate::registry::{AuthStyle, ProviderConfig};

/// A chat completions client for any OpenAI-compatible API.
pub struct ChatProvider {
    /// Provider name (e.g., "openai", "groq").
    name: String,
    api_key: String,
    base_url: String,
    chat_path: String,
    auth_style: AuthStyle,
    client: reqwest::Client,
}

impl ChatProvider {
    /// Create from a registry entry + config.
    ///
    /// API key resolution: `config.api_key` > env vars (in registry order) > empty.
    pub fn from_registry(registry: &ProviderConfig, config: &LecternConfig) -> Self {
        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            registry
                .env_keys
                .iter()
                .find_map(|key| std::env::var(key).ok())
                .unwrap_or_default()
        };

        Self {
            name: registry.name.to_string(),
            api_key,
            base_url: registry.base_url.to_string(),
            chat_path: registry.chat_path.to_string(),
            auth_style: registry.auth_style,
            client: reqwest::Client::new(),
        }
    }

    /// Create for a custom endpoint (`"custom:https://my-server.com/v1"`).
    pub fn custom(endpoint: &str, config: &LecternConfig) -> Self {
        let base_url = endpoint
            .strip_prefix("custom:")
            .unwrap_or(endpoint)
            .trim_end_matches('/')
            .to_string();

        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            std::env::var("LECTERN_API_KEY").unwrap_or_default()
        };

        let auth_style = if api_key.is_empty() { AuthStyle::None } else { AuthStyle::Bearer };

        Self {
            name: "custom".to_string(),
            api_key,
            base_url,
            chat_path: "/chat/completions".to_string(),
            auth_style,
            client: reqwest::Client::new(),
        }
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_style {
            AuthStyle::Bearer if !self.api_key.is_empty() => {
                req.header("Authorization", format!("Bearer {}", self.api_key))
            }
            _ => req,
        }
    }
}

#[async_trait]
impl Provider for ChatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> Result<ProviderResponse> {
        if self.auth_style != AuthStyle::None && self.api_key.is_empty() {
            return Err(LecternError::ApiKeyMissing(self.name.clone()));
        }

        let body = json!({
            "model": params.model,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
            "messages": messages,
        });

        let url = format!("{}{}", self.base_url, self.chat_path);
        let req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        let req = self.apply_auth(req);

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                LecternError::Timeout(format!("{} did not answer in time ({url})", self.name))
            } else {
                LecternError::Http(format!("{} connection failed ({url}): {e}", self.name))
            }
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(LecternError::Provider(format!(
                "{} API error {status}: {text}",
                self.name
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| LecternError::Provider(format!("Invalid JSON response: {e}")))?;

        let choice = json["choices"]
            .get(0)
            .ok_or_else(|| LecternError::Provider("No choices in response".into()))?;

        Ok(ProviderResponse {
            content: choice["message"]["content"].as_str().map(String::from),
            finish_reason: choice["finish_reason"].as_str().map(String::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::get_provider_config;

    fn config_with_key(key: &str) -> LecternConfig {
        LecternConfig { api_key: key.into(), ..LecternConfig::default() }
    }

    #[test]
    fn test_config_key_wins_over_env() {
        let registry = get_provider_config("openai").unwrap();
        let provider = ChatProvider::from_registry(registry, &config_with_key("sk-config"));
        assert_eq!(provider.api_key, "sk-config");
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_custom_endpoint_parsing() {
        let provider =
            ChatProvider::custom("custom:https://my-server.com/v1/", &config_with_key("k"));
        assert_eq!(provider.base_url, "https://my-server.com/v1");
        assert_eq!(provider.name(), "custom");
        assert_eq!(provider.auth_style, AuthStyle::Bearer);
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let registry = get_provider_config("openai").unwrap();
        let mut provider = ChatProvider::from_registry(registry, &LecternConfig::default());
        provider.api_key = String::new(); // ignore any ambient env key

        let params = GenerateParams { model: "gpt-4o-mini".into(), temperature: 0.7, max_tokens: 64 };
        let err = provider.chat(&[Message::user("hi")], &params).await.unwrap_err();
        assert!(matches!(err, LecternError::ApiKeyMissing(_)));
    }
}
