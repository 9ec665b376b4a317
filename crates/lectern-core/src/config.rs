//! Lectern configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LecternError, Result};

/// Root configuration (~/.lectern/config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LecternConfig {
    /// API key override; env vars are consulted when empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_provider() -> String { "openai".into() }
fn default_model() -> String { "gpt-4o-mini".into() }
fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 1024 }
fn default_system_prompt() -> String {
    "You are Lectern, a helpful study assistant. Answer clearly and concisely.".into()
}

impl Default for LecternConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl LecternConfig {
    /// Load config from the default path, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LecternError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| LecternError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| LecternError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Lectern home directory (~/.lectern).
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".lectern")
    }

    /// Resolved index path with `~` expanded.
    pub fn index_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.retrieval.index_path).to_string())
    }
}

/// Embedding collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    /// Client-side deadline for one batch request, in seconds.
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_model() -> String { "text-embedding-3-small".into() }
fn default_embedding_endpoint() -> String { "https://api.openai.com/v1".into() }
fn default_embedding_timeout() -> u64 { 30 }

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            endpoint: default_embedding_endpoint(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

/// Retrieval index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunk window size, in words.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Overlap between consecutive chunks, in words.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// How many chunks to inject as context per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_index_path")]
    pub index_path: String,
}

fn default_chunk_size() -> usize { 600 }
fn default_chunk_overlap() -> usize { 120 }
fn default_top_k() -> usize { 3 }
fn default_index_path() -> String { "~/.lectern/document_index.json".into() }

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            index_path: default_index_path(),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 3000 }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// Load environment variables from a simple `KEY=VALUE` file if present.
///
/// The original deployment keeps its OpenAI key in a `keys.env` file next to
/// the binary. Existing environment variables are never overwritten.
pub fn load_env_file(path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if !key.is_empty() && std::env::var(key).is_err() {
            // Safety: called once at startup before any threads are spawned.
            unsafe { std::env::set_var(key, value) };
        }
    }
}
