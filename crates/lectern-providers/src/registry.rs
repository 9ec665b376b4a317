//! Provider registry — maps provider names to endpoint configurations.
//!
//! Every chat backend Lectern talks to is OpenAI-compatible; providers are
//! distinguished only by base URL, auth style, and API key variables. The
//! unified `ChatProvider` uses these entries to connect to any of them.

/// How to attach auth credentials to requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// No authentication required (local servers).
    None,
}

/// Configuration for a single provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier.
    pub name: &'static str,
    /// Base URL for the API.
    pub base_url: &'static str,
    /// Path for chat completions (appended to base_url).
    pub chat_path: &'static str,
    /// Environment variable names to try for the API key (in order).
    pub env_keys: &'static [&'static str],
    pub auth_style: AuthStyle,
}

static PROVIDERS: &[ProviderConfig] = &[
    ProviderConfig {
        name: "openai",
        base_url: "https://api.openai.com/v1",
        chat_path: "/chat/completions",
        env_keys: &["LECTERN_API_KEY", "OPENAI_API_KEY"],
        auth_style: AuthStyle::Bearer,
    },
    ProviderConfig {
        name: "groq",
        base_url: "https://api.groq.com/openai/v1",
        chat_path: "/chat/completions",
        env_keys: &["LECTERN_API_KEY", "GROQ_API_KEY"],
        auth_style: AuthStyle::Bearer,
    },
    ProviderConfig {
        name: "openrouter",
        base_url: "https://openrouter.ai/api/v1",
        chat_path: "/chat/completions",
        env_keys: &["LECTERN_API_KEY", "OPENROUTER_API_KEY"],
        auth_style: AuthStyle::Bearer,
    },
    ProviderConfig {
        name: "deepseek",
        base_url: "https://api.deepseek.com/v1",
        chat_path: "/chat/completions",
        env_keys: &["LECTERN_API_KEY", "DEEPSEEK_API_KEY"],
        auth_style: AuthStyle::Bearer,
    },
    ProviderConfig {
        name: "ollama",
        base_url: "http://localhost:11434/v1",
        chat_path: "/chat/completions",
        env_keys: &[],
        auth_style: AuthStyle::None,
    },
];

/// Look up a provider's config by name.
pub fn get_provider_config(name: &str) -> Option<&'static ProviderConfig> {
    PROVIDERS.iter().find(|p| p.name == name)
}

/// All known provider names.
pub fn all_provider_names() -> Vec<&'static str> {
    PROVIDERS.iter().map(|p| p.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_providers_resolve() {
        for name in ["openai", "groq", "openrouter", "deepseek", "ollama"] {
            let cfg = get_provider_config(name).unwrap();
            assert_eq!(cfg.name, name);
            assert!(cfg.base_url.starts_with("http"));
        }
        assert!(get_provider_config("does-not-exist").is_none());
    }

    #[test]
    fn test_local_providers_need_no_auth() {
        assert_eq!(get_provider_config("ollama").unwrap().auth_style, AuthStyle::None);
        assert_eq!(get_provider_config("openai").unwrap().auth_style, AuthStyle::Bearer);
    }
}
