use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration, constructed once at process start and passed
/// to the gateway. Every section and field has a default, so the config
/// file only needs to name what it overrides. The Gemini API key is the
/// one value without a usable default: it comes from the `[gemini]`
/// section or, failing that, the `GEMINI_API_KEY` environment variable,
/// and [`load_config`] refuses to return a config without one.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// Settings for the outbound Gemini `generateContent` call.
#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    /// Model identifier embedded in the request URL.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the generative language API. Overridable so tests can
    /// point the client at a local mock.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Upper bound on the outbound call, in seconds. There is no retry;
    /// a request that exceeds this is treated as failed.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// API key. Usually left empty in the file and supplied via the
    /// `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
            api_key: String::new(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash-preview-09-2025".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Load and validate configuration.
///
/// A missing config file is not an error — all fields have defaults — but
/// an unreadable or unparsable file is. After parsing, the API key is
/// resolved from the file or the `GEMINI_API_KEY` environment variable;
/// absence of the key is fatal so the process never starts serving
/// requests it cannot forward.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config: Config = match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read config file: {}", path.display()))
        }
    };

    if config.gemini.api_key.is_empty() {
        config.gemini.api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
    }
    if config.gemini.api_key.is_empty() {
        anyhow::bail!(
            "GEMINI_API_KEY not set: provide it in the environment or as gemini.api_key in {}",
            path.display()
        );
    }

    if config.gemini.model.is_empty() {
        anyhow::bail!("gemini.model must not be empty");
    }

    if config.gemini.timeout_secs == 0 {
        anyhow::bail!("gemini.timeout_secs must be > 0");
    }

    Ok(config)
}
