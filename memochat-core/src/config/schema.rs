//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Instruction placed ahead of every conversation sent to the model
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful Assistant";

/// Root configuration for memochat
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Provider credentials
    #[serde(default)]
    pub secrets: SecretsConfig,
    /// Chat defaults
    #[serde(default)]
    pub chat: ChatDefaults,
    /// Completion endpoint settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Page server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Credentials read once at startup.
///
/// Both keys are required. `langchain_api_key` is not sent anywhere by
/// memochat itself; it is validated so deployments carrying the same secret
/// set behave identically.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct SecretsConfig {
    #[serde(default)]
    pub langchain_api_key: String,
    #[serde(default)]
    pub groq_api_key: String,
}

impl std::fmt::Debug for SecretsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsConfig")
            .field("langchain_api_key", &redact(&self.langchain_api_key))
            .field("groq_api_key", &redact(&self.groq_api_key))
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.trim().is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}

/// Default generation settings, preselected in the sidebar and CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatDefaults {
    /// Default model id
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature, [0.0, 1.0]
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Completion token limit, [100, 500]
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Leading system instruction
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Upper bound on one completion call in seconds; 0 disables it
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    "gemma2-9b-it".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    250
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ChatDefaults {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Completion endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    /// Overrides the provider's default API base
    #[serde(default)]
    pub api_base: Option<String>,
    /// Extra headers sent with every request
    #[serde(default)]
    pub extra_headers: Option<HashMap<String, String>>,
}

/// Page server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_sidebar() {
        let config = Config::default();
        assert_eq!(config.chat.model, "gemma2-9b-it");
        assert!((config.chat.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.chat.max_tokens, 250);
        assert_eq!(config.chat.system_prompt, "You are a helpful Assistant");
    }

    #[test]
    fn test_secrets_debug_is_redacted() {
        let secrets = SecretsConfig {
            langchain_api_key: "lc-secret".to_string(),
            groq_api_key: String::new(),
        };
        let rendered = format!("{:?}", secrets);
        assert!(!rendered.contains("lc-secret"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("<unset>"));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"chat":{"max_tokens":400}}"#).unwrap();
        assert_eq!(config.chat.max_tokens, 400);
        assert_eq!(config.chat.model, "gemma2-9b-it");
        assert_eq!(config.server.port, 8501);
    }
}
