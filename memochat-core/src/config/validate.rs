//! Configuration validation rules.

use super::schema::Config;

/// Accepted temperature range, inclusive
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=1.0;

/// Accepted completion token limit range, inclusive
pub const MAX_TOKENS_RANGE: std::ops::RangeInclusive<u32> = 100..=500;

/// Check that both provider secrets are present.
///
/// Kept separate from [`validate_config`] so callers that never talk to the
/// provider (`status`, `models`) can load configuration without them.
pub fn validate_secrets(config: &Config) -> crate::Result<()> {
    let mut missing = Vec::new();
    if config.secrets.langchain_api_key.trim().is_empty() {
        missing.push("langchain_api_key");
    }
    if config.secrets.groq_api_key.trim().is_empty() {
        missing.push("groq_api_key");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Config(format!(
            "API keys are not set: {}. Provide them in secrets.toml, config.json or the environment",
            missing.join(", ")
        )))
    }
}

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    validate_secrets(config)?;

    let mut errors = Vec::new();

    if config.chat.model.trim().is_empty() {
        errors.push("chat.model must not be empty".to_string());
    }
    if !TEMPERATURE_RANGE.contains(&config.chat.temperature) {
        errors.push("chat.temperature must be in [0.0, 1.0]".to_string());
    }
    if !MAX_TOKENS_RANGE.contains(&config.chat.max_tokens) {
        errors.push("chat.max_tokens must be in [100, 500]".to_string());
    }
    if config.chat.system_prompt.trim().is_empty() {
        errors.push("chat.system_prompt must not be empty".to_string());
    }
    if config.server.host.trim().is_empty() {
        errors.push("server.host must not be empty".to_string());
    }
    if config.server.port == 0 {
        errors.push("server.port must be > 0".to_string());
    }
    if let Some(base) = &config.provider.api_base {
        let base = base.trim();
        if !base.is_empty() && !(base.starts_with("http://") || base.starts_with("https://")) {
            errors.push("provider.api_base must be an http(s) URL".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Config {
        let mut config = Config::default();
        config.secrets.langchain_api_key = "lc-key".to_string();
        config.secrets.groq_api_key = "gsk-key".to_string();
        config
    }

    #[test]
    fn test_validate_accepts_defaults_with_secrets() {
        validate_config(&configured()).unwrap();
    }

    #[test]
    fn test_missing_groq_key_is_config_error() {
        let mut config = configured();
        config.secrets.groq_api_key = "  ".to_string();

        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
        assert!(err.to_string().contains("groq_api_key"));
        assert!(!err.to_string().contains("langchain_api_key"));
    }

    #[test]
    fn test_missing_both_keys_names_both() {
        let err = validate_config(&Config::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("langchain_api_key"));
        assert!(message.contains("groq_api_key"));
    }

    #[test]
    fn test_out_of_range_defaults_are_aggregated() {
        let mut config = configured();
        config.chat.temperature = 1.5;
        config.chat.max_tokens = 50;

        let err = validate_config(&config).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, crate::Error::Validation(_)));
        assert!(message.contains("chat.temperature"));
        assert!(message.contains("chat.max_tokens"));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let mut config = configured();
        config.chat.temperature = 1.0;
        config.chat.max_tokens = 500;
        validate_config(&config).unwrap();

        config.chat.temperature = 0.0;
        config.chat.max_tokens = 100;
        validate_config(&config).unwrap();
    }

    #[test]
    fn test_rejects_non_http_api_base() {
        let mut config = configured();
        config.provider.api_base = Some("ftp://example.com".to_string());
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("provider.api_base"));
    }
}
