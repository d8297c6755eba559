//! Configuration loading and management

use super::schema::Config;
use super::validate::validate_config;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";
const SECRETS_FILE: &str = "secrets.toml";
const SECRET_KEYS: [&str; 2] = ["langchain_api_key", "groq_api_key"];

/// Configuration loader
///
/// Layers, lowest precedence first: built-in defaults, `config.json`,
/// `secrets.toml`, alias environment variables (`GROQ_API_KEY`, ...), and
/// path environment variables (`MEMOCHAT__CHAT__MODEL`, ...).
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader with the default config directory
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .map(|h| h.join(".memochat"))
            .unwrap_or_else(|| PathBuf::from(".memochat"));

        Self { config_dir }
    }

    /// Create a new config loader with a custom config directory
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            config_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Load and validate configuration. Fails when a secret is missing.
    pub fn load(&self) -> crate::Result<Config> {
        let config = self.load_unchecked()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration without validating it
    pub fn load_unchecked(&self) -> crate::Result<Config> {
        let config_path = self.config_dir.join(CONFIG_FILE);
        let mut merged = serde_json::to_value(Config::default())?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let file_value: Value = serde_json::from_str(&content)?;
            merge_values(&mut merged, file_value);
        }

        self.apply_secrets_file(&mut merged)?;
        apply_alias_overrides(&mut merged);
        apply_path_overrides(&mut merged);

        let config: Config = serde_json::from_value(merged)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &Config) -> crate::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        let config_path = self.config_dir.join(CONFIG_FILE);
        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Read the flat `secrets.toml` (`groq_api_key = "..."`) if present
    fn apply_secrets_file(&self, merged: &mut Value) -> crate::Result<()> {
        let path = self.config_dir.join(SECRETS_FILE);
        if !path.exists() {
            return Ok(());
        }

        let settings = ::config::Config::builder()
            .add_source(
                ::config::File::from(path.as_path())
                    .format(::config::FileFormat::Toml)
                    .required(false),
            )
            .build()?;

        for key in SECRET_KEYS {
            match settings.get_string(key) {
                Ok(value) => {
                    let path = ["secrets".to_string(), key.to_string()];
                    set_path_value(merged, &path, Value::String(value));
                }
                Err(::config::ConfigError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                if let Some(existing) = base_map.get_mut(&key) {
                    merge_values(existing, value);
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

fn parse_env_value(raw: &str) -> Value {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        return v;
    }
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(raw.to_string())
}

fn set_path_value(root: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for segment in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Some(map) = current.as_object_mut() else {
            return;
        };
        current = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Some(map) = current.as_object_mut() {
        map.insert(last.clone(), value);
    }
}

fn apply_alias_overrides(config: &mut Value) {
    // Lowercase names are what hosted notebooks and Streamlit deployments export.
    let aliases = [
        ("LANGCHAIN_API_KEY", "secrets.langchain_api_key"),
        ("langchain_api_key", "secrets.langchain_api_key"),
        ("GROQ_API_KEY", "secrets.groq_api_key"),
        ("groq_api_key", "secrets.groq_api_key"),
    ];

    for (env_key, target_path) in aliases {
        if let Ok(value) = std::env::var(env_key) {
            let path: Vec<String> = target_path.split('.').map(ToString::to_string).collect();
            set_path_value(config, &path, Value::String(value));
        }
    }
}

fn apply_path_overrides(config: &mut Value) {
    const PREFIX: &str = "MEMOCHAT__";
    for (key, value) in std::env::vars() {
        let Some(suffix) = key.strip_prefix(PREFIX) else {
            continue;
        };
        let segments: Vec<String> = suffix
            .split("__")
            .filter(|s| !s.is_empty())
            .map(|s| s.to_ascii_lowercase())
            .collect();
        if segments.is_empty() {
            continue;
        }
        // Secrets are strings even when they happen to look like numbers.
        let parsed = if segments.first().map(String::as_str) == Some("secrets") {
            Value::String(value)
        } else {
            parse_env_value(&value)
        };
        set_path_value(config, &segments, parsed);
    }
}
