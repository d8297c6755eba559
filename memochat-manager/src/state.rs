use chrono::{DateTime, Utc};
use memochat_agent::{GenerationParams, ResponseGenerator};
use memochat_core::config::Config;
use memochat_core::session::{SessionManager, Turn};
use memochat_providers::{GroqClient, LLMProvider, ProviderResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state behind every route
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<ResponseGenerator>,
    pub sessions: Arc<SessionManager>,
    /// Sidebar values used when a request leaves a setting out
    pub defaults: GenerationParams,
}

impl AppState {
    pub fn new(generator: ResponseGenerator, defaults: GenerationParams) -> Self {
        Self {
            generator: Arc::new(generator),
            sessions: Arc::new(SessionManager::new()),
            defaults,
        }
    }

    /// Wire the Groq client and chat defaults from a validated config
    pub fn from_config(config: &Config) -> ProviderResult<Self> {
        let provider: Arc<dyn LLMProvider> = Arc::new(GroqClient::from_config(config)?);
        Ok(Self::new(
            ResponseGenerator::from_defaults(provider, &config.chat),
            GenerationParams::from_defaults(&config.chat),
        ))
    }

    /// Fill unset request fields from the defaults
    pub fn params(
        &self,
        model: Option<String>,
        temperature: Option<f64>,
        max_tokens: Option<u32>,
    ) -> GenerationParams {
        GenerationParams::new(
            model.unwrap_or_else(|| self.defaults.model.clone()),
            temperature.unwrap_or(self.defaults.temperature),
            max_tokens.unwrap_or(self.defaults.max_tokens),
        )
    }
}

/// `?session=` on the page routes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub session: Option<String>,
}

/// Page form submission: the question plus the sidebar values
#[derive(Debug, Clone, Deserialize)]
pub struct AskForm {
    pub session: String,
    #[serde(default)]
    pub question: String,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub session: Option<String>,
    pub message: String,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub session: String,
    pub reply: String,
    pub transcript: Vec<Turn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptResponse {
    pub session: String,
    pub transcript: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}
