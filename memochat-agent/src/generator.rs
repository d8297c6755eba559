//! Response generation against a session transcript

use memochat_core::config::{ChatDefaults, MAX_TOKENS_RANGE, TEMPERATURE_RANGE};
use memochat_core::session::{Session, Turn};
use memochat_providers::{LLMProvider, LLMResponse, ProviderRegistry, ProviderResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::ContextBuilder;
use crate::error::ChatError;

/// Model and sampling settings for one generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl GenerationParams {
    pub fn new(model: impl Into<String>, temperature: f64, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    pub fn from_defaults(defaults: &ChatDefaults) -> Self {
        Self::new(defaults.model.clone(), defaults.temperature, defaults.max_tokens)
    }

    /// Check the model against the registry and the sampling ranges
    pub fn validate(&self, registry: &ProviderRegistry) -> Result<(), ChatError> {
        let mut errors = Vec::new();
        if !registry.is_supported(&self.model) {
            errors.push(format!("unknown model '{}'", self.model));
        }
        if !TEMPERATURE_RANGE.contains(&self.temperature) {
            errors.push(format!(
                "temperature {} outside [0.0, 1.0]",
                self.temperature
            ));
        }
        if !MAX_TOKENS_RANGE.contains(&self.max_tokens) {
            errors.push(format!("max_tokens {} outside [100, 500]", self.max_tokens));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ChatError::InvalidParameters(errors.join("; ")))
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::from_defaults(&ChatDefaults::default())
    }
}

/// Produces assistant replies and records the exchange in a session
pub struct ResponseGenerator {
    provider: Arc<dyn LLMProvider>,
    context: ContextBuilder,
    registry: ProviderRegistry,
    timeout: Option<Duration>,
}

impl ResponseGenerator {
    /// Create a generator with the default system instruction and no timeout
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            context: ContextBuilder::default(),
            registry: ProviderRegistry::new(),
            timeout: None,
        }
    }

    /// Create a generator using the configured system prompt and timeout
    pub fn from_defaults(provider: Arc<dyn LLMProvider>, defaults: &ChatDefaults) -> Self {
        let timeout = match defaults.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self::new(provider)
            .with_context(ContextBuilder::new(defaults.system_prompt.clone()))
            .with_timeout(timeout)
    }

    pub fn with_context(mut self, context: ContextBuilder) -> Self {
        self.context = context;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn context(&self) -> &ContextBuilder {
        &self.context
    }

    /// Reject requests that must leave every session untouched.
    ///
    /// Only the empty string counts as no question; whitespace is a question.
    pub fn check_request(&self, question: &str, params: &GenerationParams) -> Result<(), ChatError> {
        if question.is_empty() {
            return Err(ChatError::EmptyInput);
        }
        params.validate(&self.registry)
    }

    /// Answer `question` in the context of `session`.
    ///
    /// On success the session grows by the user turn and the assistant turn.
    /// On a provider failure, timeout or cancellation only the user turn is
    /// kept. Empty input and invalid parameters leave the session untouched.
    pub async fn generate(
        &self,
        session: &mut Session,
        question: &str,
        params: &GenerationParams,
    ) -> Result<String, ChatError> {
        self.generate_with_cancel(session, question, params, &CancellationToken::new())
            .await
    }

    /// Like [`generate`](Self::generate), abandoning the provider call when
    /// `cancel` fires.
    pub async fn generate_with_cancel(
        &self,
        session: &mut Session,
        question: &str,
        params: &GenerationParams,
        cancel: &CancellationToken,
    ) -> Result<String, ChatError> {
        self.check_request(question, params)?;

        session.append(Turn::user(question));
        let messages = self.context.build_messages(session.turns());

        info!(
            session = %session.id(),
            model = %params.model,
            turns = session.len(),
            question = %preview(question, 80),
            "Generating response"
        );

        let call = self.provider.chat(
            messages,
            Some(params.model.clone()),
            params.max_tokens,
            params.temperature,
        );

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ChatError::Cancelled),
            result = bounded(call, self.timeout) => result,
        };

        match outcome {
            Ok(response) => {
                debug!(
                    finish_reason = %response.finish_reason,
                    usage = ?response.usage,
                    "Completion received"
                );
                let reply = response.content.unwrap_or_default();
                info!(
                    session = %session.id(),
                    reply = %preview(&reply, 120),
                    "Response generated"
                );
                session.append(Turn::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                warn!(session = %session.id(), error = %e, "Generation failed");
                Err(e)
            }
        }
    }
}

async fn bounded<F>(call: F, timeout: Option<Duration>) -> Result<LLMResponse, ChatError>
where
    F: Future<Output = ProviderResult<LLMResponse>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| ChatError::Timeout(limit))?
            .map_err(ChatError::from),
        None => call.await.map_err(ChatError::from),
    }
}

/// First `max_chars` characters, for log lines
fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}
