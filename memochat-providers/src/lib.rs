//! LLM provider integrations for memochat
//!
//! The completion collaborator: a provider trait, the Groq chat completions
//! client and the registry of selectable models.

pub mod base;
pub mod groq;
pub mod registry;

pub use base::{LLMProvider, LLMResponse, Message, ProviderError, ProviderResult};
pub use groq::GroqClient;
pub use registry::{ModelSpec, ProviderRegistry, ProviderSpec};
