//! Response generation for memochat
//!
//! Turns a user question plus the session transcript into one assistant
//! reply, recording both turns in the session.

pub mod context;
pub mod error;
pub mod generator;

pub use context::ContextBuilder;
pub use error::ChatError;
pub use generator::{GenerationParams, ResponseGenerator};
pub use tokio_util::sync::CancellationToken;
