//! Conversation sessions
//!
//! A [`Session`] holds the ordered transcript of one conversation in memory.
//! The [`SessionManager`] hands out one session per id to the page server.

pub mod manager;
pub mod store;

pub use manager::{SessionManager, SharedSession};
pub use store::{Role, Session, Turn};
