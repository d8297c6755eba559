//! Core types for memochat
//!
//! Configuration loading and validation, conversation sessions and the
//! logging bootstrap shared by every other memochat crate.

pub mod config;
pub mod error;
pub mod logging;
pub mod session;

pub use error::{Error, Result};
