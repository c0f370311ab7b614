//! # Connector Layer
//!
//! External integrations implementing the application interfaces:
//! - `OpenAiClient`: OpenAI-compatible chat-completion endpoint over HTTP
//! - `MockCompletion`: deterministic offline stand-in for tests and demos

pub mod adapter;

pub use adapter::*;
