//! # Domain Layer
//!
//! Core models and errors for a chat session.
//! This layer is independent of external frameworks and infrastructure.

pub mod error;
pub mod models;

pub use error::*;
pub use models::*;
