use async_trait::async_trait;

use crate::domain::{DomainError, Message};

/// An interface for turning a conversation history into one assistant reply.
///
/// Implementors encapsulate transport, serialization, and vendor-specific
/// API details, including prepending the fixed persona preamble. Consumers
/// (e.g. [`SendMessageUseCase`]) remain decoupled from any particular
/// provider or HTTP client library.
///
/// [`SendMessageUseCase`]: crate::application::SendMessageUseCase
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the full ordered history (greeting included) and return the
    /// assistant's reply text. Exactly one request per call: no retry, no
    /// streaming.
    async fn complete(&self, history: &[Message]) -> Result<String, DomainError>;
}
