use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::CompletionClient;
use crate::domain::{Conversation, Message};

/// Fixed user-facing text appended when the completion request fails.
/// The underlying error goes to the log, never into the conversation.
pub const FALLBACK_REPLY: &str = "Desculpe, estou com dificuldade para \
responder neste momento. Por favor, tente novamente em alguns instantes.";

/// Outcome of one submission. The transition out of the sending state always
/// terminates by appending exactly one assistant message; `Ignored` is the
/// only case where nothing was appended and no request was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty or whitespace-only input; nothing appended, no request sent.
    Ignored,
    /// The remote service replied; its text was appended verbatim.
    Replied,
    /// The request failed; the fixed fallback text was appended.
    Failed,
}

pub struct SendMessageUseCase {
    completion: Arc<dyn CompletionClient>,
}

impl SendMessageUseCase {
    pub fn new(completion: Arc<dyn CompletionClient>) -> Self {
        Self { completion }
    }

    /// Run one full conversation turn: append the user entry, request a
    /// completion for the resulting history, and append exactly one
    /// assistant entry with the reply or the fallback text.
    ///
    /// Never fatal; the conversation stays usable after any failure.
    pub async fn execute(&self, conversation: &mut Conversation, input: &str) -> SendOutcome {
        let Some(message) = conversation.append_user(input) else {
            debug!("Ignoring blank submission");
            return SendOutcome::Ignored;
        };
        debug!("User turn {} queued", message.id());

        let history = conversation.snapshot();
        let (outcome, reply) = self.request_reply(&history).await;
        conversation.append_assistant(reply);
        outcome
    }

    /// The completion half of a turn: one request, with the failure already
    /// mapped to [`FALLBACK_REPLY`]. Infallible by design so the caller can
    /// always append the returned text. Used directly by the TUI, which
    /// appends the user entry on the render loop and awaits the reply in a
    /// spawned task.
    pub async fn request_reply(&self, history: &[Message]) -> (SendOutcome, String) {
        match self.completion.complete(history).await {
            Ok(reply) => (SendOutcome::Replied, reply),
            Err(e) => {
                warn!("Completion request failed: {e}");
                (SendOutcome::Failed, FALLBACK_REPLY.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::MockCompletion;

    fn use_case(mock: MockCompletion) -> SendMessageUseCase {
        SendMessageUseCase::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn successful_turn_appends_user_then_assistant() {
        let uc = use_case(MockCompletion::new().with_reply("Paz e luz"));
        let mut conversation = Conversation::new();

        let outcome = uc.execute(&mut conversation, "Como encontrar serenidade?").await;

        assert_eq!(outcome, SendOutcome::Replied);
        assert_eq!(conversation.len(), 3);
        assert!(conversation.messages()[1].is_user());
        assert!(conversation.messages()[2].is_assistant());
        assert_eq!(conversation.messages()[2].text(), "Paz e luz");
    }

    #[tokio::test]
    async fn blank_input_appends_nothing_and_sends_nothing() {
        let mock = MockCompletion::new();
        let probe = mock.probe();
        let uc = use_case(mock);
        let mut conversation = Conversation::new();

        let outcome = uc.execute(&mut conversation, "   \t ").await;

        assert_eq!(outcome, SendOutcome::Ignored);
        assert_eq!(conversation.len(), 1);
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn failed_turn_appends_fallback_text() {
        let uc = use_case(MockCompletion::failing());
        let mut conversation = Conversation::new();

        let outcome = uc.execute(&mut conversation, "Há vida após a morte?").await;

        assert_eq!(outcome, SendOutcome::Failed);
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.messages()[2].text(), FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn every_turn_appends_exactly_one_assistant_message() {
        let uc = use_case(MockCompletion::new());
        let mut conversation = Conversation::new();

        uc.execute(&mut conversation, "primeira").await;
        uc.execute(&mut conversation, "segunda").await;

        let assistants = conversation
            .messages()
            .iter()
            .filter(|m| m.is_assistant())
            .count();
        // Greeting plus one reply per turn.
        assert_eq!(assistants, 3);
        assert_eq!(conversation.len(), 5);
    }

    #[tokio::test]
    async fn request_is_sent_after_the_user_entry_is_appended() {
        let mock = MockCompletion::new();
        let probe = mock.probe();
        let uc = use_case(mock);
        let mut conversation = Conversation::new();

        uc.execute(&mut conversation, "Qual o papel da caridade?").await;

        // The mock saw greeting + user turn: the user entry existed before
        // the request went out.
        assert_eq!(probe.calls(), 1);
        assert_eq!(probe.last_history_len(), 2);
    }
}
