pub mod application;
pub mod connector;
pub mod domain;
pub mod tui;

pub use application::{CompletionClient, SendMessageUseCase, SendOutcome, FALLBACK_REPLY};

pub use connector::{MockCompletion, MockProbe, OpenAiClient, EMPTY_REPLY_PLACEHOLDER};

pub use domain::{Conversation, DomainError, Message, Sender, GREETING};
