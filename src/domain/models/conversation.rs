use super::{Message, Sender};

/// Synthetic assistant greeting seeded as the first entry of every session.
pub const GREETING: &str = "Olá! Sou um assistente espiritual baseado nos \
ensinamentos de Allan Kardec. Como posso ajudar você hoje em sua jornada \
espiritual?";

/// Append-only, in-memory store for one chat session.
///
/// The conversation owns the id counter: ids strictly increase with
/// insertion order regardless of list length, so a failure-path append can
/// never collide with a success-path append. There is no size cap and no
/// eviction; entries live for the duration of the session only.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    next_id: u64,
}

impl Conversation {
    /// Start a new session, seeded with the assistant greeting.
    pub fn new() -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        conversation.append_assistant(GREETING);
        conversation
    }

    fn bump_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append a user turn.
    ///
    /// Input that is empty or whitespace-only after trimming is rejected as
    /// a no-op: nothing is appended and `None` is returned. Accepted text is
    /// stored verbatim, untrimmed.
    pub fn append_user(&mut self, text: &str) -> Option<&Message> {
        if text.trim().is_empty() {
            return None;
        }
        let id = self.bump_id();
        self.messages.push(Message::new(id, text, Sender::User));
        self.messages.last()
    }

    /// Append an assistant turn, either a remote reply or the fixed fallback text.
    pub fn append_assistant(&mut self, text: impl Into<String>) -> &Message {
        let id = self.bump_id();
        let index = self.messages.len();
        self.messages.push(Message::new(id, text, Sender::Assistant));
        &self.messages[index]
    }

    /// Full ordered sequence, for rendering.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Owned copy of the full ordered sequence, for handing to a request
    /// task while the session object stays on the render loop.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
