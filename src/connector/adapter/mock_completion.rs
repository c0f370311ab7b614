use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::application::CompletionClient;
use crate::domain::{DomainError, Message};

const DEFAULT_REPLY: &str = "Que a paz esteja com você. Conte-me o que \
inquieta o seu coração, e buscaremos juntos a resposta na doutrina.";

/// Deterministic [`CompletionClient`] for tests and offline use (`--mock`).
///
/// Replies with a canned text (or a configured one) without touching the
/// network, and can be configured to fail every request to exercise the
/// fallback path.
pub struct MockCompletion {
    reply: String,
    fail: bool,
    probe: MockProbe,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self {
            reply: DEFAULT_REPLY.to_string(),
            fail: false,
            probe: MockProbe::default(),
        }
    }

    /// Fail every `complete` call with a completion error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = reply.into();
        self
    }

    /// Handle for asserting on calls after the mock has been moved into an
    /// `Arc<dyn CompletionClient>`.
    pub fn probe(&self) -> MockProbe {
        self.probe.clone()
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for MockCompletion {
    async fn complete(&self, history: &[Message]) -> Result<String, DomainError> {
        self.probe.record(history.len());

        if self.fail {
            return Err(DomainError::completion("mock configured to fail"));
        }

        debug!("Mock completion for {} history entries", history.len());
        Ok(self.reply.clone())
    }
}

/// Shared call recorder for [`MockCompletion`].
#[derive(Clone, Default)]
pub struct MockProbe {
    inner: Arc<ProbeInner>,
}

#[derive(Default)]
struct ProbeInner {
    calls: AtomicUsize,
    last_history_len: AtomicUsize,
}

impl MockProbe {
    fn record(&self, history_len: usize) {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .last_history_len
            .store(history_len, Ordering::SeqCst);
    }

    /// Number of `complete` calls observed.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// History length of the most recent call (0 when never called).
    pub fn last_history_len(&self) -> usize {
        self.inner.last_history_len.load(Ordering::SeqCst)
    }
}
