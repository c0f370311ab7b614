//! Integration tests for Kardec Chat.
//!
//! These drive full conversation turns through the use case against the
//! mock completion adapter.

use std::sync::Arc;

use kardec_chat::{
    Conversation, MockCompletion, MockProbe, SendMessageUseCase, SendOutcome, FALLBACK_REPLY,
    GREETING,
};

fn setup(mock: MockCompletion) -> (SendMessageUseCase, MockProbe) {
    let probe = mock.probe();
    (SendMessageUseCase::new(Arc::new(mock)), probe)
}

#[tokio::test]
async fn session_grows_by_one_user_and_one_assistant_entry_per_turn() {
    let (use_case, _) = setup(MockCompletion::new().with_reply("Paz e luz"));
    let mut conversation = Conversation::new();

    let outcome = use_case
        .execute(&mut conversation, "Como encontrar consolo no luto?")
        .await;

    assert_eq!(outcome, SendOutcome::Replied);
    let messages = conversation.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].text(), GREETING);
    assert!(messages[1].is_user());
    assert_eq!(messages[2].text(), "Paz e luz");
}

#[tokio::test]
async fn blank_submission_issues_no_request() {
    let (use_case, probe) = setup(MockCompletion::new());
    let mut conversation = Conversation::new();

    for input in ["", "   ", "\t\n"] {
        let outcome = use_case.execute(&mut conversation, input).await;
        assert_eq!(outcome, SendOutcome::Ignored);
    }

    assert_eq!(conversation.len(), 1);
    assert_eq!(probe.calls(), 0);
}

#[tokio::test]
async fn transport_failure_yields_the_fixed_fallback_entry() {
    let (use_case, probe) = setup(MockCompletion::failing());
    let mut conversation = Conversation::new();

    let outcome = use_case
        .execute(&mut conversation, "O que a doutrina diz sobre o perdão?")
        .await;

    assert_eq!(outcome, SendOutcome::Failed);
    assert_eq!(probe.calls(), 1);
    assert_eq!(conversation.last().unwrap().text(), FALLBACK_REPLY);
    assert!(conversation.last().unwrap().is_assistant());
}

#[tokio::test]
async fn conversation_stays_usable_after_a_failure() {
    let (failing, _) = setup(MockCompletion::failing());
    let mut conversation = Conversation::new();
    failing.execute(&mut conversation, "primeira tentativa").await;

    // A later turn through a healthy client continues the same session.
    let (healthy, _) = setup(MockCompletion::new().with_reply("Sim, continue firme."));
    let outcome = healthy.execute(&mut conversation, "segunda tentativa").await;

    assert_eq!(outcome, SendOutcome::Replied);
    assert_eq!(conversation.len(), 5);
    assert_eq!(conversation.last().unwrap().text(), "Sim, continue firme.");
}

#[tokio::test]
async fn ids_are_strictly_increasing_and_unique_across_a_session() {
    let (use_case, _) = setup(MockCompletion::new());
    let mut conversation = Conversation::new();

    for question in ["um", "dois", "três", "quatro"] {
        use_case.execute(&mut conversation, question).await;
    }

    let ids: Vec<u64> = conversation.messages().iter().map(|m| m.id()).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(ids, sorted, "ids must be strictly increasing and unique");
    assert_eq!(ids.len(), 9);
}

#[tokio::test]
async fn request_carries_the_full_history_including_the_greeting() {
    let (use_case, probe) = setup(MockCompletion::new());
    let mut conversation = Conversation::new();

    use_case.execute(&mut conversation, "primeira").await;
    // greeting + user turn
    assert_eq!(probe.last_history_len(), 2);

    use_case.execute(&mut conversation, "segunda").await;
    // greeting + user + assistant + user
    assert_eq!(probe.last_history_len(), 4);
}
