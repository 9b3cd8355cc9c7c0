//! Conversation controller integration tests
//!
//! Drives the full confirmation flow against scripted reasoning replies and
//! a counting webhook fake, without any network.

use chrono::{Days, Utc};

use attache_gateway::IntentStatus;

mod common;
use common::{CountingDispatcher, ScriptedReasoner, controller};

#[tokio::test]
async fn create_and_confirm_dispatches_once() {
    let reasoner = ScriptedReasoner::new(vec![ScriptedReasoner::with_task(
        "I can set that up.",
        "Call John",
        "tomorrow",
        "Ring John about the trip.",
    )]);
    let dispatcher = CountingDispatcher::succeeding();
    let mut controller = controller(reasoner, Some(dispatcher.clone()));

    let reply = controller
        .handle_user_turn("Remind me to call John tomorrow", None)
        .await;
    assert!(reply.text.contains("Call John"));
    assert!(reply.text.contains("Should I save it?"));
    assert_eq!(dispatcher.calls(), 0, "nothing dispatched before confirmation");

    let pending = controller.pending_intent().expect("intent staged");
    assert_eq!(pending.status(), IntentStatus::Pending);
    let tomorrow = Utc::now().date_naive().checked_add_days(Days::new(1)).unwrap();
    assert_eq!(pending.due, Some(tomorrow));

    let reply = controller.handle_user_turn("yes", None).await;
    assert!(reply.text.contains("Done!"));
    assert_eq!(dispatcher.calls(), 1);
    assert!(controller.pending_intent().is_none(), "intent resolved");

    let payload = dispatcher.last_payload().expect("payload captured");
    assert_eq!(payload.title, "Call John");
    assert_eq!(payload.due_date, tomorrow);
    assert_eq!(payload.notes, "Ring John about the trip.");
}

#[tokio::test]
async fn rejection_cancels_without_dispatch() {
    let reasoner = ScriptedReasoner::new(vec![
        ScriptedReasoner::with_task("Sure.", "Call John", "tomorrow", "Ring him."),
        ScriptedReasoner::plain("The weather looks fine."),
    ]);
    let dispatcher = CountingDispatcher::succeeding();
    let mut controller = controller(reasoner, Some(dispatcher.clone()));

    controller
        .handle_user_turn("Remind me to call John tomorrow", None)
        .await;
    let reply = controller.handle_user_turn("no", None).await;

    assert!(reply.text.contains("won't add it"));
    assert_eq!(dispatcher.calls(), 0);
    assert!(controller.pending_intent().is_none());

    // A later unrelated turn does not resurrect the rejected intent
    let reply = controller.handle_user_turn("how's the weather?", None).await;
    assert_eq!(reply.text, "The weather looks fine.");
    assert!(controller.pending_intent().is_none());
    assert_eq!(dispatcher.calls(), 0);
}

#[tokio::test]
async fn reasoning_failure_produces_apology_turn() {
    let reasoner = ScriptedReasoner::new(vec![ScriptedReasoner::unreachable()]);
    let mut controller = controller(reasoner, None);

    let reply = controller.handle_user_turn("hello there", None).await;

    assert!(reply.text.contains("Sorry"));
    assert!(controller.pending_intent().is_none(), "no intent created");

    // The user turn is still recorded, followed by the apology
    let turns = controller.transcript().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].text, "hello there");
}

#[tokio::test]
async fn exhausted_retries_reject_the_intent() {
    let reasoner = ScriptedReasoner::new(vec![ScriptedReasoner::with_task(
        "Sure.",
        "Call John",
        "tomorrow",
        "Ring him.",
    )]);
    let dispatcher = CountingDispatcher::scripted(vec![
        Err(CountingDispatcher::server_error()),
        Err(CountingDispatcher::server_error()),
        Err(CountingDispatcher::server_error()),
    ]);
    let mut controller = controller(reasoner.clone(), Some(dispatcher.clone()));

    controller
        .handle_user_turn("Remind me to call John tomorrow", None)
        .await;
    let reply = controller.handle_user_turn("yes", None).await;

    assert_eq!(dispatcher.calls(), 3, "attempt bound is three total attempts");
    assert!(reply.text.contains("couldn't create that task"));
    assert!(controller.pending_intent().is_none());

    // A further "yes" is plain conversation, not a retry
    controller.handle_user_turn("yes", None).await;
    assert_eq!(dispatcher.calls(), 3);
}

#[tokio::test]
async fn unrecoverable_status_fails_without_retries() {
    let reasoner = ScriptedReasoner::new(vec![ScriptedReasoner::with_task(
        "Sure.",
        "Call John",
        "tomorrow",
        "Ring him.",
    )]);
    let bad_request = attache_gateway::DispatchError::Status {
        status: 400,
        body: "bad payload".to_string(),
        retry_after: None,
    };
    let dispatcher = CountingDispatcher::scripted(vec![Err(bad_request)]);
    let mut controller = controller(reasoner, Some(dispatcher.clone()));

    controller
        .handle_user_turn("Remind me to call John tomorrow", None)
        .await;
    let reply = controller.handle_user_turn("yes", None).await;

    assert_eq!(dispatcher.calls(), 1, "client errors are not retried");
    assert!(reply.text.contains("couldn't create that task"));
}

#[tokio::test]
async fn confirming_after_dispatch_is_a_noop() {
    let reasoner = ScriptedReasoner::new(vec![ScriptedReasoner::with_task(
        "Sure.",
        "Call John",
        "tomorrow",
        "Ring him.",
    )]);
    let dispatcher = CountingDispatcher::succeeding();
    let mut controller = controller(reasoner, Some(dispatcher.clone()));

    controller
        .handle_user_turn("Remind me to call John tomorrow", None)
        .await;
    controller.handle_user_turn("yes", None).await;
    assert_eq!(dispatcher.calls(), 1);

    // Saying yes again lands in plain conversation; no second webhook call
    controller.handle_user_turn("yes", None).await;
    assert_eq!(dispatcher.calls(), 1);
}

#[tokio::test]
async fn missing_due_date_is_collected_before_confirmation() {
    let reasoner = ScriptedReasoner::new(vec![ScriptedReasoner::with_task(
        "Happy to help.",
        "Revise algebra",
        "",
        "Cover quadratics and factoring.",
    )]);
    let dispatcher = CountingDispatcher::succeeding();
    let mut controller = controller(reasoner, Some(dispatcher.clone()));

    let reply = controller
        .handle_user_turn("I should revise algebra sometime", None)
        .await;
    assert!(reply.text.contains("When should I set"));

    // A dateless answer asks again
    let reply = controller
        .handle_user_turn("whenever works for the kickoff", None)
        .await;
    assert_eq!(reply.text, "What date should I set for this?");
    assert_eq!(dispatcher.calls(), 0);

    // A real date moves on to confirmation
    let reply = controller.handle_user_turn("tomorrow", None).await;
    assert!(reply.text.contains("Revise algebra"));
    assert!(reply.text.contains("Should I save it?"));

    let reply = controller.handle_user_turn("yes please", None).await;
    assert!(reply.text.contains("Done!"));
    assert_eq!(dispatcher.calls(), 1);

    let tomorrow = Utc::now().date_naive().checked_add_days(Days::new(1)).unwrap();
    assert_eq!(dispatcher.last_payload().unwrap().due_date, tomorrow);
}

#[tokio::test]
async fn unrelated_turn_keeps_the_pending_intent() {
    let reasoner = ScriptedReasoner::new(vec![
        ScriptedReasoner::with_task("Sure.", "Call John", "tomorrow", "Ring him."),
        ScriptedReasoner::plain("It's sunny."),
    ]);
    let dispatcher = CountingDispatcher::succeeding();
    let mut controller = controller(reasoner, Some(dispatcher.clone()));

    controller
        .handle_user_turn("Remind me to call John tomorrow", None)
        .await;
    assert!(controller.pending_intent().is_some());

    // Neither yes nor no: the question is answered, the draft survives
    let reply = controller.handle_user_turn("what's the weather?", None).await;
    assert_eq!(reply.text, "It's sunny.");
    let pending = controller.pending_intent().expect("draft survived");
    assert_eq!(pending.title, "Call John");

    let reply = controller.handle_user_turn("yes", None).await;
    assert!(reply.text.contains("Done!"));
    assert_eq!(dispatcher.calls(), 1);
}

#[tokio::test]
async fn transcript_grows_two_turns_per_user_turn() {
    let reasoner = ScriptedReasoner::new(Vec::new());
    let mut controller = controller(reasoner, None);

    for i in 0..5 {
        controller
            .handle_user_turn(&format!("message number {i}"), None)
            .await;
    }

    // One user turn plus one assistant turn, every time
    assert_eq!(controller.transcript().len(), 10);
}

#[tokio::test]
async fn missing_webhook_surfaces_as_user_visible_reply() {
    let reasoner = ScriptedReasoner::new(vec![ScriptedReasoner::with_task(
        "Sure.",
        "Call John",
        "tomorrow",
        "Ring him.",
    )]);
    let mut controller = controller(reasoner, None);

    controller
        .handle_user_turn("Remind me to call John tomorrow", None)
        .await;
    let reply = controller.handle_user_turn("yes", None).await;

    assert!(reply.text.contains("no automation webhook"));
    assert!(controller.pending_intent().is_none());
}

#[tokio::test]
async fn empty_input_still_records_a_turn() {
    let reasoner = ScriptedReasoner::new(Vec::new());
    let mut controller = controller(reasoner.clone(), None);

    let reply = controller.handle_user_turn("   ", None).await;

    assert!(reply.text.contains("didn't catch"));
    assert_eq!(controller.transcript().len(), 2);
    assert_eq!(reasoner.calls(), 0, "no reasoning call for empty input");
}

#[tokio::test]
async fn voice_turns_carry_their_audio_reference() {
    let reasoner = ScriptedReasoner::new(vec![ScriptedReasoner::plain("Hello!")]);
    let mut controller = controller(reasoner, None);

    controller
        .handle_user_turn("hi", Some("clip-7.wav".to_string()))
        .await;

    let turns = controller.transcript().turns();
    assert_eq!(turns[0].audio_ref.as_deref(), Some("clip-7.wav"));
    assert!(turns[1].audio_ref.is_none());
}
