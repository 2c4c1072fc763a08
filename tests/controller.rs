//! Wake/Listen state machine sequence tests

use odel::{ListenEvent, ListenState};

/// Fold a sequence of events over the state machine
fn walk(start: ListenState, events: &[ListenEvent]) -> ListenState {
    events.iter().fold(start, |state, &event| state.on(event))
}

#[test]
fn normal_conversation_cycle() {
    let state = walk(
        ListenState::Idle,
        &[
            ListenEvent::Start,
            ListenEvent::WakeDetected,
            ListenEvent::CommandHeard,
            ListenEvent::SpeechDone,
        ],
    );
    assert_eq!(state, ListenState::Passive);
}

#[test]
fn interruption_while_speaking_is_one_step() {
    let speaking = walk(
        ListenState::Idle,
        &[
            ListenEvent::Start,
            ListenEvent::WakeDetected,
            ListenEvent::CommandHeard,
        ],
    );
    assert_eq!(speaking, ListenState::Speaking);

    // Wake while speaking: directly Active, no Passive re-entry
    assert_eq!(speaking.on(ListenEvent::WakeDetected), ListenState::Active);
    assert_eq!(speaking.on(ListenEvent::ManualTrigger), ListenState::Active);
}

#[test]
fn passive_recognition_errors_are_self_healing() {
    let mut state = ListenState::Idle.on(ListenEvent::Start);
    for _ in 0..10 {
        state = state.on(ListenEvent::RecognitionFailed);
    }
    assert_eq!(state, ListenState::Passive);
}

#[test]
fn active_recognition_error_apologizes_then_rearms() {
    let state = walk(
        ListenState::Idle,
        &[
            ListenEvent::Start,
            ListenEvent::ManualTrigger,
            ListenEvent::RecognitionFailed, // apology is spoken
            ListenEvent::SpeechDone,
        ],
    );
    assert_eq!(state, ListenState::Passive);
}

#[test]
fn stop_releases_from_any_point() {
    for events in [
        &[ListenEvent::Start][..],
        &[ListenEvent::Start, ListenEvent::WakeDetected],
        &[
            ListenEvent::Start,
            ListenEvent::WakeDetected,
            ListenEvent::CommandHeard,
        ],
    ] {
        let state = walk(ListenState::Idle, events).on(ListenEvent::Stop);
        assert_eq!(state, ListenState::Idle);
    }
}
