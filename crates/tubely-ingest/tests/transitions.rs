//! Single-step behavior of the ingest state machine.

mod common;

use common::*;
use tubely_ingest::{IngestError, IngestPhase, IngestState};
use tubely_models::UserId;

#[tokio::test]
async fn walks_every_phase_in_order() {
    let h = Harness::new();
    let mut state = IngestState::new(h.request(Some("video/mp4")));
    let mut phases = vec![state.phase()];

    while !state.is_terminal() {
        state = h.orchestrator.advance(state).await;
        phases.push(state.phase());
    }

    assert_eq!(
        phases,
        vec![
            IngestPhase::Received,
            IngestPhase::Validated,
            IngestPhase::Staged,
            IngestPhase::Remuxed,
            IngestPhase::Inspected,
            IngestPhase::KeyDerived,
            IngestPhase::Uploaded,
            IngestPhase::Committed,
        ]
    );
}

#[tokio::test]
async fn validation_does_not_read_the_body() {
    let h = Harness::new();

    let state = h
        .orchestrator
        .advance(IngestState::new(h.request(Some("video/mp4"))))
        .await;

    let validated = match state {
        IngestState::Validated(validated) => validated,
        other => panic!("expected Validated, got {:?}", other.phase()),
    };
    assert_eq!(validated.ctx.record.id, h.record.id);
    assert_eq!(validated.ctx.content_type, "video/mp4");
    assert!(h.staged_files().is_empty());
}

#[tokio::test]
async fn staged_and_remuxed_files_live_until_the_state_is_dropped() {
    let h = Harness::new();

    let mut state = IngestState::new(h.request(Some("video/mp4")));
    while state.phase() != IngestPhase::Remuxed {
        state = h.orchestrator.advance(state).await;
    }

    let IngestState::Remuxed(remuxed) = state else {
        unreachable!();
    };
    assert!(remuxed.staged.path().exists());
    assert!(remuxed.remuxed.exists());
    assert_eq!(std::fs::read(&remuxed.remuxed).unwrap(), VIDEO_BYTES);
    assert_eq!(h.staged_files().len(), 2);

    drop(remuxed);
    assert!(h.staged_files().is_empty());
}

#[tokio::test]
async fn failure_names_the_phase_not_reached() {
    let h = Harness::with(Options {
        ffmpeg: Script::Fail,
        ..Default::default()
    });

    let mut state = IngestState::new(h.request(Some("video/mp4")));
    while !state.is_terminal() {
        state = h.orchestrator.advance(state).await;
    }

    let IngestState::Failed(failed) = state else {
        panic!("expected Failed");
    };
    assert_eq!(failed.phase, IngestPhase::Remuxed);
    assert!(matches!(failed.error, IngestError::Remux(_)));
}

#[tokio::test]
async fn rejected_caller_fails_at_validation() {
    let h = Harness::new();

    let state = h
        .orchestrator
        .advance(IngestState::new(h.request_as(UserId::new(), Some("video/mp4"))))
        .await;

    let IngestState::Failed(failed) = state else {
        panic!("expected Failed");
    };
    assert_eq!(failed.phase, IngestPhase::Validated);
    assert!(matches!(failed.error, IngestError::NotOwner { .. }));
}

#[tokio::test]
async fn terminal_states_do_not_advance() {
    let h = Harness::new();

    let mut state = IngestState::new(h.request(Some("video/mp4")));
    while !state.is_terminal() {
        state = h.orchestrator.advance(state).await;
    }
    assert_eq!(state.phase(), IngestPhase::Committed);

    let state = h.orchestrator.advance(state).await;
    assert_eq!(state.phase(), IngestPhase::Committed);
    assert_eq!(h.objects.puts().len(), 1);
    assert_eq!(h.videos.calls(), vec!["get_video", "update_video"]);
}
