use super::common::*;

use crate::portal::applications::ApplicationError;
use crate::portal::domain::ApplicationStatus;

#[test]
fn first_save_creates_a_draft() {
    let (state, _) = build_state();

    let application = state
        .applications
        .save_draft(draft("u-1", "treasurer"))
        .expect("draft saves");

    assert_eq!(application.status, ApplicationStatus::Draft);
    assert_eq!(application.progress, 60);
    assert!(application.score.is_none());
    assert!(application.submitted_at.is_none());
    assert!(!application.interview_scheduled);
}

#[test]
fn autosave_leaves_submission_state_alone() {
    let (state, _) = build_state();
    let key = submitted_application(&state, "u-1", "treasurer");

    let submitted = state
        .applications
        .get(&key)
        .expect("fetch")
        .expect("present");
    let submitted_at = submitted.submitted_at.expect("submitted");

    let mut update = draft("u-1", "treasurer");
    update
        .answers
        .insert("extra".to_string(), "late edit".to_string());
    let saved = state.applications.save_draft(update).expect("autosave");

    assert_eq!(saved.status, ApplicationStatus::Submitted);
    assert_eq!(saved.submitted_at, Some(submitted_at));
    assert_eq!(saved.answers.get("extra").map(String::as_str), Some("late edit"));
}

#[test]
fn submission_happens_exactly_once() {
    let (state, _) = build_state();
    let key = submitted_application(&state, "u-1", "treasurer");

    let stored = state
        .applications
        .get(&key)
        .expect("fetch")
        .expect("present");
    assert_eq!(stored.status, ApplicationStatus::Submitted);
    assert_eq!(stored.progress, 100, "submission forces full progress");

    match state.applications.submit(&key) {
        Err(ApplicationError::AlreadySubmitted) => {}
        other => panic!("expected already submitted, got {other:?}"),
    }
}

#[test]
fn submitting_an_unsaved_application_fails() {
    let (state, _) = build_state();

    match state.applications.submit(&key("ghost", "treasurer")) {
        Err(ApplicationError::NotFound) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn progress_above_one_hundred_is_refused() {
    let (state, _) = build_state();

    let mut update = draft("u-1", "treasurer");
    update.progress = 130;
    match state.applications.save_draft(update) {
        Err(ApplicationError::InvalidProgress(130)) => {}
        other => panic!("expected invalid progress, got {other:?}"),
    }
}

#[test]
fn reset_returns_a_fresh_draft() {
    let (state, _) = build_state();
    let key = submitted_application(&state, "u-1", "treasurer");
    state
        .grades
        .upsert_executive_grade(&key, executive_sheet("alice", &[8.0], 8.0))
        .expect("graded");

    let application = state.applications.reset(&key).expect("reset");

    assert_eq!(application.status, ApplicationStatus::Draft);
    assert!(application.answers.is_empty());
    assert_eq!(application.progress, 0);
    assert!(application.score.is_none());
    assert!(application.submitted_at.is_none());
}

#[test]
fn review_transitions_update_the_status() {
    let (state, _) = build_state();
    let candidate = submitted_application(&state, "u-1", "treasurer");

    let application = state
        .applications
        .set_status(&candidate, ApplicationStatus::Accepted)
        .expect("status set");
    assert_eq!(application.status, ApplicationStatus::Accepted);

    match state
        .applications
        .set_status(&key("missing", "treasurer"), ApplicationStatus::Rejected)
    {
        Err(ApplicationError::NotFound) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}
