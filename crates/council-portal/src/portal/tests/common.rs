use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::portal::applications::DraftUpdate;
use crate::portal::domain::{CandidateKey, InterviewRound, QuestionScore};
use crate::portal::grading::{ExecutiveGradeSubmission, PanelGradeSubmission};
use crate::portal::router::PortalState;
use crate::portal::scheduler::ScheduleRequest;
use crate::portal::store::{
    DocumentFilter, DocumentKey, DocumentStore, MemoryStore, StoreError,
};

pub(super) fn build_state() -> (Arc<PortalState<MemoryStore>>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let state = Arc::new(PortalState::new(store.clone()));
    (state, store)
}

pub(super) fn key(candidate: &str, position: &str) -> CandidateKey {
    CandidateKey::new(candidate, position)
}

pub(super) fn draft(candidate: &str, position: &str) -> DraftUpdate {
    let mut answers = BTreeMap::new();
    answers.insert(
        "why_apply".to_string(),
        "I want to organize the winter fundraiser.".to_string(),
    );
    answers.insert(
        "experience".to_string(),
        "Two years on the yearbook committee.".to_string(),
    );
    DraftUpdate {
        candidate: candidate.to_string(),
        position: position.to_string(),
        answers,
        progress: 60,
    }
}

/// Saves and submits an application so grading and scheduling can run.
pub(super) fn submitted_application(
    state: &PortalState<MemoryStore>,
    candidate: &str,
    position: &str,
) -> CandidateKey {
    state
        .applications
        .save_draft(draft(candidate, position))
        .expect("draft saves");
    let key = key(candidate, position);
    state.applications.submit(&key).expect("submit succeeds");
    key
}

pub(super) fn group_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 21).expect("valid group interview date")
}

pub(super) fn individual_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 23).expect("valid individual interview date")
}

pub(super) fn schedule_request(
    candidate: &str,
    position: &str,
    round: InterviewRound,
    date: NaiveDate,
    slot: &str,
) -> ScheduleRequest {
    ScheduleRequest {
        candidate: candidate.to_string(),
        position: position.to_string(),
        round,
        date,
        slot: slot.to_string(),
        room: "Room 204".to_string(),
        panel: vec!["exec-ana".to_string(), "exec-ben".to_string()],
    }
}

pub(super) fn question_scores(scores: &[f64], max: f64) -> Vec<QuestionScore> {
    scores
        .iter()
        .enumerate()
        .map(|(index, score)| QuestionScore {
            question_id: format!("q{}", index + 1),
            score: *score,
            max_score: max,
        })
        .collect()
}

pub(super) fn executive_sheet(
    executive_id: &str,
    scores: &[f64],
    impression: f64,
) -> ExecutiveGradeSubmission {
    ExecutiveGradeSubmission {
        executive_id: executive_id.to_string(),
        executive_name: executive_id.to_string(),
        question_scores: question_scores(scores, 10.0),
        overall_impression: impression,
        feedback: "Solid written answers.".to_string(),
    }
}

pub(super) fn panel_sheet(panel_member_id: &str, scores: &[f64]) -> PanelGradeSubmission {
    let mut criteria = BTreeMap::new();
    criteria.insert("arrived_on_time".to_string(), true);
    criteria.insert("engaged_with_panel".to_string(), true);
    PanelGradeSubmission {
        panel_member_id: panel_member_id.to_string(),
        question_scores: question_scores(scores, 5.0),
        criteria,
        feedback: "Confident, concrete examples.".to_string(),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Store whose every call fails, for persistence-error paths.
pub(super) struct OfflineStore;

impl DocumentStore for OfflineStore {
    fn get(&self, _key: &DocumentKey) -> Result<Option<Value>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn set(&self, _key: &DocumentKey, _value: Value, _merge: bool) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn update(&self, _key: &DocumentKey, _fields: Map<String, Value>) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn query(
        &self,
        _collection: &'static str,
        _filter: &DocumentFilter,
    ) -> Result<Vec<Value>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }
}
