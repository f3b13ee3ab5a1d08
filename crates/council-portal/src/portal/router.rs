use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::applications::{ApplicationError, ApplicationService, DraftUpdate};
use super::domain::{ApplicationStatus, CandidateKey, InterviewRound};
use super::grading::{
    ExecutiveGradeSubmission, GradeError, PanelGradeSubmission, ScoreAggregator,
};
use super::ranking::position_ranking;
use super::roles::Role;
use super::scheduler::{ScheduleError, ScheduleRequest, SlotScheduler};
use super::store::{DocumentStore, StoreError};

/// The portal's services bundled for router state.
pub struct PortalState<S> {
    pub applications: ApplicationService<S>,
    pub scheduler: SlotScheduler<S>,
    pub grades: ScoreAggregator<S>,
    store: Arc<S>,
}

impl<S> PortalState<S>
where
    S: DocumentStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            applications: ApplicationService::new(store.clone()),
            scheduler: SlotScheduler::new(store.clone()),
            grades: ScoreAggregator::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

/// Router builder exposing the portal's HTTP operations.
pub fn portal_router<S>(state: Arc<PortalState<S>>) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(save_application_handler::<S>))
        .route(
            "/api/v1/applications/submit",
            post(submit_application_handler::<S>),
        )
        .route(
            "/api/v1/applications/reset",
            post(reset_application_handler::<S>),
        )
        .route(
            "/api/v1/applications/:candidate/:position",
            get(get_application_handler::<S>),
        )
        .route(
            "/api/v1/applications/:candidate/:position/status",
            post(set_status_handler::<S>),
        )
        .route("/api/v1/interviews", post(schedule_handler::<S>))
        .route(
            "/api/v1/interviews/availability",
            get(availability_handler::<S>),
        )
        .route(
            "/api/v1/interviews/:candidate/:position/questions",
            get(master_questions_handler::<S>),
        )
        .route(
            "/api/v1/interviews/:candidate/:position/:round",
            delete(clear_round_handler::<S>),
        )
        .route(
            "/api/v1/grades/application",
            post(executive_grade_handler::<S>),
        )
        .route("/api/v1/grades/interview", post(panel_grade_handler::<S>))
        .route(
            "/api/v1/positions/:position/ranking",
            get(ranking_handler::<S>),
        )
        .route("/api/v1/roles/:role", get(role_handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateBody {
    candidate: String,
    position: String,
}

impl CandidateBody {
    fn key(&self) -> CandidateKey {
        CandidateKey::new(self.candidate.clone(), self.position.clone())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusBody {
    status: ApplicationStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AvailabilityQuery {
    round: String,
    date: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExecutiveGradeBody {
    candidate: String,
    position: String,
    grade: ExecutiveGradeSubmission,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PanelGradeBody {
    candidate: String,
    position: String,
    round: InterviewRound,
    grade: PanelGradeSubmission,
}

pub(crate) async fn save_application_handler<S>(
    State(state): State<Arc<PortalState<S>>>,
    Json(update): Json<DraftUpdate>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match state.applications.save_draft(update) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => application_error_response(error),
    }
}

pub(crate) async fn submit_application_handler<S>(
    State(state): State<Arc<PortalState<S>>>,
    Json(body): Json<CandidateBody>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match state.applications.submit(&body.key()) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => application_error_response(error),
    }
}

pub(crate) async fn reset_application_handler<S>(
    State(state): State<Arc<PortalState<S>>>,
    Json(body): Json<CandidateBody>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match state.applications.reset(&body.key()) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => application_error_response(error),
    }
}

pub(crate) async fn get_application_handler<S>(
    State(state): State<Arc<PortalState<S>>>,
    Path((candidate, position)): Path<(String, String)>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let key = CandidateKey::new(candidate, position);
    match state.applications.get(&key) {
        Ok(Some(application)) => (StatusCode::OK, Json(application)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "application not found"),
        Err(error) => application_error_response(error),
    }
}

pub(crate) async fn set_status_handler<S>(
    State(state): State<Arc<PortalState<S>>>,
    Path((candidate, position)): Path<(String, String)>,
    Json(body): Json<StatusBody>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let key = CandidateKey::new(candidate, position);
    match state.applications.set_status(&key, body.status) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => application_error_response(error),
    }
}

pub(crate) async fn schedule_handler<S>(
    State(state): State<Arc<PortalState<S>>>,
    Json(request): Json<ScheduleRequest>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match state.scheduler.schedule(request) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => schedule_error_response(error),
    }
}

pub(crate) async fn availability_handler<S>(
    State(state): State<Arc<PortalState<S>>>,
    Query(query): Query<AvailabilityQuery>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let Some(round) = InterviewRound::parse(&query.round) else {
        return error_response(StatusCode::BAD_REQUEST, "unknown interview round");
    };
    let Ok(date) = NaiveDate::parse_from_str(query.date.trim(), "%Y-%m-%d") else {
        return error_response(StatusCode::BAD_REQUEST, "date must be YYYY-MM-DD");
    };

    match state.scheduler.availability(round, date) {
        Ok(slots) => (StatusCode::OK, Json(slots)).into_response(),
        Err(error) => schedule_error_response(error),
    }
}

pub(crate) async fn clear_round_handler<S>(
    State(state): State<Arc<PortalState<S>>>,
    Path((candidate, position, round)): Path<(String, String, String)>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let Some(round) = InterviewRound::parse(&round) else {
        return error_response(StatusCode::BAD_REQUEST, "unknown interview round");
    };
    let key = CandidateKey::new(candidate, position);
    match state.scheduler.clear_round(&key, round) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => schedule_error_response(error),
    }
}

pub(crate) async fn master_questions_handler<S>(
    State(state): State<Arc<PortalState<S>>>,
    Path((candidate, position)): Path<(String, String)>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let key = CandidateKey::new(candidate, position);
    match state.grades.master_questions(&key) {
        Ok(questions) => (StatusCode::OK, Json(questions)).into_response(),
        Err(error) => grade_error_response(error),
    }
}

pub(crate) async fn executive_grade_handler<S>(
    State(state): State<Arc<PortalState<S>>>,
    Json(body): Json<ExecutiveGradeBody>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let key = CandidateKey::new(body.candidate, body.position);
    match state.grades.upsert_executive_grade(&key, body.grade) {
        Ok(aggregate) => (StatusCode::OK, Json(aggregate)).into_response(),
        Err(error) => grade_error_response(error),
    }
}

pub(crate) async fn panel_grade_handler<S>(
    State(state): State<Arc<PortalState<S>>>,
    Json(body): Json<PanelGradeBody>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let key = CandidateKey::new(body.candidate, body.position);
    match state.grades.upsert_panel_grade(&key, body.round, body.grade) {
        Ok(aggregate) => (StatusCode::OK, Json(aggregate)).into_response(),
        Err(error) => grade_error_response(error),
    }
}

pub(crate) async fn ranking_handler<S>(
    State(state): State<Arc<PortalState<S>>>,
    Path(position): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match position_ranking(state.store().as_ref(), &position) {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(error) => grade_error_response(error),
    }
}

/// Capability sheet for one role, consumed by callers gating their views.
/// The portal itself performs no authorization on the other routes.
pub(crate) async fn role_handler(Path(role): Path<String>) -> Response {
    let Some(role) = Role::parse(&role) else {
        return error_response(StatusCode::NOT_FOUND, "unknown role");
    };
    let payload = json!({
        "role": role.label(),
        "may_submit_applications": role.may_submit_applications(),
        "may_grade": role.may_grade(),
        "may_schedule": role.may_schedule(),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn application_error_response(error: ApplicationError) -> Response {
    let status = match &error {
        ApplicationError::AlreadySubmitted => StatusCode::CONFLICT,
        ApplicationError::NotFound => StatusCode::NOT_FOUND,
        ApplicationError::InvalidProgress(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ApplicationError::Store(store) => store_status(store),
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

fn schedule_error_response(error: ScheduleError) -> Response {
    let status = match &error {
        ScheduleError::InvalidDate { .. }
        | ScheduleError::UnknownSlot { .. }
        | ScheduleError::SlotFull { .. }
        | ScheduleError::EmptyRoom
        | ScheduleError::PanelTooSmall { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ScheduleError::NotScheduled { .. } => StatusCode::NOT_FOUND,
        ScheduleError::Store(store) => store_status(store),
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

fn grade_error_response(error: GradeError) -> Response {
    let status = match &error {
        GradeError::EmptyScoreSheet | GradeError::ScoreOutOfRange { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        GradeError::ApplicationMissing => StatusCode::NOT_FOUND,
        GradeError::Store(store) => store_status(store),
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

fn store_status(error: &StoreError) -> StatusCode {
    match error {
        StoreError::NotFound => StatusCode::NOT_FOUND,
        StoreError::Unavailable(_) | StoreError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
