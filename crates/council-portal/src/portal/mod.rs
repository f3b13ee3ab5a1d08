//! Student-council application portal core: application lifecycle, interview
//! slot scheduling against a fixed calendar, and multi-grader score
//! aggregation, all built on the four-primitive document-store seam.

pub mod applications;
pub mod calendar;
pub mod domain;
pub mod grading;
pub mod questions;
pub mod ranking;
pub mod roles;
pub mod router;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod tests;

pub use applications::{ApplicationError, ApplicationService, DraftUpdate};
pub use domain::{
    Application, ApplicationGrades, ApplicationStatus, CandidateId, CandidateKey, ExecutiveGrade,
    InterviewGrades, InterviewRound, MasterQuestion, PanelMemberGrade, PositionId, QuestionScore,
    RoundAssignment, ScheduledInterview,
};
pub use grading::{
    total_candidate_score, ExecutiveGradeSubmission, GradeError, PanelGradeSubmission,
    ScoreAggregator,
};
pub use ranking::{position_ranking, RankingEntry};
pub use roles::Role;
pub use router::{portal_router, PortalState};
pub use scheduler::{
    ScheduleError, ScheduleRequest, SlotAvailability, SlotScheduler, MIN_PANEL_SIZE,
};
pub use store::{
    DocumentFilter, DocumentKey, DocumentStore, MemoryStore, StoreError,
};
