use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for applicants (same value as the portal user id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Identifier wrapper for advertised council positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionId(pub String);

/// Composite identity shared by applications, interview schedules, and grades.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateKey {
    pub candidate: CandidateId,
    pub position: PositionId,
}

impl CandidateKey {
    pub fn new(candidate: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            candidate: CandidateId(candidate.into()),
            position: PositionId(position.into()),
        }
    }

    /// Stable document id: `<candidate>:<position>`.
    pub fn document_id(&self) -> String {
        format!("{}:{}", self.candidate.0, self.position.0)
    }
}

/// High level status tracked throughout an application's life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    UnderReview,
    InterviewScheduled,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// A candidate's position application as persisted.
///
/// `score` is denormalized from the executive grade aggregate and is never
/// edited independently; it always equals the current mean of the grade set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub candidate: CandidateId,
    pub position: PositionId,
    pub status: ApplicationStatus,
    pub answers: BTreeMap<String, String>,
    pub progress: u8,
    pub score: Option<f64>,
    pub interview_scheduled: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn key(&self) -> CandidateKey {
        CandidateKey {
            candidate: self.candidate.clone(),
            position: self.position.clone(),
        }
    }
}

/// The two interview stages: a multi-seat group round and a single-seat
/// individual round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewRound {
    Group,
    Individual,
}

impl InterviewRound {
    pub const fn label(self) -> &'static str {
        match self {
            InterviewRound::Group => "group",
            InterviewRound::Individual => "individual",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "group" => Some(InterviewRound::Group),
            "individual" => Some(InterviewRound::Individual),
            _ => None,
        }
    }
}

/// One round's placement. The four fields travel together: a round is either
/// fully assigned or entirely absent from the schedule record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundAssignment {
    pub date: NaiveDate,
    pub slot: String,
    pub room: String,
    pub panel: Vec<String>,
}

/// One schedule record per candidate per position; rounds are set and
/// cleared independently and the record itself is never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledInterview {
    pub candidate: CandidateId,
    pub position: PositionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<RoundAssignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual: Option<RoundAssignment>,
}

impl ScheduledInterview {
    pub fn empty(key: &CandidateKey) -> Self {
        Self {
            candidate: key.candidate.clone(),
            position: key.position.clone(),
            group: None,
            individual: None,
        }
    }

    pub fn round(&self, round: InterviewRound) -> Option<&RoundAssignment> {
        match round {
            InterviewRound::Group => self.group.as_ref(),
            InterviewRound::Individual => self.individual.as_ref(),
        }
    }

    pub fn fully_scheduled(&self) -> bool {
        self.group.is_some() && self.individual.is_some()
    }

    pub fn unscheduled(&self) -> bool {
        self.group.is_none() && self.individual.is_none()
    }
}

/// One scored answer within a grade sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub question_id: String,
    pub score: f64,
    pub max_score: f64,
}

/// One executive's scored evaluation of one application. `total_score` is
/// the mean of that executive's own question scores plus the overall
/// impression; cross-executive averaging happens only in the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveGrade {
    pub executive_id: String,
    pub executive_name: String,
    pub question_scores: Vec<QuestionScore>,
    pub overall_impression: f64,
    pub feedback: String,
    pub total_score: f64,
    pub submitted_at: DateTime<Utc>,
}

/// Aggregate of all executive grades for one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationGrades {
    pub candidate: CandidateId,
    pub position: PositionId,
    pub grades: Vec<ExecutiveGrade>,
    pub average_score: f64,
    pub updated_at: DateTime<Utc>,
}

/// One panelist's scored evaluation of one interview round. A score of zero
/// counts as a real score on the 0-5 scale, never as "ungraded".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelMemberGrade {
    pub panel_member_id: String,
    pub question_scores: Vec<QuestionScore>,
    pub criteria: BTreeMap<String, bool>,
    pub feedback: String,
    pub submitted_at: DateTime<Utc>,
}

impl PanelMemberGrade {
    /// This member's own mean across their question scores.
    pub fn personal_average(&self) -> Option<f64> {
        mean(self.question_scores.iter().map(|entry| entry.score))
    }
}

/// A question frozen into a candidate's individual-round sheet, tagged with
/// the pool it was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterQuestion {
    pub pool: String,
    pub prompt: String,
}

/// Aggregate of all panel grades for one candidate and round. The
/// individual round additionally carries the frozen master question set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewGrades {
    pub candidate: CandidateId,
    pub position: PositionId,
    pub round: InterviewRound,
    pub grades: Vec<PanelMemberGrade>,
    pub average_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_questions: Option<Vec<MasterQuestion>>,
    pub updated_at: DateTime<Utc>,
}

impl InterviewGrades {
    pub fn empty(key: &CandidateKey, round: InterviewRound, now: DateTime<Utc>) -> Self {
        Self {
            candidate: key.candidate.clone(),
            position: key.position.clone(),
            round,
            grades: Vec::new(),
            average_score: 0.0,
            master_questions: None,
            updated_at: now,
        }
    }
}

/// Arithmetic mean over an iterator of scores; `None` when empty.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
