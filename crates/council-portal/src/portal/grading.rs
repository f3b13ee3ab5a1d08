use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::info;

use super::domain::{
    mean, Application, ApplicationGrades, CandidateKey, ExecutiveGrade, InterviewGrades,
    InterviewRound, MasterQuestion, PanelMemberGrade, QuestionScore,
};
use super::questions;
use super::store::{collections, read_doc, write_doc, DocumentKey, DocumentStore, StoreError};

/// Upper bound for the overall-impression score on an application grade.
const IMPRESSION_MAX: f64 = 10.0;

/// One executive's incoming grade sheet for an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveGradeSubmission {
    pub executive_id: String,
    pub executive_name: String,
    pub question_scores: Vec<QuestionScore>,
    pub overall_impression: f64,
    #[serde(default)]
    pub feedback: String,
}

/// One panelist's incoming grade sheet for an interview round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelGradeSubmission {
    pub panel_member_id: String,
    pub question_scores: Vec<QuestionScore>,
    #[serde(default)]
    pub criteria: BTreeMap<String, bool>,
    #[serde(default)]
    pub feedback: String,
}

/// Why a grade submission was refused.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    #[error("grade sheet contains no question scores")]
    EmptyScoreSheet,
    #[error("score {value} for '{question}' falls outside 0..={max}")]
    ScoreOutOfRange {
        question: String,
        value: f64,
        max: f64,
    },
    #[error("no application exists for this candidate and position")]
    ApplicationMissing,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Merges grade submissions into per-candidate aggregates and recomputes the
/// derived averages in full on every write.
///
/// Aggregates are read-modify-write with no version token: two graders
/// submitting at the same moment can overwrite each other's recompute. The
/// portal accepts that at its scale rather than guarding it.
pub struct ScoreAggregator<S> {
    store: Arc<S>,
}

impl<S> ScoreAggregator<S>
where
    S: DocumentStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Replaces or appends one executive's grade (at most one entry per
    /// executive id), recomputes the unweighted mean of all totals, and
    /// denormalizes it onto the parent application's `score` field.
    pub fn upsert_executive_grade(
        &self,
        key: &CandidateKey,
        submission: ExecutiveGradeSubmission,
    ) -> Result<ApplicationGrades, GradeError> {
        validate_scores(&submission.question_scores)?;
        if submission.overall_impression < 0.0 || submission.overall_impression > IMPRESSION_MAX {
            return Err(GradeError::ScoreOutOfRange {
                question: "overall_impression".to_string(),
                value: submission.overall_impression,
                max: IMPRESSION_MAX,
            });
        }

        let application_key = DocumentKey::new(collections::APPLICATIONS, key.document_id());
        if read_doc::<Application, _>(self.store.as_ref(), &application_key)?.is_none() {
            return Err(GradeError::ApplicationMissing);
        }

        let now = Utc::now();
        let total_score = mean(
            submission
                .question_scores
                .iter()
                .map(|entry| entry.score)
                .chain(std::iter::once(submission.overall_impression)),
        )
        .expect("sheet validated non-empty");

        let grade = ExecutiveGrade {
            executive_id: submission.executive_id,
            executive_name: submission.executive_name,
            question_scores: submission.question_scores,
            overall_impression: submission.overall_impression,
            feedback: submission.feedback,
            total_score,
            submitted_at: now,
        };

        let document_key = application_grades_key(key);
        let mut aggregate = read_doc::<ApplicationGrades, _>(self.store.as_ref(), &document_key)?
            .unwrap_or_else(|| ApplicationGrades {
                candidate: key.candidate.clone(),
                position: key.position.clone(),
                grades: Vec::new(),
                average_score: 0.0,
                updated_at: now,
            });

        match aggregate
            .grades
            .iter_mut()
            .find(|existing| existing.executive_id == grade.executive_id)
        {
            Some(existing) => *existing = grade,
            None => aggregate.grades.push(grade),
        }
        aggregate.average_score = mean(aggregate.grades.iter().map(|entry| entry.total_score))
            .expect("aggregate holds at least the new grade");
        aggregate.updated_at = now;

        write_doc(self.store.as_ref(), &document_key, &aggregate, false)?;
        self.denormalize_score(key, aggregate.average_score)?;
        info!(
            candidate = %key.candidate.0,
            position = %key.position.0,
            graders = aggregate.grades.len(),
            average = aggregate.average_score,
            "application grade upserted"
        );

        Ok(aggregate)
    }

    /// Replaces or appends one panelist's grade on the round document and
    /// recomputes the mean-of-member-means. For the individual round the
    /// master question sheet is frozen on first touch.
    pub fn upsert_panel_grade(
        &self,
        key: &CandidateKey,
        round: InterviewRound,
        submission: PanelGradeSubmission,
    ) -> Result<InterviewGrades, GradeError> {
        validate_scores(&submission.question_scores)?;

        let now = Utc::now();
        let document_key = interview_grades_key(key, round);
        let mut aggregate = read_doc::<InterviewGrades, _>(self.store.as_ref(), &document_key)?
            .unwrap_or_else(|| InterviewGrades::empty(key, round, now));

        if round == InterviewRound::Individual {
            freeze_questions(&mut aggregate);
        }

        let grade = PanelMemberGrade {
            panel_member_id: submission.panel_member_id,
            question_scores: submission.question_scores,
            criteria: submission.criteria,
            feedback: submission.feedback,
            submitted_at: now,
        };

        match aggregate
            .grades
            .iter_mut()
            .find(|existing| existing.panel_member_id == grade.panel_member_id)
        {
            Some(existing) => *existing = grade,
            None => aggregate.grades.push(grade),
        }
        aggregate.average_score = mean(
            aggregate
                .grades
                .iter()
                .filter_map(|entry| entry.personal_average()),
        )
        .unwrap_or(0.0);
        aggregate.updated_at = now;

        write_doc(self.store.as_ref(), &document_key, &aggregate, false)?;
        info!(
            candidate = %key.candidate.0,
            position = %key.position.0,
            round = round.label(),
            panelists = aggregate.grades.len(),
            average = aggregate.average_score,
            "interview grade upserted"
        );

        Ok(aggregate)
    }

    /// The candidate's frozen individual-round question sheet, generating
    /// and persisting it on first call. Every later call returns the stored
    /// list unchanged.
    pub fn master_questions(
        &self,
        key: &CandidateKey,
    ) -> Result<Vec<MasterQuestion>, GradeError> {
        let now = Utc::now();
        let document_key = interview_grades_key(key, InterviewRound::Individual);
        let mut aggregate = read_doc::<InterviewGrades, _>(self.store.as_ref(), &document_key)?
            .unwrap_or_else(|| InterviewGrades::empty(key, InterviewRound::Individual, now));

        if let Some(frozen) = &aggregate.master_questions {
            return Ok(frozen.clone());
        }

        freeze_questions(&mut aggregate);
        aggregate.updated_at = now;
        write_doc(self.store.as_ref(), &document_key, &aggregate, false)?;

        Ok(aggregate
            .master_questions
            .expect("questions frozen just above"))
    }

    /// Mean of the round averages, counting only rounds with at least one
    /// submitted grade; zero when neither round has any.
    pub fn combined_interview_score(&self, key: &CandidateKey) -> Result<f64, GradeError> {
        let mut averages = Vec::with_capacity(2);
        for round in [InterviewRound::Group, InterviewRound::Individual] {
            let document_key = interview_grades_key(key, round);
            if let Some(aggregate) =
                read_doc::<InterviewGrades, _>(self.store.as_ref(), &document_key)?
            {
                if !aggregate.grades.is_empty() {
                    averages.push(aggregate.average_score);
                }
            }
        }
        Ok(mean(averages.into_iter()).unwrap_or(0.0))
    }

    /// The stored executive-grade aggregate, when any grade exists.
    pub fn application_grades(
        &self,
        key: &CandidateKey,
    ) -> Result<Option<ApplicationGrades>, GradeError> {
        Ok(read_doc(self.store.as_ref(), &application_grades_key(key))?)
    }

    /// The stored panel-grade aggregate for one round, when it exists.
    pub fn interview_grades(
        &self,
        key: &CandidateKey,
        round: InterviewRound,
    ) -> Result<Option<InterviewGrades>, GradeError> {
        Ok(read_doc(self.store.as_ref(), &interview_grades_key(key, round))?)
    }

    fn denormalize_score(&self, key: &CandidateKey, average: f64) -> Result<(), GradeError> {
        let application_key = DocumentKey::new(collections::APPLICATIONS, key.document_id());
        let mut fields = Map::new();
        fields.insert(
            "score".to_string(),
            Number::from_f64(average).map(Value::Number).unwrap_or(Value::Null),
        );
        match self.store.update(&application_key, fields) {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => Err(GradeError::ApplicationMissing),
            Err(other) => Err(other.into()),
        }
    }
}

/// Application score (/10) plus combined interview score (/5), a /15 value
/// used only for ranking. Never persisted.
pub fn total_candidate_score(application_score: Option<f64>, combined_interview: f64) -> f64 {
    application_score.unwrap_or(0.0) + combined_interview
}

fn validate_scores(scores: &[QuestionScore]) -> Result<(), GradeError> {
    if scores.is_empty() {
        return Err(GradeError::EmptyScoreSheet);
    }
    for entry in scores {
        if entry.score < 0.0 || entry.score > entry.max_score {
            return Err(GradeError::ScoreOutOfRange {
                question: entry.question_id.clone(),
                value: entry.score,
                max: entry.max_score,
            });
        }
    }
    Ok(())
}

/// The one place a master sheet is drawn. No-op when already frozen.
fn freeze_questions(aggregate: &mut InterviewGrades) {
    if aggregate.master_questions.is_none() {
        let mut rng = rand::thread_rng();
        aggregate.master_questions = Some(questions::draw_master_questions(&mut rng));
    }
}

pub(crate) fn application_grades_key(key: &CandidateKey) -> DocumentKey {
    DocumentKey::new(collections::APPLICATION_GRADES, key.document_id())
}

pub(crate) fn interview_grades_key(key: &CandidateKey, round: InterviewRound) -> DocumentKey {
    DocumentKey::new(
        collections::INTERVIEW_GRADES,
        format!("{}:{}", key.document_id(), round.label()),
    )
}
