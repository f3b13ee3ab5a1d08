use std::cmp::Ordering;

use serde::Serialize;

use super::domain::{Application, ApplicationStatus, InterviewGrades, InterviewRound, mean};
use super::grading::{interview_grades_key, total_candidate_score, GradeError};
use super::store::{collections, read_doc, DocumentFilter, DocumentStore};

/// One candidate's standing in a position's ranking report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub candidate: String,
    pub position: String,
    pub status: ApplicationStatus,
    pub application_score: Option<f64>,
    pub combined_interview_score: f64,
    pub total_score: f64,
}

/// All applications for a position, scored and sorted descending by the /15
/// total. Ties keep their stored document order; there is no secondary key.
pub fn position_ranking<S>(store: &S, position: &str) -> Result<Vec<RankingEntry>, GradeError>
where
    S: DocumentStore + ?Sized,
{
    let documents = store.query(
        collections::APPLICATIONS,
        &DocumentFilter::field_equals("position", position),
    )?;

    let mut entries = Vec::with_capacity(documents.len());
    for document in documents {
        let application: Application =
            serde_json::from_value(document).map_err(super::store::StoreError::from)?;
        let key = application.key();

        let mut round_averages = Vec::with_capacity(2);
        for round in [InterviewRound::Group, InterviewRound::Individual] {
            if let Some(aggregate) =
                read_doc::<InterviewGrades, _>(store, &interview_grades_key(&key, round))?
            {
                if !aggregate.grades.is_empty() {
                    round_averages.push(aggregate.average_score);
                }
            }
        }
        let combined = mean(round_averages.into_iter()).unwrap_or(0.0);

        entries.push(RankingEntry {
            candidate: application.candidate.0.clone(),
            position: application.position.0.clone(),
            status: application.status,
            application_score: application.score,
            combined_interview_score: combined,
            total_score: total_candidate_score(application.score, combined),
        });
    }

    entries.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(Ordering::Equal)
    });
    Ok(entries)
}
