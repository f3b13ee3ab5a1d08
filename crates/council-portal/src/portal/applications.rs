use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{Application, ApplicationStatus, CandidateKey};
use super::store::{collections, read_doc, write_doc, DocumentKey, DocumentStore, StoreError};

/// Autosave payload: the current answer set and the caller's progress gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftUpdate {
    pub candidate: String,
    pub position: String,
    pub answers: BTreeMap<String, String>,
    pub progress: u8,
}

/// Why an application operation was refused.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("application has already been submitted")]
    AlreadySubmitted,
    #[error("no application exists for this candidate and position")]
    NotFound,
    #[error("progress {0} exceeds 100")]
    InvalidProgress(u8),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the application document's lifecycle: created on first save, mutated
/// on every autosave, submitted exactly once, reset only by the applicant.
pub struct ApplicationService<S> {
    store: Arc<S>,
}

impl<S> ApplicationService<S>
where
    S: DocumentStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates the record on first save, otherwise merges the new answers
    /// and progress over the stored ones. Status, score, and the interview
    /// flag survive autosaves untouched.
    pub fn save_draft(&self, update: DraftUpdate) -> Result<Application, ApplicationError> {
        if update.progress > 100 {
            return Err(ApplicationError::InvalidProgress(update.progress));
        }

        let key = CandidateKey::new(update.candidate, update.position);
        let now = Utc::now();
        let document_key = application_key(&key);
        let mut application = read_doc::<Application, _>(self.store.as_ref(), &document_key)?
            .unwrap_or_else(|| fresh_draft(&key));

        application.answers = update.answers;
        application.progress = update.progress;
        application.updated_at = now;

        write_doc(self.store.as_ref(), &document_key, &application, false)?;
        Ok(application)
    }

    /// The one-way submission transition: timestamp set, progress forced to
    /// 100. A second submit is refused.
    pub fn submit(&self, key: &CandidateKey) -> Result<Application, ApplicationError> {
        let document_key = application_key(key);
        let mut application = read_doc::<Application, _>(self.store.as_ref(), &document_key)?
            .ok_or(ApplicationError::NotFound)?;

        if application.submitted_at.is_some() {
            return Err(ApplicationError::AlreadySubmitted);
        }

        let now = Utc::now();
        application.status = ApplicationStatus::Submitted;
        application.submitted_at = Some(now);
        application.progress = 100;
        application.updated_at = now;

        write_doc(self.store.as_ref(), &document_key, &application, false)?;
        info!(
            candidate = %key.candidate.0,
            position = %key.position.0,
            "application submitted"
        );
        Ok(application)
    }

    pub fn get(&self, key: &CandidateKey) -> Result<Option<Application>, ApplicationError> {
        Ok(read_doc(self.store.as_ref(), &application_key(key))?)
    }

    /// Explicit applicant reset: the record is overwritten with a fresh
    /// draft (the store exposes no delete primitive).
    pub fn reset(&self, key: &CandidateKey) -> Result<Application, ApplicationError> {
        let application = fresh_draft(key);
        write_doc(self.store.as_ref(), &application_key(key), &application, false)?;
        info!(
            candidate = %key.candidate.0,
            position = %key.position.0,
            "application reset to draft"
        );
        Ok(application)
    }

    /// Review-side transitions (under review, accepted, rejected).
    pub fn set_status(
        &self,
        key: &CandidateKey,
        status: ApplicationStatus,
    ) -> Result<Application, ApplicationError> {
        let document_key = application_key(key);
        let mut application = read_doc::<Application, _>(self.store.as_ref(), &document_key)?
            .ok_or(ApplicationError::NotFound)?;

        application.status = status;
        application.updated_at = Utc::now();
        write_doc(self.store.as_ref(), &document_key, &application, false)?;
        Ok(application)
    }
}

fn fresh_draft(key: &CandidateKey) -> Application {
    Application {
        candidate: key.candidate.clone(),
        position: key.position.clone(),
        status: ApplicationStatus::Draft,
        answers: BTreeMap::new(),
        progress: 0,
        score: None,
        interview_scheduled: false,
        submitted_at: None,
        updated_at: Utc::now(),
    }
}

pub(crate) fn application_key(key: &CandidateKey) -> DocumentKey {
    DocumentKey::new(collections::APPLICATIONS, key.document_id())
}
