use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use super::calendar;
use super::domain::{
    Application, ApplicationStatus, CandidateKey, InterviewRound, RoundAssignment,
    ScheduledInterview,
};
use super::store::{
    collections, read_doc, write_doc, DocumentFilter, DocumentKey, DocumentStore, StoreError,
};

/// Minimum panel size accepted when placing a candidate into a slot.
pub const MIN_PANEL_SIZE: usize = 2;

/// A proposed placement of one candidate into one round's slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub candidate: String,
    pub position: String,
    pub round: InterviewRound,
    pub date: NaiveDate,
    pub slot: String,
    pub room: String,
    pub panel: Vec<String>,
}

impl ScheduleRequest {
    pub fn key(&self) -> CandidateKey {
        CandidateKey::new(self.candidate.clone(), self.position.clone())
    }
}

/// Remaining seats for one slot label on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotAvailability {
    pub slot: &'static str,
    pub capacity: usize,
    pub taken: usize,
}

impl SlotAvailability {
    pub fn open(&self) -> bool {
        self.taken < self.capacity
    }
}

/// Why a schedule or clear request was refused.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("{date} is not an interview day for the {} round", .round.label())]
    InvalidDate {
        date: NaiveDate,
        round: InterviewRound,
    },
    #[error("'{slot}' is not a listed time slot for the {} round", .round.label())]
    UnknownSlot { slot: String, round: InterviewRound },
    #[error("slot '{slot}' on {date} is already full")]
    SlotFull { slot: String, date: NaiveDate },
    #[error("a room must be assigned before scheduling")]
    EmptyRoom,
    #[error("panel needs at least {required} members, found {found}")]
    PanelTooSmall { found: usize, required: usize },
    #[error("no {} round is scheduled for this candidate", .round.label())]
    NotScheduled { round: InterviewRound },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Places candidates into the fixed interview calendar and keeps the parent
/// application's `interview_scheduled` flag in step.
///
/// Capacity checks are a linear scan over the persisted schedule records;
/// nothing here locks, so two racing schedulers can both observe a free
/// seat. The backing store's document writes are the only atomicity.
pub struct SlotScheduler<S> {
    store: Arc<S>,
}

impl<S> SlotScheduler<S>
where
    S: DocumentStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// True when the slot still has a free seat on that date, not counting
    /// any existing placement of `exclude` (used when rescheduling).
    pub fn is_slot_available(
        &self,
        round: InterviewRound,
        date: NaiveDate,
        slot: &str,
        exclude: Option<&CandidateKey>,
    ) -> Result<bool, ScheduleError> {
        let taken = self.occupancy(round, date, slot, exclude)?;
        Ok(taken < calendar::seat_capacity(round))
    }

    /// Seat usage for every listed slot of the round on one date.
    pub fn availability(
        &self,
        round: InterviewRound,
        date: NaiveDate,
    ) -> Result<Vec<SlotAvailability>, ScheduleError> {
        let capacity = calendar::seat_capacity(round);
        let schedules = self.all_schedules()?;
        Ok(calendar::time_slots(round)
            .iter()
            .copied()
            .map(|slot| SlotAvailability {
                slot,
                capacity,
                taken: count_matching(&schedules, round, date, slot, None),
            })
            .collect())
    }

    /// Validates and persists one round placement. Precondition failures are
    /// reported before anything is written; the round's four fields land in
    /// a single merge write.
    pub fn schedule(&self, request: ScheduleRequest) -> Result<ScheduledInterview, ScheduleError> {
        if !calendar::is_valid_date(request.date, request.round) {
            return Err(ScheduleError::InvalidDate {
                date: request.date,
                round: request.round,
            });
        }
        if !calendar::is_listed_slot(&request.slot, request.round) {
            return Err(ScheduleError::UnknownSlot {
                slot: request.slot,
                round: request.round,
            });
        }
        if request.room.trim().is_empty() {
            return Err(ScheduleError::EmptyRoom);
        }
        if request.panel.len() < MIN_PANEL_SIZE {
            return Err(ScheduleError::PanelTooSmall {
                found: request.panel.len(),
                required: MIN_PANEL_SIZE,
            });
        }

        let key = request.key();
        let taken = self.occupancy(request.round, request.date, &request.slot, Some(&key))?;
        if taken >= calendar::seat_capacity(request.round) {
            return Err(ScheduleError::SlotFull {
                slot: request.slot,
                date: request.date,
            });
        }

        let document_key = interview_key(&key);
        let mut record = read_doc::<ScheduledInterview, _>(self.store.as_ref(), &document_key)?
            .unwrap_or_else(|| ScheduledInterview::empty(&key));

        let assignment = RoundAssignment {
            date: request.date,
            slot: request.slot.clone(),
            room: request.room.clone(),
            panel: request.panel.clone(),
        };
        match request.round {
            InterviewRound::Group => record.group = Some(assignment),
            InterviewRound::Individual => record.individual = Some(assignment),
        }

        write_doc(self.store.as_ref(), &document_key, &record, true)?;
        info!(
            candidate = %key.candidate.0,
            position = %key.position.0,
            round = request.round.label(),
            slot = %request.slot,
            "interview scheduled"
        );

        if record.fully_scheduled() {
            self.mark_application(&key, true)?;
        }

        Ok(record)
    }

    /// Removes exactly one round's placement. When no round remains, the
    /// application's flag is cleared as well.
    pub fn clear_round(
        &self,
        key: &CandidateKey,
        round: InterviewRound,
    ) -> Result<ScheduledInterview, ScheduleError> {
        let document_key = interview_key(key);
        let mut record = read_doc::<ScheduledInterview, _>(self.store.as_ref(), &document_key)?
            .ok_or(ScheduleError::NotScheduled { round })?;

        let cleared = match round {
            InterviewRound::Group => record.group.take(),
            InterviewRound::Individual => record.individual.take(),
        };
        if cleared.is_none() {
            return Err(ScheduleError::NotScheduled { round });
        }

        let mut fields = Map::new();
        fields.insert(round.label().to_string(), Value::Null);
        self.store.update(&document_key, fields)?;
        info!(
            candidate = %key.candidate.0,
            position = %key.position.0,
            round = round.label(),
            "interview round cleared"
        );

        if record.unscheduled() {
            self.mark_application(key, false)?;
        }

        Ok(record)
    }

    fn occupancy(
        &self,
        round: InterviewRound,
        date: NaiveDate,
        slot: &str,
        exclude: Option<&CandidateKey>,
    ) -> Result<usize, ScheduleError> {
        let schedules = self.all_schedules()?;
        Ok(count_matching(&schedules, round, date, slot, exclude))
    }

    fn all_schedules(&self) -> Result<Vec<ScheduledInterview>, ScheduleError> {
        let documents = self
            .store
            .query(collections::INTERVIEWS, &DocumentFilter::All)?;
        let mut schedules = Vec::with_capacity(documents.len());
        for document in documents {
            schedules.push(serde_json::from_value(document).map_err(StoreError::from)?);
        }
        Ok(schedules)
    }

    fn mark_application(&self, key: &CandidateKey, scheduled: bool) -> Result<(), ScheduleError> {
        let application_key = DocumentKey::new(collections::APPLICATIONS, key.document_id());
        let application =
            read_doc::<Application, _>(self.store.as_ref(), &application_key)?
                .ok_or(StoreError::NotFound)?;

        let mut fields = Map::new();
        fields.insert("interview_scheduled".to_string(), Value::Bool(scheduled));
        let status = if scheduled {
            Some(ApplicationStatus::InterviewScheduled)
        } else if application.status == ApplicationStatus::InterviewScheduled {
            Some(ApplicationStatus::UnderReview)
        } else {
            None
        };
        if let Some(status) = status {
            fields.insert(
                "status".to_string(),
                Value::String(status.label().to_string()),
            );
        }
        self.store.update(&application_key, fields)?;
        Ok(())
    }
}

pub(crate) fn interview_key(key: &CandidateKey) -> DocumentKey {
    DocumentKey::new(collections::INTERVIEWS, key.document_id())
}

fn count_matching(
    schedules: &[ScheduledInterview],
    round: InterviewRound,
    date: NaiveDate,
    slot: &str,
    exclude: Option<&CandidateKey>,
) -> usize {
    schedules
        .iter()
        .filter(|record| match exclude {
            Some(key) => record.candidate != key.candidate || record.position != key.position,
            None => true,
        })
        .filter_map(|record| record.round(round))
        .filter(|assignment| assignment.date == date && assignment.slot == slot)
        .count()
}
