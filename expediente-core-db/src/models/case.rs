use chrono::{DateTime, Utc};
use expediente_core_api::{CaseState, OfficeId};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// # Documentation
/// - Database model for a case file (expediente).
/// - `version` is the optimistic-concurrency token: every conditional write
///   carries the version observed at load time and bumps it by one, so two
///   simultaneous writers on the same case get exactly one winner.
/// - Cases are never physically deleted; an approved or rejected case
///   remains a permanent record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CaseModel {
    pub id: Uuid,

    /// Caller-supplied file code, globally unique, immutable after creation
    pub code: HeaplessString<50>,

    /// Reference into the external prosecutorial-office catalog
    pub office_id: OfficeId,

    pub summary: HeaplessString<255>,

    /// Optional pointer to an external artifact (e.g. a report path)
    pub document_ref: Option<HeaplessString<255>>,

    /// Changes only through a validated transition
    pub state: CaseState,

    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,

    pub version: i32,
}

/// Count of cases per lifecycle state. States with no cases report zero
/// rather than being absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStateCounts {
    pub draft: u64,
    pub in_review: u64,
    pub approved: u64,
    pub rejected: u64,
}

impl CaseStateCounts {
    pub fn get(&self, state: CaseState) -> u64 {
        match state {
            CaseState::Draft => self.draft,
            CaseState::InReview => self.in_review,
            CaseState::Approved => self.approved,
            CaseState::Rejected => self.rejected,
        }
    }

    pub fn add(&mut self, state: CaseState, count: u64) {
        match state {
            CaseState::Draft => self.draft += count,
            CaseState::InReview => self.in_review += count,
            CaseState::Approved => self.approved += count,
            CaseState::Rejected => self.rejected += count,
        }
    }

    pub fn total(&self) -> u64 {
        self.draft + self.in_review + self.approved + self.rejected
    }
}
