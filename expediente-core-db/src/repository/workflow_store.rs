use async_trait::async_trait;
use expediente_core_api::WorkflowResult;
use serde::Serialize;
use uuid::Uuid;

use crate::models::audit::{AuditEntityKind, AuditEntryModel};
use crate::models::case::{CaseModel, CaseStateCounts};
use crate::models::evidence::EvidenceModel;
use crate::models::transition::CaseTransitionModel;
use crate::repository::case_filter::CaseFilter;

/// One consistent view of a case: the record itself plus its ordered
/// evidence list and ordered transition history, all reflecting the same
/// point in time.
#[derive(Debug, Clone, Serialize)]
pub struct CaseDetail {
    pub case: CaseModel,
    pub evidence: Vec<EvidenceModel>,
    pub history: Vec<CaseTransitionModel>,
}

/// Storage contract of the case workflow engine.
///
/// Every mutating method is one atomic unit: the entity write and the
/// accompanying transition/audit rows commit together or not at all — an
/// audit entry must never exist without its mutation, nor vice versa.
///
/// Conditional writes take the case `version` observed at load time (or
/// re-assert the DRAFT state for evidence) inside the transaction, so two
/// simultaneous writers on the same case get exactly one winner. Cases are
/// independent units of concurrency; implementations never coordinate
/// across cases.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn load_case(&self, id: Uuid) -> WorkflowResult<Option<CaseModel>>;

    /// Persist a new case in its initial state together with its audit
    /// entry. Fails with `DuplicateCode` when the code is already taken.
    async fn insert_case(
        &self,
        case: &CaseModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()>;

    /// Replace the mutable case fields. `case.version` must already be
    /// `expected_version + 1`; a version mismatch in storage fails with
    /// `ConcurrentModification`.
    async fn update_case(
        &self,
        case: &CaseModel,
        expected_version: i32,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()>;

    /// Write the new state, the transition record and the audit entry as
    /// one unit, conditional on `expected_version`.
    async fn commit_transition(
        &self,
        case: &CaseModel,
        expected_version: i32,
        record: &CaseTransitionModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()>;

    async fn load_evidence(&self, id: Uuid) -> WorkflowResult<Option<EvidenceModel>>;

    /// Insert an evidence item, re-asserting inside the transaction that
    /// the owning case is still in DRAFT (`CaseNotEditable` otherwise, so a
    /// concurrent transition can never race a partial insert).
    async fn insert_evidence(
        &self,
        evidence: &EvidenceModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()>;

    /// Replace an evidence item under the same DRAFT re-assertion.
    async fn update_evidence(
        &self,
        evidence: &EvidenceModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()>;

    /// Remove an evidence item under the same DRAFT re-assertion. The
    /// removal is logical: the audit entry remains the permanent record.
    async fn delete_evidence(
        &self,
        evidence_id: Uuid,
        case_id: Uuid,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()>;

    /// Case, evidence and history in one consistent read.
    async fn load_detail(&self, case_id: Uuid) -> WorkflowResult<Option<CaseDetail>>;

    /// Filtered listing in the stable order documented on `CaseFilter`.
    async fn list_cases(&self, filter: &CaseFilter) -> WorkflowResult<Vec<CaseModel>>;

    /// Per-state case counts, zero-valued states included.
    async fn count_by_state(&self) -> WorkflowResult<CaseStateCounts>;

    /// Ordered audit trail of one entity, oldest first.
    async fn load_audit_trail(
        &self,
        entity_kind: AuditEntityKind,
        entity_id: Uuid,
    ) -> WorkflowResult<Vec<AuditEntryModel>>;
}
