use chrono::Utc;
use expediente_core_api::{
    authorize, ensure_valid, transition_target, Actor, CaseState, CreateCaseCommand,
    EvidenceCommand, OfficeCatalog, TransitionAction, UpdateCaseCommand, WorkflowAction,
    WorkflowError, WorkflowResult,
};
use heapless::String as HeaplessString;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::audit::{AuditAction, AuditEntityKind, AuditEntryModel};
use crate::models::case::{CaseModel, CaseStateCounts};
use crate::models::evidence::EvidenceModel;
use crate::models::transition::CaseTransitionModel;
use crate::repository::case_filter::CaseFilter;
use crate::repository::workflow_store::{CaseDetail, WorkflowStore};

/// # Documentation
/// - Orchestrates case state transitions and evidence mutations over a
///   `WorkflowStore` and an `OfficeCatalog`, both explicitly constructed
///   and passed in — no process-wide singletons.
/// - Every operation follows the same pipeline: authorize the acting role,
///   validate the payload and domain preconditions, then hand the store one
///   conditional atomic commit carrying the audit entry.
/// - The engine trusts the `Actor` it is given; authentication happens at
///   the boundary.
pub struct CaseWorkflowEngine<S, C> {
    store: S,
    catalog: C,
}

impl<S: WorkflowStore, C: OfficeCatalog> CaseWorkflowEngine<S, C> {
    pub fn new(store: S, catalog: C) -> Self {
        Self { store, catalog }
    }

    /// Read access to the underlying store, e.g. for audit inspection.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a case in DRAFT. Fails with `UnknownOffice` when the office
    /// reference is not in the catalog and `DuplicateCode` when the code is
    /// already taken.
    pub async fn create_case(
        &self,
        actor: &Actor,
        command: &CreateCaseCommand,
    ) -> WorkflowResult<Uuid> {
        authorize(actor.role, WorkflowAction::CreateCase)?;
        ensure_valid(command)?;
        if !self.catalog.office_exists(command.office_id).await? {
            return Err(WorkflowError::UnknownOffice(command.office_id));
        }

        let case = CaseModel {
            id: Uuid::new_v4(),
            code: bounded("code", &command.code)?,
            office_id: command.office_id,
            summary: bounded("summary", &command.summary)?,
            document_ref: bounded_opt("document_ref", command.document_ref.as_deref())?,
            state: CaseState::Draft,
            created_by: actor.actor_id,
            created_at: Utc::now(),
            version: 1,
        };
        let audit = AuditEntryModel::new(
            AuditEntityKind::Case,
            case.id,
            AuditAction::Create,
            actor,
            None,
            Some(snapshot(&case)?),
        );
        self.store.insert_case(&case, &audit).await?;
        info!(case_id = %case.id, code = %case.code, "case created in DRAFT");
        Ok(case.id)
    }

    /// Update the mutable case fields (summary, office, document ref).
    /// Permitted only while the case is in DRAFT or REJECTED; editing a
    /// rejected case never changes its state.
    pub async fn update_case(
        &self,
        actor: &Actor,
        case_id: Uuid,
        command: &UpdateCaseCommand,
    ) -> WorkflowResult<Uuid> {
        authorize(actor.role, WorkflowAction::UpdateCase)?;
        ensure_valid(command)?;
        let case = self.load_case_required(case_id).await?;
        if !case.state.is_editable() {
            return Err(WorkflowError::CaseNotEditable(case_id));
        }
        if !self.catalog.office_exists(command.office_id).await? {
            return Err(WorkflowError::UnknownOffice(command.office_id));
        }

        let mut updated = case.clone();
        updated.office_id = command.office_id;
        updated.summary = bounded("summary", &command.summary)?;
        updated.document_ref = bounded_opt("document_ref", command.document_ref.as_deref())?;
        updated.version = case.version + 1;

        let audit = AuditEntryModel::new(
            AuditEntityKind::Case,
            case_id,
            AuditAction::Update,
            actor,
            Some(snapshot(&case)?),
            Some(snapshot(&updated)?),
        );
        self.store.update_case(&updated, case.version, &audit).await?;
        debug!(case_id = %case_id, "case fields updated");
        Ok(case_id)
    }

    /// Attach an evidence item to a DRAFT case.
    pub async fn add_evidence(
        &self,
        actor: &Actor,
        case_id: Uuid,
        command: &EvidenceCommand,
    ) -> WorkflowResult<Uuid> {
        authorize(actor.role, WorkflowAction::AddEvidence)?;
        command.checked()?;
        let case = self.load_case_required(case_id).await?;
        if case.state != CaseState::Draft {
            return Err(WorkflowError::CaseNotEditable(case_id));
        }

        let now = Utc::now();
        let evidence = EvidenceModel {
            id: Uuid::new_v4(),
            case_id,
            name: bounded("name", &command.name)?,
            description: bounded("description", &command.description)?,
            location_in_scene: bounded("location_in_scene", &command.location_in_scene)?,
            color: bounded_opt("color", command.color.as_deref())?,
            size: bounded_opt("size", command.size.as_deref())?,
            weight: command.weight,
            created_by: actor.actor_id,
            created_at: now,
            updated_by: actor.actor_id,
            updated_at: now,
        };
        let audit = AuditEntryModel::new(
            AuditEntityKind::Evidence,
            evidence.id,
            AuditAction::Create,
            actor,
            None,
            Some(snapshot(&evidence)?),
        );
        self.store.insert_evidence(&evidence, &audit).await?;
        info!(case_id = %case_id, evidence_id = %evidence.id, "evidence attached");
        Ok(evidence.id)
    }

    /// Replace the descriptive fields of an evidence item while its owning
    /// case is still in DRAFT.
    pub async fn update_evidence(
        &self,
        actor: &Actor,
        evidence_id: Uuid,
        command: &EvidenceCommand,
    ) -> WorkflowResult<Uuid> {
        authorize(actor.role, WorkflowAction::UpdateEvidence)?;
        command.checked()?;
        let existing = self
            .store
            .load_evidence(evidence_id)
            .await?
            .ok_or(WorkflowError::EvidenceNotFound(evidence_id))?;
        let case = self.load_case_required(existing.case_id).await?;
        if case.state != CaseState::Draft {
            return Err(WorkflowError::CaseNotEditable(case.id));
        }

        let mut updated = existing.clone();
        updated.name = bounded("name", &command.name)?;
        updated.description = bounded("description", &command.description)?;
        updated.location_in_scene =
            bounded("location_in_scene", &command.location_in_scene)?;
        updated.color = bounded_opt("color", command.color.as_deref())?;
        updated.size = bounded_opt("size", command.size.as_deref())?;
        updated.weight = command.weight;
        updated.updated_by = actor.actor_id;
        updated.updated_at = Utc::now();

        let audit = AuditEntryModel::new(
            AuditEntityKind::Evidence,
            evidence_id,
            AuditAction::Update,
            actor,
            Some(snapshot(&existing)?),
            Some(snapshot(&updated)?),
        );
        self.store.update_evidence(&updated, &audit).await?;
        debug!(evidence_id = %evidence_id, "evidence updated");
        Ok(evidence_id)
    }

    /// Remove an evidence item from a DRAFT case. The audit entry keeps the
    /// full before-image as the permanent record of the removal.
    pub async fn delete_evidence(&self, actor: &Actor, evidence_id: Uuid) -> WorkflowResult<()> {
        authorize(actor.role, WorkflowAction::DeleteEvidence)?;
        let existing = self
            .store
            .load_evidence(evidence_id)
            .await?
            .ok_or(WorkflowError::EvidenceNotFound(evidence_id))?;
        let case = self.load_case_required(existing.case_id).await?;
        if case.state != CaseState::Draft {
            return Err(WorkflowError::CaseNotEditable(case.id));
        }

        let audit = AuditEntryModel::new(
            AuditEntityKind::Evidence,
            evidence_id,
            AuditAction::Delete,
            actor,
            Some(snapshot(&existing)?),
            None,
        );
        self.store
            .delete_evidence(evidence_id, existing.case_id, &audit)
            .await?;
        info!(case_id = %existing.case_id, evidence_id = %evidence_id, "evidence removed");
        Ok(())
    }

    /// DRAFT/REJECTED → IN_REVIEW.
    pub async fn request_review(&self, actor: &Actor, case_id: Uuid) -> WorkflowResult<CaseState> {
        self.apply_transition(actor, case_id, TransitionAction::RequestReview, None)
            .await
    }

    /// IN_REVIEW → APPROVED (terminal).
    pub async fn approve(&self, actor: &Actor, case_id: Uuid) -> WorkflowResult<CaseState> {
        self.apply_transition(actor, case_id, TransitionAction::Approve, None)
            .await
    }

    /// IN_REVIEW → REJECTED; requires a non-empty justification.
    pub async fn reject(
        &self,
        actor: &Actor,
        case_id: Uuid,
        justification: &str,
    ) -> WorkflowResult<CaseState> {
        self.apply_transition(actor, case_id, TransitionAction::Reject, Some(justification))
            .await
    }

    /// Target-state entry point: maps a requested state onto the transition
    /// action that reaches it. No action targets DRAFT, so asking for it is
    /// an invalid transition from wherever the case currently is.
    pub async fn change_state(
        &self,
        actor: &Actor,
        case_id: Uuid,
        target: CaseState,
        justification: Option<&str>,
    ) -> WorkflowResult<CaseState> {
        let Some(action) = TransitionAction::for_target(target) else {
            let case = self.load_case_required(case_id).await?;
            return Err(WorkflowError::InvalidTransition {
                from: case.state,
                to: target,
            });
        };
        self.apply_transition(actor, case_id, action, justification).await
    }

    /// Case record, ordered evidence and ordered history in one consistent
    /// read.
    pub async fn get_case_detail(&self, actor: &Actor, case_id: Uuid) -> WorkflowResult<CaseDetail> {
        authorize(actor.role, WorkflowAction::ReadCaseDetail)?;
        self.store
            .load_detail(case_id)
            .await?
            .ok_or(WorkflowError::CaseNotFound(case_id))
    }

    pub async fn list_cases(
        &self,
        actor: &Actor,
        filter: &CaseFilter,
    ) -> WorkflowResult<Vec<CaseModel>> {
        authorize(actor.role, WorkflowAction::ListCases)?;
        self.store.list_cases(filter).await
    }

    pub async fn count_by_state(&self, actor: &Actor) -> WorkflowResult<CaseStateCounts> {
        authorize(actor.role, WorkflowAction::ReadCaseCounts)?;
        self.store.count_by_state().await
    }

    async fn apply_transition(
        &self,
        actor: &Actor,
        case_id: Uuid,
        action: TransitionAction,
        justification: Option<&str>,
    ) -> WorkflowResult<CaseState> {
        // A reject without substance fails before the role is even
        // consulted; both checks must pass for the transition to proceed.
        let justification = justification.map(str::trim).filter(|j| !j.is_empty());
        if action == TransitionAction::Reject && justification.is_none() {
            return Err(WorkflowError::MissingJustification);
        }
        authorize(actor.role, action.workflow_action())?;

        let case = self.load_case_required(case_id).await?;
        let Some(to) = transition_target(case.state, action) else {
            return Err(WorkflowError::InvalidTransition {
                from: case.state,
                to: action.target_state(),
            });
        };

        let mut updated = case.clone();
        updated.state = to;
        updated.version = case.version + 1;

        let record = CaseTransitionModel {
            id: Uuid::new_v4(),
            case_id,
            from_state: case.state,
            to_state: to,
            justification: bounded_opt("justification", justification)?,
            actor_id: actor.actor_id,
            actor_role: actor.role,
            recorded_at: Utc::now(),
        };
        let audit = AuditEntryModel::new(
            AuditEntityKind::Case,
            case_id,
            AuditAction::Transition,
            actor,
            Some(snapshot(&case)?),
            Some(snapshot(&updated)?),
        );
        self.store
            .commit_transition(&updated, case.version, &record, &audit)
            .await?;
        info!(case_id = %case_id, from = %case.state, to = %to, "case state transitioned");
        Ok(to)
    }

    async fn load_case_required(&self, case_id: Uuid) -> WorkflowResult<CaseModel> {
        self.store
            .load_case(case_id)
            .await?
            .ok_or(WorkflowError::CaseNotFound(case_id))
    }
}

fn bounded<const N: usize>(field: &str, value: &str) -> WorkflowResult<HeaplessString<N>> {
    HeaplessString::try_from(value)
        .map_err(|_| WorkflowError::Validation(format!("{field} exceeds {N} characters")))
}

fn bounded_opt<const N: usize>(
    field: &str,
    value: Option<&str>,
) -> WorkflowResult<Option<HeaplessString<N>>> {
    value.map(|v| bounded(field, v)).transpose()
}

/// Audit snapshots are part of the durable write, so a failure to encode
/// one is a storage-level failure.
fn snapshot<T: Serialize>(value: &T) -> WorkflowResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| WorkflowError::StorageUnavailable(format!("snapshot encoding failed: {e}")))
}
