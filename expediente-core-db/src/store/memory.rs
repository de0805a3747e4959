use async_trait::async_trait;
use expediente_core_api::{CaseState, OfficeCatalog, OfficeId, WorkflowError, WorkflowResult};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::audit::{AuditEntityKind, AuditEntryModel};
use crate::models::case::{CaseModel, CaseStateCounts};
use crate::models::evidence::EvidenceModel;
use crate::models::transition::CaseTransitionModel;
use crate::repository::case_filter::CaseFilter;
use crate::repository::workflow_store::{CaseDetail, WorkflowStore};

/// In-memory `WorkflowStore` with the same conditional-commit semantics as
/// the durable implementations: version checks on case writes, DRAFT
/// re-assertion on evidence writes, audit entries riding the same commit.
///
/// One lock guards the whole store, so every mutating method is a single
/// atomic unit exactly like a database transaction. Backs the engine
/// test-suite and embedders that do not need durable storage.
#[derive(Default)]
pub struct InMemoryWorkflowStore {
    state: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    cases: HashMap<Uuid, CaseModel>,
    codes: HashMap<String, Uuid>,
    evidence: HashMap<Uuid, EvidenceModel>,
    transitions: Vec<CaseTransitionModel>,
    audit: Vec<AuditEntryModel>,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn load_case(&self, id: Uuid) -> WorkflowResult<Option<CaseModel>> {
        Ok(self.state.read().cases.get(&id).cloned())
    }

    async fn insert_case(
        &self,
        case: &CaseModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        let mut state = self.state.write();
        if state.codes.contains_key(case.code.as_str()) {
            return Err(WorkflowError::DuplicateCode(case.code.to_string()));
        }
        state.codes.insert(case.code.to_string(), case.id);
        state.cases.insert(case.id, case.clone());
        state.audit.push(audit.clone());
        Ok(())
    }

    async fn update_case(
        &self,
        case: &CaseModel,
        expected_version: i32,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        let mut state = self.state.write();
        let current_version = state
            .cases
            .get(&case.id)
            .map(|c| c.version)
            .ok_or(WorkflowError::CaseNotFound(case.id))?;
        if current_version != expected_version {
            return Err(WorkflowError::ConcurrentModification(case.id));
        }
        state.cases.insert(case.id, case.clone());
        state.audit.push(audit.clone());
        Ok(())
    }

    async fn commit_transition(
        &self,
        case: &CaseModel,
        expected_version: i32,
        record: &CaseTransitionModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        let mut state = self.state.write();
        let current_version = state
            .cases
            .get(&case.id)
            .map(|c| c.version)
            .ok_or(WorkflowError::CaseNotFound(case.id))?;
        if current_version != expected_version {
            return Err(WorkflowError::ConcurrentModification(case.id));
        }
        state.cases.insert(case.id, case.clone());
        state.transitions.push(record.clone());
        state.audit.push(audit.clone());
        Ok(())
    }

    async fn load_evidence(&self, id: Uuid) -> WorkflowResult<Option<EvidenceModel>> {
        Ok(self.state.read().evidence.get(&id).cloned())
    }

    async fn insert_evidence(
        &self,
        evidence: &EvidenceModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        let mut state = self.state.write();
        let owner = state
            .cases
            .get(&evidence.case_id)
            .ok_or(WorkflowError::CaseNotFound(evidence.case_id))?;
        if owner.state != CaseState::Draft {
            return Err(WorkflowError::CaseNotEditable(owner.id));
        }
        state.evidence.insert(evidence.id, evidence.clone());
        state.audit.push(audit.clone());
        Ok(())
    }

    async fn update_evidence(
        &self,
        evidence: &EvidenceModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        let mut state = self.state.write();
        if !state.evidence.contains_key(&evidence.id) {
            return Err(WorkflowError::EvidenceNotFound(evidence.id));
        }
        let owner = state
            .cases
            .get(&evidence.case_id)
            .ok_or(WorkflowError::CaseNotFound(evidence.case_id))?;
        if owner.state != CaseState::Draft {
            return Err(WorkflowError::CaseNotEditable(owner.id));
        }
        state.evidence.insert(evidence.id, evidence.clone());
        state.audit.push(audit.clone());
        Ok(())
    }

    async fn delete_evidence(
        &self,
        evidence_id: Uuid,
        case_id: Uuid,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        let mut state = self.state.write();
        let owner = state
            .cases
            .get(&case_id)
            .ok_or(WorkflowError::CaseNotFound(case_id))?;
        if owner.state != CaseState::Draft {
            return Err(WorkflowError::CaseNotEditable(owner.id));
        }
        if state.evidence.remove(&evidence_id).is_none() {
            return Err(WorkflowError::EvidenceNotFound(evidence_id));
        }
        state.audit.push(audit.clone());
        Ok(())
    }

    async fn load_detail(&self, case_id: Uuid) -> WorkflowResult<Option<CaseDetail>> {
        let state = self.state.read();
        let Some(case) = state.cases.get(&case_id).cloned() else {
            return Ok(None);
        };
        let mut evidence: Vec<EvidenceModel> = state
            .evidence
            .values()
            .filter(|e| e.case_id == case_id)
            .cloned()
            .collect();
        evidence.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        let history: Vec<CaseTransitionModel> = state
            .transitions
            .iter()
            .filter(|t| t.case_id == case_id)
            .cloned()
            .collect();
        Ok(Some(CaseDetail {
            case,
            evidence,
            history,
        }))
    }

    async fn list_cases(&self, filter: &CaseFilter) -> WorkflowResult<Vec<CaseModel>> {
        let state = self.state.read();
        let mut cases: Vec<CaseModel> = state
            .cases
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        cases.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(cases)
    }

    async fn count_by_state(&self) -> WorkflowResult<CaseStateCounts> {
        let state = self.state.read();
        let mut counts = CaseStateCounts::default();
        for case in state.cases.values() {
            counts.add(case.state, 1);
        }
        Ok(counts)
    }

    async fn load_audit_trail(
        &self,
        entity_kind: AuditEntityKind,
        entity_id: Uuid,
    ) -> WorkflowResult<Vec<AuditEntryModel>> {
        let state = self.state.read();
        Ok(state
            .audit
            .iter()
            .filter(|e| e.entity_kind == entity_kind && e.entity_id == entity_id)
            .cloned()
            .collect())
    }
}

/// Office catalog backed by a fixed set of known offices; the in-memory
/// counterpart of the reference-table lookup.
#[derive(Debug, Clone, Default)]
pub struct StaticOfficeCatalog {
    offices: HashSet<OfficeId>,
}

impl StaticOfficeCatalog {
    pub fn new<I: IntoIterator<Item = OfficeId>>(offices: I) -> Self {
        Self {
            offices: offices.into_iter().collect(),
        }
    }
}

#[async_trait]
impl OfficeCatalog for StaticOfficeCatalog {
    async fn office_exists(&self, office: OfficeId) -> WorkflowResult<bool> {
        Ok(self.offices.contains(&office))
    }
}
