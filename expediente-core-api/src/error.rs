use thiserror::Error;
use uuid::Uuid;

use crate::domain::{CaseState, OfficeId, Role, WorkflowAction};

/// Error taxonomy of the case workflow.
///
/// Every domain failure is a distinct variant so callers match on the exact
/// kind; only `StorageUnavailable` is an opaque infrastructure failure.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("role {role} is not permitted to perform {action}")]
    InsufficientRole { role: Role, action: WorkflowAction },

    #[error("no valid transition from {from} to {to}")]
    InvalidTransition { from: CaseState, to: CaseState },

    #[error("a non-empty justification is required to reject a case")]
    MissingJustification,

    #[error("case {0} is not editable in its current state")]
    CaseNotEditable(Uuid),

    #[error("a case with code '{0}' already exists")]
    DuplicateCode(String),

    #[error("prosecutorial office {0} does not exist")]
    UnknownOffice(OfficeId),

    #[error("case {0} not found")]
    CaseNotFound(Uuid),

    #[error("evidence {0} not found")]
    EvidenceNotFound(Uuid),

    #[error("case {0} was modified concurrently; reload and retry")]
    ConcurrentModification(Uuid),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl WorkflowError {
    /// Stable identifier for boundary layers mapping errors onto a wire
    /// representation.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::Validation(_) => "validation_error",
            WorkflowError::InsufficientRole { .. } => "insufficient_role",
            WorkflowError::InvalidTransition { .. } => "invalid_transition",
            WorkflowError::MissingJustification => "missing_justification",
            WorkflowError::CaseNotEditable(_) => "case_not_editable",
            WorkflowError::DuplicateCode(_) => "duplicate_code",
            WorkflowError::UnknownOffice(_) => "unknown_office",
            WorkflowError::CaseNotFound(_) => "case_not_found",
            WorkflowError::EvidenceNotFound(_) => "evidence_not_found",
            WorkflowError::ConcurrentModification(_) => "concurrent_modification",
            WorkflowError::StorageUnavailable(_) => "storage_unavailable",
        }
    }

    /// Whether the caller may retry the same call after reloading state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkflowError::ConcurrentModification(_))
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
