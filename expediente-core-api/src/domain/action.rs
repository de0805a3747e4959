use serde::{Deserialize, Serialize};

use crate::domain::state::CaseState;

/// Every operation the workflow exposes, as consulted by the
/// authorization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    CreateCase,
    UpdateCase,
    AddEvidence,
    UpdateEvidence,
    DeleteEvidence,
    RequestReview,
    Approve,
    Reject,
    ReadCaseDetail,
    ListCases,
    ReadCaseCounts,
}

impl std::fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowAction::CreateCase => write!(f, "create_case"),
            WorkflowAction::UpdateCase => write!(f, "update_case"),
            WorkflowAction::AddEvidence => write!(f, "add_evidence"),
            WorkflowAction::UpdateEvidence => write!(f, "update_evidence"),
            WorkflowAction::DeleteEvidence => write!(f, "delete_evidence"),
            WorkflowAction::RequestReview => write!(f, "request_review"),
            WorkflowAction::Approve => write!(f, "approve"),
            WorkflowAction::Reject => write!(f, "reject"),
            WorkflowAction::ReadCaseDetail => write!(f, "read_case_detail"),
            WorkflowAction::ListCases => write!(f, "list_cases"),
            WorkflowAction::ReadCaseCounts => write!(f, "read_case_counts"),
        }
    }
}

/// The subset of actions that move a case through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    RequestReview,
    Approve,
    Reject,
}

impl TransitionAction {
    pub fn workflow_action(self) -> WorkflowAction {
        match self {
            TransitionAction::RequestReview => WorkflowAction::RequestReview,
            TransitionAction::Approve => WorkflowAction::Approve,
            TransitionAction::Reject => WorkflowAction::Reject,
        }
    }

    /// The state this action drives a case into when it is legal.
    pub fn target_state(self) -> CaseState {
        match self {
            TransitionAction::RequestReview => CaseState::InReview,
            TransitionAction::Approve => CaseState::Approved,
            TransitionAction::Reject => CaseState::Rejected,
        }
    }

    /// Map a requested target state code onto the action that reaches it.
    /// `Draft` is only ever an initial state, so no action targets it.
    pub fn for_target(target: CaseState) -> Option<TransitionAction> {
        match target {
            CaseState::InReview => Some(TransitionAction::RequestReview),
            CaseState::Approved => Some(TransitionAction::Approve),
            CaseState::Rejected => Some(TransitionAction::Reject),
            CaseState::Draft => None,
        }
    }
}

impl std::fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.workflow_action().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_state_and_for_target_are_inverses() {
        for action in [
            TransitionAction::RequestReview,
            TransitionAction::Approve,
            TransitionAction::Reject,
        ] {
            assert_eq!(TransitionAction::for_target(action.target_state()), Some(action));
        }
        assert_eq!(TransitionAction::for_target(CaseState::Draft), None);
    }
}
