use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::action::TransitionAction;

/// # Documentation
/// - Lifecycle states of a case file (expediente).
/// - The numeric codes are the boundary representation (1..4) and any
///   external form must round-trip through `code`/`from_code`.
/// - `Approved` is terminal; a rejected case stays a permanent record but
///   remains editable and may be re-submitted for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseState {
    Draft = 1,
    InReview = 2,
    Approved = 3,
    Rejected = 4,
}

impl CaseState {
    pub const ALL: [CaseState; 4] = [
        CaseState::Draft,
        CaseState::InReview,
        CaseState::Approved,
        CaseState::Rejected,
    ];

    /// Boundary state code (1=DRAFT, 2=IN_REVIEW, 3=APPROVED, 4=REJECTED).
    pub fn code(self) -> i16 {
        self as i16
    }

    pub fn from_code(code: i16) -> Option<CaseState> {
        match code {
            1 => Some(CaseState::Draft),
            2 => Some(CaseState::InReview),
            3 => Some(CaseState::Approved),
            4 => Some(CaseState::Rejected),
            _ => None,
        }
    }

    /// Whether the case's general fields (summary, office, document ref)
    /// may still be mutated.
    pub fn is_editable(self) -> bool {
        matches!(self, CaseState::Draft | CaseState::Rejected)
    }

    /// No transition ever leaves an approved case.
    pub fn is_terminal(self) -> bool {
        self == CaseState::Approved
    }
}

impl std::fmt::Display for CaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseState::Draft => write!(f, "DRAFT"),
            CaseState::InReview => write!(f, "IN_REVIEW"),
            CaseState::Approved => write!(f, "APPROVED"),
            CaseState::Rejected => write!(f, "REJECTED"),
        }
    }
}

impl FromStr for CaseState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(CaseState::Draft),
            "IN_REVIEW" => Ok(CaseState::InReview),
            "APPROVED" => Ok(CaseState::Approved),
            "REJECTED" => Ok(CaseState::Rejected),
            _ => Err(format!("Invalid CaseState: {s}")),
        }
    }
}

/// The fixed transition table. Anything not listed here is an invalid
/// transition, including every attempt to leave `Approved`.
pub fn transition_target(from: CaseState, action: TransitionAction) -> Option<CaseState> {
    match (from, action) {
        (CaseState::Draft, TransitionAction::RequestReview) => Some(CaseState::InReview),
        (CaseState::Rejected, TransitionAction::RequestReview) => Some(CaseState::InReview),
        (CaseState::InReview, TransitionAction::Approve) => Some(CaseState::Approved),
        (CaseState::InReview, TransitionAction::Reject) => Some(CaseState::Rejected),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for state in CaseState::ALL {
            assert_eq!(CaseState::from_code(state.code()), Some(state));
        }
        assert_eq!(CaseState::from_code(0), None);
        assert_eq!(CaseState::from_code(5), None);
    }

    #[test]
    fn names_round_trip() {
        for state in CaseState::ALL {
            assert_eq!(state.to_string().parse::<CaseState>(), Ok(state));
        }
    }

    #[test]
    fn transition_table_matches_the_lifecycle() {
        use TransitionAction::*;

        assert_eq!(
            transition_target(CaseState::Draft, RequestReview),
            Some(CaseState::InReview)
        );
        assert_eq!(
            transition_target(CaseState::Rejected, RequestReview),
            Some(CaseState::InReview)
        );
        assert_eq!(
            transition_target(CaseState::InReview, Approve),
            Some(CaseState::Approved)
        );
        assert_eq!(
            transition_target(CaseState::InReview, Reject),
            Some(CaseState::Rejected)
        );
    }

    #[test]
    fn approved_is_terminal_for_every_action() {
        for action in [
            TransitionAction::RequestReview,
            TransitionAction::Approve,
            TransitionAction::Reject,
        ] {
            assert_eq!(transition_target(CaseState::Approved, action), None);
        }
    }

    #[test]
    fn review_actions_require_in_review() {
        for from in [CaseState::Draft, CaseState::Rejected] {
            assert_eq!(transition_target(from, TransitionAction::Approve), None);
            assert_eq!(transition_target(from, TransitionAction::Reject), None);
        }
        assert_eq!(
            transition_target(CaseState::InReview, TransitionAction::RequestReview),
            None
        );
    }

    #[test]
    fn editability_follows_the_state() {
        assert!(CaseState::Draft.is_editable());
        assert!(CaseState::Rejected.is_editable());
        assert!(!CaseState::InReview.is_editable());
        assert!(!CaseState::Approved.is_editable());
    }
}
