use chrono::{DateTime, Utc};
use expediente_core_api::CaseState;

use crate::models::case::CaseModel;

/// Optional, conjunctive filters for case listings.
///
/// Results are always returned in a stable order (creation time ascending,
/// ties broken by id) so pagination callers get deterministic pages. An
/// empty result set is not an error.
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    pub state: Option<CaseState>,
    /// Inclusive lower bound on creation time
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time
    pub created_to: Option<DateTime<Utc>>,
    /// Substring match against the case code
    pub code_contains: Option<String>,
}

impl CaseFilter {
    pub fn with_state(mut self, state: CaseState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn created_from(mut self, from: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self
    }

    pub fn created_to(mut self, to: DateTime<Utc>) -> Self {
        self.created_to = Some(to);
        self
    }

    pub fn with_code_contains(mut self, fragment: impl Into<String>) -> Self {
        self.code_contains = Some(fragment.into());
        self
    }

    /// Single definition of the filter semantics, shared by the in-memory
    /// store and usable to cross-check any other implementation.
    pub fn matches(&self, case: &CaseModel) -> bool {
        if let Some(state) = self.state {
            if case.state != state {
                return false;
            }
        }
        if let Some(from) = self.created_from {
            if case.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.created_to {
            if case.created_at > to {
                return false;
            }
        }
        if let Some(fragment) = &self.code_contains {
            if !case.code.as_str().contains(fragment.as_str()) {
                return false;
            }
        }
        true
    }
}
