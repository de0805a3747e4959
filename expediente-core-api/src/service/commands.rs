use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::domain::OfficeId;
use crate::error::{WorkflowError, WorkflowResult};

/// Run a payload's declared validation rules, folding failures into the
/// typed taxonomy.
pub fn ensure_valid<T: Validate>(payload: &T) -> WorkflowResult<()> {
    payload
        .validate()
        .map_err(|e| WorkflowError::Validation(e.to_string()))
}

/// Payload for `create_case`. Field widths follow the records office's
/// file-format limits.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCaseCommand {
    /// Caller-supplied file code, unique across all cases
    #[validate(length(min = 1, max = 50, message = "code must be 1 to 50 characters"))]
    pub code: String,
    pub office_id: OfficeId,
    #[validate(length(min = 1, max = 255, message = "summary must be 1 to 255 characters"))]
    pub summary: String,
    /// Optional pointer to an external artifact, e.g. a report path
    #[validate(length(max = 255, message = "document_ref must be at most 255 characters"))]
    pub document_ref: Option<String>,
}

/// Payload for `update_case`. The case code is immutable and therefore
/// absent here.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCaseCommand {
    pub office_id: OfficeId,
    #[validate(length(min = 1, max = 255, message = "summary must be 1 to 255 characters"))]
    pub summary: String,
    #[validate(length(max = 255, message = "document_ref must be at most 255 characters"))]
    pub document_ref: Option<String>,
}

/// Payload for `add_evidence` and `update_evidence`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EvidenceCommand {
    #[validate(length(min = 1, max = 150, message = "name must be 1 to 150 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 500, message = "description must be 1 to 500 characters"))]
    pub description: String,
    #[validate(length(min = 1, max = 255, message = "location_in_scene must be 1 to 255 characters"))]
    pub location_in_scene: String,
    #[validate(length(max = 50, message = "color must be at most 50 characters"))]
    pub color: Option<String>,
    #[validate(length(max = 50, message = "size must be at most 50 characters"))]
    pub size: Option<String>,
    pub weight: Option<Decimal>,
}

impl EvidenceCommand {
    /// Full field validation; `validator` has no range rule for `Decimal`,
    /// so the weight sign is checked by hand.
    pub fn checked(&self) -> WorkflowResult<()> {
        ensure_valid(self)?;
        if let Some(weight) = self.weight {
            if weight.is_sign_negative() {
                return Err(WorkflowError::Validation(
                    "evidence weight must be non-negative".into(),
                ));
            }
        }
        Ok(())
    }
}
