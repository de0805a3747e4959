use async_trait::async_trait;

use crate::domain::OfficeId;
use crate::error::WorkflowResult;

/// Boundary to the external reference catalog.
///
/// The catalog itself (hierarchical geographic divisions, office CRUD) is a
/// separate system; the workflow only ever asks whether a referenced office
/// exists, at case creation and update time.
#[async_trait]
pub trait OfficeCatalog: Send + Sync {
    async fn office_exists(&self, office: OfficeId) -> WorkflowResult<bool>;
}
