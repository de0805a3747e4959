use async_trait::async_trait;
use expediente_core_api::{OfficeCatalog, OfficeId, WorkflowResult};
use sqlx::PgPool;

use crate::utils::map_sqlx_err;

/// Office catalog backed by the `fiscalia` reference table.
pub struct PgOfficeCatalog {
    pool: PgPool,
}

impl PgOfficeCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OfficeCatalog for PgOfficeCatalog {
    async fn office_exists(&self, office: OfficeId) -> WorkflowResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM fiscalia WHERE id = $1)")
                .bind(office.0)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_err)?;
        Ok(exists)
    }
}
