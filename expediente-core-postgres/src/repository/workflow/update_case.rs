use expediente_core_api::WorkflowResult;
use expediente_core_db::models::audit::AuditEntryModel;
use expediente_core_db::models::case::CaseModel;
use tracing::debug;

use crate::utils::map_sqlx_err;

use super::repo_impl::{classify_version_conflict, insert_audit, PgWorkflowStore};

impl PgWorkflowStore {
    pub(super) async fn update_case_impl(
        repo: &PgWorkflowStore,
        case: &CaseModel,
        expected_version: i32,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        let mut tx = repo.pool.begin().await.map_err(map_sqlx_err)?;

        let result = sqlx::query(
            r#"
            UPDATE expediente
            SET office_id = $3, summary = $4, document_ref = $5, version = $6
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(case.id)
        .bind(expected_version)
        .bind(case.office_id.0)
        .bind(case.summary.as_str())
        .bind(case.document_ref.as_ref().map(|s| s.as_str()))
        .bind(case.version)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(classify_version_conflict(&mut tx, case.id).await);
        }

        insert_audit(&mut tx, audit).await?;
        tx.commit().await.map_err(map_sqlx_err)?;
        debug!(case_id = %case.id, version = case.version, "case fields updated");
        Ok(())
    }
}
