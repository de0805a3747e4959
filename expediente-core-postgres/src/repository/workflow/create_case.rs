use expediente_core_api::{WorkflowError, WorkflowResult};
use expediente_core_db::models::audit::AuditEntryModel;
use expediente_core_db::models::case::CaseModel;
use tracing::debug;

use crate::utils::{is_unique_violation, map_sqlx_err};

use super::repo_impl::{insert_audit, PgWorkflowStore};

impl PgWorkflowStore {
    pub(super) async fn insert_case_impl(
        repo: &PgWorkflowStore,
        case: &CaseModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        let mut tx = repo.pool.begin().await.map_err(map_sqlx_err)?;

        let result = sqlx::query(
            r#"
            INSERT INTO expediente (
                id, code, office_id, summary, document_ref,
                state, created_by, created_at, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(case.id)
        .bind(case.code.as_str())
        .bind(case.office_id.0)
        .bind(case.summary.as_str())
        .bind(case.document_ref.as_ref().map(|s| s.as_str()))
        .bind(case.state.code())
        .bind(case.created_by)
        .bind(case.created_at)
        .bind(case.version)
        .execute(&mut *tx)
        .await;

        if let Err(e) = result {
            // The unique constraint on `code` settles duplicate races.
            if is_unique_violation(&e) {
                return Err(WorkflowError::DuplicateCode(case.code.to_string()));
            }
            return Err(map_sqlx_err(e));
        }

        insert_audit(&mut tx, audit).await?;
        tx.commit().await.map_err(map_sqlx_err)?;
        debug!(case_id = %case.id, "case row inserted");
        Ok(())
    }
}
