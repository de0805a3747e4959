use expediente_core_api::WorkflowResult;
use expediente_core_db::models::audit::AuditEntryModel;
use expediente_core_db::models::case::CaseModel;
use expediente_core_db::models::transition::CaseTransitionModel;
use tracing::debug;

use crate::utils::map_sqlx_err;

use super::repo_impl::{classify_version_conflict, insert_audit, PgWorkflowStore};

impl PgWorkflowStore {
    /// State write, transition record and audit entry in one transaction,
    /// conditional on the version observed at load time.
    pub(super) async fn commit_transition_impl(
        repo: &PgWorkflowStore,
        case: &CaseModel,
        expected_version: i32,
        record: &CaseTransitionModel,
        audit: &AuditEntryModel,
    ) -> WorkflowResult<()> {
        let mut tx = repo.pool.begin().await.map_err(map_sqlx_err)?;

        let result = sqlx::query(
            r#"
            UPDATE expediente
            SET state = $3, version = $4
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(case.id)
        .bind(expected_version)
        .bind(case.state.code())
        .bind(case.version)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(classify_version_conflict(&mut tx, case.id).await);
        }

        sqlx::query(
            r#"
            INSERT INTO case_transition (
                id, case_id, from_state, to_state,
                justification, actor_id, actor_role, recorded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(record.case_id)
        .bind(record.from_state.code())
        .bind(record.to_state.code())
        .bind(record.justification.as_ref().map(|s| s.as_str()))
        .bind(record.actor_id)
        .bind(record.actor_role.to_string())
        .bind(record.recorded_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        insert_audit(&mut tx, audit).await?;
        tx.commit().await.map_err(map_sqlx_err)?;
        debug!(
            case_id = %case.id,
            from = %record.from_state,
            to = %record.to_state,
            "transition committed"
        );
        Ok(())
    }
}
