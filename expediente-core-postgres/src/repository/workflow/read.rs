use expediente_core_api::WorkflowResult;
use expediente_core_db::models::audit::{AuditEntityKind, AuditEntryModel};
use expediente_core_db::models::case::{CaseModel, CaseStateCounts};
use expediente_core_db::models::evidence::EvidenceModel;
use expediente_core_db::models::transition::CaseTransitionModel;
use expediente_core_db::repository::case_filter::CaseFilter;
use expediente_core_db::repository::workflow_store::CaseDetail;
use sqlx::Row;
use uuid::Uuid;

use crate::utils::{map_row_err, map_sqlx_err, TryFromRow};

use super::repo_impl::PgWorkflowStore;
use super::rows::state_from_code;

impl PgWorkflowStore {
    pub(super) async fn load_case_impl(
        repo: &PgWorkflowStore,
        id: Uuid,
    ) -> WorkflowResult<Option<CaseModel>> {
        let row = sqlx::query("SELECT * FROM expediente WHERE id = $1")
            .bind(id)
            .fetch_optional(&repo.pool)
            .await
            .map_err(map_sqlx_err)?;
        row.map(|r| CaseModel::try_from_row(&r))
            .transpose()
            .map_err(map_row_err)
    }

    /// Case, evidence and history under one repeatable-read snapshot, so
    /// the three result sets reflect the same point in time.
    pub(super) async fn load_detail_impl(
        repo: &PgWorkflowStore,
        case_id: Uuid,
    ) -> WorkflowResult<Option<CaseDetail>> {
        let mut tx = repo.pool.begin().await.map_err(map_sqlx_err)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        let case_row = sqlx::query("SELECT * FROM expediente WHERE id = $1")
            .bind(case_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        let Some(case_row) = case_row else {
            return Ok(None);
        };
        let case = CaseModel::try_from_row(&case_row).map_err(map_row_err)?;

        let evidence_rows = sqlx::query(
            "SELECT * FROM indicio WHERE case_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(case_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;
        let evidence: Vec<EvidenceModel> = evidence_rows
            .iter()
            .map(|r| EvidenceModel::try_from_row(r))
            .collect::<Result<_, _>>()
            .map_err(map_row_err)?;

        let history_rows = sqlx::query(
            "SELECT * FROM case_transition WHERE case_id = $1 ORDER BY recorded_at ASC, id ASC",
        )
        .bind(case_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;
        let history: Vec<CaseTransitionModel> = history_rows
            .iter()
            .map(|r| CaseTransitionModel::try_from_row(r))
            .collect::<Result<_, _>>()
            .map_err(map_row_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(Some(CaseDetail {
            case,
            evidence,
            history,
        }))
    }

    pub(super) async fn list_cases_impl(
        repo: &PgWorkflowStore,
        filter: &CaseFilter,
    ) -> WorkflowResult<Vec<CaseModel>> {
        // Absent filters bind as NULL and collapse to TRUE; `strpos` keeps
        // the code match a plain substring test.
        let rows = sqlx::query(
            r#"
            SELECT * FROM expediente
            WHERE ($1::SMALLINT IS NULL OR state = $1)
              AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR created_at <= $3)
              AND ($4::VARCHAR IS NULL OR strpos(code, $4) > 0)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(filter.state.map(|s| s.code()))
        .bind(filter.created_from)
        .bind(filter.created_to)
        .bind(filter.code_contains.as_deref())
        .fetch_all(&repo.pool)
        .await
        .map_err(map_sqlx_err)?;

        rows.iter()
            .map(|r| CaseModel::try_from_row(r).map_err(map_row_err))
            .collect()
    }

    pub(super) async fn count_by_state_impl(
        repo: &PgWorkflowStore,
    ) -> WorkflowResult<CaseStateCounts> {
        let rows = sqlx::query("SELECT state, COUNT(*) AS total FROM expediente GROUP BY state")
            .fetch_all(&repo.pool)
            .await
            .map_err(map_sqlx_err)?;

        let mut counts = CaseStateCounts::default();
        for row in rows {
            let code: i16 = row.try_get("state").map_err(map_sqlx_err)?;
            let total: i64 = row.try_get("total").map_err(map_sqlx_err)?;
            let state = state_from_code(code).map_err(map_row_err)?;
            counts.add(state, total as u64);
        }
        Ok(counts)
    }

    pub(super) async fn load_audit_trail_impl(
        repo: &PgWorkflowStore,
        entity_kind: AuditEntityKind,
        entity_id: Uuid,
    ) -> WorkflowResult<Vec<AuditEntryModel>> {
        // `seq` is assigned by the database at insert, so this is the
        // write order even when timestamps collide.
        let rows = sqlx::query(
            r#"
            SELECT * FROM audit_entry
            WHERE entity_kind = $1 AND entity_id = $2
            ORDER BY seq ASC
            "#,
        )
        .bind(entity_kind.to_string())
        .bind(entity_id)
        .fetch_all(&repo.pool)
        .await
        .map_err(map_sqlx_err)?;

        rows.iter()
            .map(|r| AuditEntryModel::try_from_row(r).map_err(map_row_err))
            .collect()
    }
}
