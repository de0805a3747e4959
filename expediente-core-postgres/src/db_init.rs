//! Database schema initialization.

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;

/// Embedded migrations from `./migrations`, applied in filename order.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Bring the schema up to date. Safe to call on every startup; already
/// applied migrations are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}
