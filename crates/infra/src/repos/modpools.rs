use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::ModpoolRow;

const MODPOOL_COLUMNS: &str = "id, round_id, category, map_count, created_at";

pub async fn list_by_round(pool: &Db, round_id: Uuid) -> Result<Vec<ModpoolRow>> {
    sqlx::query_as::<_, ModpoolRow>(&format!(
        "SELECT {MODPOOL_COLUMNS} FROM modpools WHERE round_id = $1 ORDER BY created_at ASC"
    ))
    .bind(round_id)
    .fetch_all(pool)
    .await
}

/// The full modpool list for a round is replaced atomically; both calls run in
/// the caller's transaction.
pub async fn delete_by_round<'a>(db: impl PgExecutor<'a>, round_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM modpools WHERE round_id = $1")
        .bind(round_id)
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}

pub async fn insert<'a>(
    db: impl PgExecutor<'a>,
    round_id: Uuid,
    category: &str,
    map_count: i32,
) -> Result<ModpoolRow> {
    sqlx::query_as::<_, ModpoolRow>(&format!(
        r#"
        INSERT INTO modpools (round_id, category, map_count)
        VALUES ($1, $2, $3)
        RETURNING {MODPOOL_COLUMNS}
        "#
    ))
    .bind(round_id)
    .bind(category)
    .bind(map_count)
    .fetch_one(db)
    .await
}
