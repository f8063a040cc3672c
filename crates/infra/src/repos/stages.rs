use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::StageRow;

const STAGE_COLUMNS: &str =
    "id, tournament_id, label, format, order_idx, is_main, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CreateStageData {
    pub tournament_id: Uuid,
    pub label: String,
    pub format: String,
    pub is_main: bool,
}

#[derive(Debug, Clone)]
pub struct UpdateStageData {
    pub label: String,
    pub format: String,
}

pub async fn get_by_id(pool: &Db, id: Uuid) -> Result<Option<StageRow>> {
    sqlx::query_as::<_, StageRow>(&format!("SELECT {STAGE_COLUMNS} FROM stages WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_tournament(pool: &Db, tournament_id: Uuid) -> Result<Vec<StageRow>> {
    sqlx::query_as::<_, StageRow>(&format!(
        "SELECT {STAGE_COLUMNS} FROM stages WHERE tournament_id = $1 ORDER BY order_idx ASC"
    ))
    .bind(tournament_id)
    .fetch_all(pool)
    .await
}

/// Appends the stage at the end of the tournament's stage order.
pub async fn create<'a>(db: impl PgExecutor<'a>, data: CreateStageData) -> Result<StageRow> {
    sqlx::query_as::<_, StageRow>(&format!(
        r#"
        INSERT INTO stages (tournament_id, label, format, order_idx, is_main)
        VALUES ($1, $2, $3,
                (SELECT COALESCE(MAX(order_idx) + 1, 0) FROM stages WHERE tournament_id = $1),
                $4)
        RETURNING {STAGE_COLUMNS}
        "#
    ))
    .bind(data.tournament_id)
    .bind(data.label)
    .bind(data.format)
    .bind(data.is_main)
    .fetch_one(db)
    .await
}

pub async fn update(pool: &Db, id: Uuid, data: UpdateStageData) -> Result<Option<StageRow>> {
    sqlx::query_as::<_, StageRow>(&format!(
        r#"
        UPDATE stages
        SET label = $2, format = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING {STAGE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(data.label)
    .bind(data.format)
    .fetch_optional(pool)
    .await
}

/// Only one stage per tournament may be the main stage; both writes run in the
/// caller's transaction.
pub async fn clear_main<'a>(db: impl PgExecutor<'a>, tournament_id: Uuid) -> Result<u64> {
    let result = sqlx::query("UPDATE stages SET is_main = FALSE, updated_at = NOW() WHERE tournament_id = $1")
        .bind(tournament_id)
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}

pub async fn set_main<'a>(db: impl PgExecutor<'a>, id: Uuid) -> Result<Option<StageRow>> {
    sqlx::query_as::<_, StageRow>(&format!(
        "UPDATE stages SET is_main = TRUE, updated_at = NOW() WHERE id = $1 RETURNING {STAGE_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn set_order<'a>(db: impl PgExecutor<'a>, id: Uuid, order_idx: i32) -> Result<u64> {
    let result = sqlx::query("UPDATE stages SET order_idx = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(order_idx)
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}

pub async fn delete(pool: &Db, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM stages WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
