use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::RoundRow;

const ROUND_COLUMNS: &str = "id, stage_id, label, order_idx, target_star_rating, \
     mappool_published, schedules_published, starts_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CreateRoundData {
    pub stage_id: Uuid,
    pub label: String,
    pub target_star_rating: Option<f64>,
    pub starts_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct UpdateRoundData {
    pub label: String,
    pub target_star_rating: Option<f64>,
    pub mappool_published: bool,
    pub schedules_published: bool,
    pub starts_at: Option<DateTime<Utc>>,
}

pub async fn get_by_id(pool: &Db, id: Uuid) -> Result<Option<RoundRow>> {
    sqlx::query_as::<_, RoundRow>(&format!("SELECT {ROUND_COLUMNS} FROM rounds WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_stage(pool: &Db, stage_id: Uuid) -> Result<Vec<RoundRow>> {
    sqlx::query_as::<_, RoundRow>(&format!(
        "SELECT {ROUND_COLUMNS} FROM rounds WHERE stage_id = $1 ORDER BY order_idx ASC"
    ))
    .bind(stage_id)
    .fetch_all(pool)
    .await
}

/// The round's tournament, resolved through its stage. Used by guards.
pub async fn tournament_id_of(pool: &Db, round_id: Uuid) -> Result<Option<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT s.tournament_id
        FROM rounds r
        JOIN stages s ON s.id = r.stage_id
        WHERE r.id = $1
        "#,
    )
    .bind(round_id)
    .fetch_optional(pool)
    .await
}

pub async fn create<'a>(db: impl PgExecutor<'a>, data: CreateRoundData) -> Result<RoundRow> {
    sqlx::query_as::<_, RoundRow>(&format!(
        r#"
        INSERT INTO rounds (stage_id, label, order_idx, target_star_rating, starts_at)
        VALUES ($1, $2,
                (SELECT COALESCE(MAX(order_idx) + 1, 0) FROM rounds WHERE stage_id = $1),
                $3, $4)
        RETURNING {ROUND_COLUMNS}
        "#
    ))
    .bind(data.stage_id)
    .bind(data.label)
    .bind(data.target_star_rating)
    .bind(data.starts_at)
    .fetch_one(db)
    .await
}

pub async fn update(pool: &Db, id: Uuid, data: UpdateRoundData) -> Result<Option<RoundRow>> {
    sqlx::query_as::<_, RoundRow>(&format!(
        r#"
        UPDATE rounds
        SET label = $2, target_star_rating = $3, mappool_published = $4,
            schedules_published = $5, starts_at = $6, updated_at = NOW()
        WHERE id = $1
        RETURNING {ROUND_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(data.label)
    .bind(data.target_star_rating)
    .bind(data.mappool_published)
    .bind(data.schedules_published)
    .bind(data.starts_at)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &Db, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM rounds WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
