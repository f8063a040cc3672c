use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::BanRow;
use crate::pagination::LimitOffset;

const BAN_COLUMNS: &str =
    "id, user_id, issued_by_user_id, reason, banned_until, revoked_at, created_at";

#[derive(Debug, Clone)]
pub struct CreateBanData {
    pub user_id: Uuid,
    pub issued_by_user_id: Uuid,
    pub reason: String,
    pub banned_until: Option<DateTime<Utc>>,
}

pub async fn create<'a>(db: impl PgExecutor<'a>, data: CreateBanData) -> Result<BanRow> {
    sqlx::query_as::<_, BanRow>(&format!(
        r#"
        INSERT INTO bans (user_id, issued_by_user_id, reason, banned_until)
        VALUES ($1, $2, $3, $4)
        RETURNING {BAN_COLUMNS}
        "#
    ))
    .bind(data.user_id)
    .bind(data.issued_by_user_id)
    .bind(data.reason)
    .bind(data.banned_until)
    .fetch_one(db)
    .await
}

pub async fn revoke(pool: &Db, id: Uuid) -> Result<Option<BanRow>> {
    sqlx::query_as::<_, BanRow>(&format!(
        r#"
        UPDATE bans
        SET revoked_at = NOW()
        WHERE id = $1 AND revoked_at IS NULL
        RETURNING {BAN_COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_active_for_user(pool: &Db, user_id: Uuid) -> Result<Option<BanRow>> {
    sqlx::query_as::<_, BanRow>(&format!(
        r#"
        SELECT {BAN_COLUMNS} FROM bans
        WHERE user_id = $1
          AND revoked_at IS NULL
          AND (banned_until IS NULL OR banned_until > NOW())
        ORDER BY created_at DESC
        LIMIT 1
        "#
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_for_user(pool: &Db, user_id: Uuid) -> Result<Vec<BanRow>> {
    sqlx::query_as::<_, BanRow>(&format!(
        "SELECT {BAN_COLUMNS} FROM bans WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn list(pool: &Db, page: LimitOffset) -> Result<Vec<BanRow>> {
    sqlx::query_as::<_, BanRow>(&format!(
        "SELECT {BAN_COLUMNS} FROM bans ORDER BY created_at DESC LIMIT $1 OFFSET $2"
    ))
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &Db) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bans")
        .fetch_one(pool)
        .await
}
