use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::SessionRow;

const SESSION_COLUMNS: &str =
    "id, user_id, token_hash, ip_address, user_agent, expires_at, last_used_at, created_at";

#[derive(Debug, Clone)]
pub struct CreateSession {
    pub user_id: Uuid,
    pub token_hash: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub expires_at: DateTime<Utc>,
}

pub async fn create(pool: &Db, data: CreateSession) -> Result<SessionRow> {
    sqlx::query_as::<_, SessionRow>(&format!(
        r#"
        INSERT INTO sessions (user_id, token_hash, ip_address, user_agent, expires_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {SESSION_COLUMNS}
        "#
    ))
    .bind(data.user_id)
    .bind(data.token_hash)
    .bind(data.ip_address)
    .bind(data.user_agent)
    .bind(data.expires_at)
    .fetch_one(pool)
    .await
}

/// Look up a live session by token hash and bump `last_used_at` in one trip.
pub async fn get_active(pool: &Db, token_hash: &str) -> Result<Option<SessionRow>> {
    sqlx::query_as::<_, SessionRow>(&format!(
        r#"
        UPDATE sessions
        SET last_used_at = NOW()
        WHERE token_hash = $1 AND expires_at > NOW()
        RETURNING {SESSION_COLUMNS}
        "#
    ))
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}

/// Replace the token on refresh so a leaked old token stops working.
pub async fn rotate(
    pool: &Db,
    id: Uuid,
    new_token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<Option<SessionRow>> {
    sqlx::query_as::<_, SessionRow>(&format!(
        r#"
        UPDATE sessions
        SET token_hash = $2, expires_at = $3, last_used_at = NOW()
        WHERE id = $1
        RETURNING {SESSION_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(new_token_hash)
    .bind(expires_at)
    .fetch_optional(pool)
    .await
}

pub async fn delete_by_token_hash(pool: &Db, token_hash: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
        .bind(token_hash)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn delete_by_user<'a>(db: impl PgExecutor<'a>, user_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}
