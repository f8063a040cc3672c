use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::InviteRow;
use crate::pagination::LimitOffset;

const INVITE_COLUMNS: &str = "id, tournament_id, team_id, from_user_id, to_user_id, \
     kind, status, expires_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CreateInviteData {
    pub tournament_id: Uuid,
    pub team_id: Option<Uuid>,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub kind: String,
    pub expires_in_days: i32,
}

pub async fn get_by_id(pool: &Db, id: Uuid) -> Result<Option<InviteRow>> {
    sqlx::query_as::<_, InviteRow>(&format!(
        "SELECT {INVITE_COLUMNS} FROM invites WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create<'a>(db: impl PgExecutor<'a>, data: CreateInviteData) -> Result<InviteRow> {
    sqlx::query_as::<_, InviteRow>(&format!(
        r#"
        INSERT INTO invites (tournament_id, team_id, from_user_id, to_user_id, kind, expires_at)
        VALUES ($1, $2, $3, $4, $5, NOW() + ($6 || ' days')::INTERVAL)
        RETURNING {INVITE_COLUMNS}
        "#
    ))
    .bind(data.tournament_id)
    .bind(data.team_id)
    .bind(data.from_user_id)
    .bind(data.to_user_id)
    .bind(data.kind)
    .bind(data.expires_in_days)
    .fetch_one(db)
    .await
}

/// A duplicate is a still-pending, unexpired invite to the same user for the
/// same thing.
pub async fn pending_duplicate_exists(
    pool: &Db,
    tournament_id: Uuid,
    to_user_id: Uuid,
    kind: &str,
    team_id: Option<Uuid>,
) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM invites
        WHERE tournament_id = $1 AND to_user_id = $2 AND kind = $3
          AND team_id IS NOT DISTINCT FROM $4
          AND status = 'pending' AND expires_at > NOW()
        "#,
    )
    .bind(tournament_id)
    .bind(to_user_id)
    .bind(kind)
    .bind(team_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

pub async fn list_pending_for_user(
    pool: &Db,
    to_user_id: Uuid,
    page: LimitOffset,
) -> Result<Vec<InviteRow>> {
    sqlx::query_as::<_, InviteRow>(&format!(
        r#"
        SELECT {INVITE_COLUMNS} FROM invites
        WHERE to_user_id = $1 AND status = 'pending' AND expires_at > NOW()
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(to_user_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await
}

pub async fn count_pending_for_user(pool: &Db, to_user_id: Uuid) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM invites
        WHERE to_user_id = $1 AND status = 'pending' AND expires_at > NOW()
        "#,
    )
    .bind(to_user_id)
    .fetch_one(pool)
    .await
}

pub async fn list_by_tournament(
    pool: &Db,
    tournament_id: Uuid,
    page: LimitOffset,
) -> Result<Vec<InviteRow>> {
    sqlx::query_as::<_, InviteRow>(&format!(
        r#"
        SELECT {INVITE_COLUMNS} FROM invites
        WHERE tournament_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(tournament_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await
}

pub async fn count_by_tournament(pool: &Db, tournament_id: Uuid) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invites WHERE tournament_id = $1")
        .bind(tournament_id)
        .fetch_one(pool)
        .await
}

/// Flip a pending invite into a terminal status. Returns None if the invite is
/// no longer pending (someone else got there first).
pub async fn resolve<'a>(
    db: impl PgExecutor<'a>,
    id: Uuid,
    status: &str,
) -> Result<Option<InviteRow>> {
    sqlx::query_as::<_, InviteRow>(&format!(
        r#"
        UPDATE invites
        SET status = $2, updated_at = NOW()
        WHERE id = $1 AND status = 'pending'
        RETURNING {INVITE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(db)
    .await
}

/// Pending invites expiring within the window, for the reminder service.
pub async fn expiring_soon(pool: &Db, within_hours: i32) -> Result<Vec<InviteRow>> {
    sqlx::query_as::<_, InviteRow>(&format!(
        r#"
        SELECT {INVITE_COLUMNS} FROM invites
        WHERE status = 'pending'
          AND expires_at > NOW()
          AND expires_at <= NOW() + ($1 || ' hours')::INTERVAL
        ORDER BY expires_at ASC
        "#
    ))
    .bind(within_hours)
    .fetch_all(pool)
    .await
}
