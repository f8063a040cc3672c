use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::TeamRow;

const TEAM_COLUMNS: &str =
    "id, tournament_id, name, captain_user_id, deleted_at, created_at, updated_at";

pub async fn get_by_id(pool: &Db, id: Uuid) -> Result<Option<TeamRow>> {
    sqlx::query_as::<_, TeamRow>(&format!(
        "SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1 AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_by_ids(pool: &Db, ids: &[Uuid]) -> Result<Vec<TeamRow>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, TeamRow>(&format!(
        "SELECT {TEAM_COLUMNS} FROM teams WHERE id = ANY($1::uuid[])"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
}

pub async fn get_by_name(pool: &Db, tournament_id: Uuid, name: &str) -> Result<Option<TeamRow>> {
    sqlx::query_as::<_, TeamRow>(&format!(
        "SELECT {TEAM_COLUMNS} FROM teams WHERE tournament_id = $1 AND LOWER(name) = LOWER($2) AND deleted_at IS NULL"
    ))
    .bind(tournament_id)
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn list_by_tournament(pool: &Db, tournament_id: Uuid) -> Result<Vec<TeamRow>> {
    sqlx::query_as::<_, TeamRow>(&format!(
        "SELECT {TEAM_COLUMNS} FROM teams WHERE tournament_id = $1 AND deleted_at IS NULL ORDER BY created_at ASC"
    ))
    .bind(tournament_id)
    .fetch_all(pool)
    .await
}

pub async fn create<'a>(
    db: impl PgExecutor<'a>,
    tournament_id: Uuid,
    name: &str,
    captain_user_id: Uuid,
) -> Result<TeamRow> {
    sqlx::query_as::<_, TeamRow>(&format!(
        r#"
        INSERT INTO teams (tournament_id, name, captain_user_id)
        VALUES ($1, $2, $3)
        RETURNING {TEAM_COLUMNS}
        "#
    ))
    .bind(tournament_id)
    .bind(name)
    .bind(captain_user_id)
    .fetch_one(db)
    .await
}

pub async fn set_captain<'a>(
    db: impl PgExecutor<'a>,
    id: Uuid,
    captain_user_id: Uuid,
) -> Result<Option<TeamRow>> {
    sqlx::query_as::<_, TeamRow>(&format!(
        r#"
        UPDATE teams
        SET captain_user_id = $2, updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {TEAM_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(captain_user_id)
    .fetch_optional(db)
    .await
}

pub async fn soft_delete<'a>(db: impl PgExecutor<'a>, id: Uuid) -> Result<Option<TeamRow>> {
    sqlx::query_as::<_, TeamRow>(&format!(
        r#"
        UPDATE teams
        SET deleted_at = NOW(), updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {TEAM_COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}
