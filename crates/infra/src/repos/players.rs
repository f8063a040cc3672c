use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::PlayerRow;
use crate::pagination::LimitOffset;

const PLAYER_COLUMNS: &str = "id, tournament_id, user_id, team_id, bws_rank, created_at";

#[derive(Debug, Clone)]
pub struct CreatePlayerData {
    pub tournament_id: Uuid,
    pub user_id: Uuid,
    pub team_id: Option<Uuid>,
    pub bws_rank: Option<i32>,
}

pub async fn get_by_id(pool: &Db, id: Uuid) -> Result<Option<PlayerRow>> {
    sqlx::query_as::<_, PlayerRow>(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_by_tournament_and_user(
    pool: &Db,
    tournament_id: Uuid,
    user_id: Uuid,
) -> Result<Option<PlayerRow>> {
    sqlx::query_as::<_, PlayerRow>(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE tournament_id = $1 AND user_id = $2"
    ))
    .bind(tournament_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_by_tournament(
    pool: &Db,
    tournament_id: Uuid,
    page: LimitOffset,
) -> Result<Vec<PlayerRow>> {
    sqlx::query_as::<_, PlayerRow>(&format!(
        r#"
        SELECT {PLAYER_COLUMNS} FROM players
        WHERE tournament_id = $1
        ORDER BY created_at ASC
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
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM players WHERE tournament_id = $1")
        .bind(tournament_id)
        .fetch_one(pool)
        .await
}

pub async fn list_by_team(pool: &Db, team_id: Uuid) -> Result<Vec<PlayerRow>> {
    sqlx::query_as::<_, PlayerRow>(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE team_id = $1 ORDER BY created_at ASC"
    ))
    .bind(team_id)
    .fetch_all(pool)
    .await
}

pub async fn count_by_team<'a>(db: impl PgExecutor<'a>, team_id: Uuid) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM players WHERE team_id = $1")
        .bind(team_id)
        .fetch_one(db)
        .await
}

pub async fn create<'a>(db: impl PgExecutor<'a>, data: CreatePlayerData) -> Result<PlayerRow> {
    sqlx::query_as::<_, PlayerRow>(&format!(
        r#"
        INSERT INTO players (tournament_id, user_id, team_id, bws_rank)
        VALUES ($1, $2, $3, $4)
        RETURNING {PLAYER_COLUMNS}
        "#
    ))
    .bind(data.tournament_id)
    .bind(data.user_id)
    .bind(data.team_id)
    .bind(data.bws_rank)
    .fetch_one(db)
    .await
}

pub async fn set_team<'a>(
    db: impl PgExecutor<'a>,
    id: Uuid,
    team_id: Option<Uuid>,
) -> Result<Option<PlayerRow>> {
    sqlx::query_as::<_, PlayerRow>(&format!(
        "UPDATE players SET team_id = $2 WHERE id = $1 RETURNING {PLAYER_COLUMNS}"
    ))
    .bind(id)
    .bind(team_id)
    .fetch_optional(db)
    .await
}

pub async fn delete(pool: &Db, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM players WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn user_ids_by_tournament(pool: &Db, tournament_id: Uuid) -> Result<Vec<Uuid>> {
    sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM players WHERE tournament_id = $1")
        .bind(tournament_id)
        .fetch_all(pool)
        .await
}
