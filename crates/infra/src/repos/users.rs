use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::UserRow;
use crate::pagination::LimitOffset;

const USER_COLUMNS: &str = "id, osu_user_id, osu_username, discord_user_id, discord_username, \
     country_code, global_rank, badge_count, is_admin, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
}

/// Identity payload fetched from the osu! API at login time.
#[derive(Debug, Clone)]
pub struct OsuIdentity {
    pub osu_user_id: i32,
    pub osu_username: String,
    pub country_code: String,
    pub global_rank: Option<i32>,
    pub badge_count: i32,
}

pub async fn get_by_id(pool: &Db, id: Uuid) -> Result<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_by_ids(pool: &Db, ids: &[Uuid]) -> Result<Vec<UserRow>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1::uuid[])"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
}

/// Insert on first login, refresh the osu!-sourced fields on every later one.
pub async fn upsert_osu(pool: &Db, identity: OsuIdentity) -> Result<UserRow> {
    sqlx::query_as::<_, UserRow>(&format!(
        r#"
        INSERT INTO users (osu_user_id, osu_username, country_code, global_rank, badge_count)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (osu_user_id) DO UPDATE
        SET osu_username = EXCLUDED.osu_username,
            country_code = EXCLUDED.country_code,
            global_rank = EXCLUDED.global_rank,
            badge_count = EXCLUDED.badge_count,
            updated_at = NOW()
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(identity.osu_user_id)
    .bind(identity.osu_username)
    .bind(identity.country_code)
    .bind(identity.global_rank)
    .bind(identity.badge_count)
    .fetch_one(pool)
    .await
}

pub async fn link_discord(
    pool: &Db,
    id: Uuid,
    discord_user_id: &str,
    discord_username: &str,
) -> Result<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>(&format!(
        r#"
        UPDATE users
        SET discord_user_id = $2, discord_username = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(discord_user_id)
    .bind(discord_username)
    .fetch_optional(pool)
    .await
}

pub async fn unlink_discord(pool: &Db, id: Uuid) -> Result<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>(&format!(
        r#"
        UPDATE users
        SET discord_user_id = NULL, discord_username = NULL, updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn set_admin<'a>(db: impl PgExecutor<'a>, id: Uuid, is_admin: bool) -> Result<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>(&format!(
        "UPDATE users SET is_admin = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(is_admin)
    .fetch_optional(db)
    .await
}

pub async fn list(pool: &Db, filter: UserFilter, page: LimitOffset) -> Result<Vec<UserRow>> {
    let mut query = sqlx::QueryBuilder::new(format!(
        "SELECT {USER_COLUMNS} FROM users WHERE 1=1"
    ));

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search.to_lowercase());
        query.push(" AND (LOWER(osu_username) LIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR LOWER(discord_username) LIKE ");
        query.push_bind(pattern);
        query.push(")");
    }

    query.push(" ORDER BY osu_username ASC");
    query.push(" LIMIT ");
    query.push_bind(page.limit);
    query.push(" OFFSET ");
    query.push_bind(page.offset);

    query.build_query_as::<UserRow>().fetch_all(pool).await
}

pub async fn count(pool: &Db, filter: UserFilter) -> Result<i64> {
    let mut query = sqlx::QueryBuilder::new("SELECT COUNT(*) FROM users WHERE 1=1");

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search.to_lowercase());
        query.push(" AND (LOWER(osu_username) LIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR LOWER(discord_username) LIKE ");
        query.push_bind(pattern);
        query.push(")");
    }

    query.build_query_scalar::<i64>().fetch_one(pool).await
}
