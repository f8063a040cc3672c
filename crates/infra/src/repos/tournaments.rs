use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::TournamentRow;
use crate::pagination::LimitOffset;

const TOURNAMENT_COLUMNS: &str = "id, name, slug, acronym, kind, description, rules, \
     rank_range_lower, rank_range_upper, team_size_min, team_size_max, use_bws, \
     published_at, staff_regs_open_at, staff_regs_close_at, player_regs_open_at, \
     player_regs_close_at, concludes_at, links, other_dates, mod_multipliers, \
     deleted_at, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct TournamentFilter {
    pub search: Option<String>,
    /// When false only published tournaments are listed.
    pub include_unpublished: bool,
}

#[derive(Debug, Clone)]
pub struct CreateTournamentData {
    pub name: String,
    pub slug: String,
    pub acronym: String,
    pub kind: String,
    pub description: Option<String>,
    pub rank_range_lower: Option<i32>,
    pub rank_range_upper: Option<i32>,
    pub team_size_min: Option<i32>,
    pub team_size_max: Option<i32>,
    pub use_bws: bool,
}

/// Full post-merge field set. Resolvers merge the partial input into the
/// current row, run the checks battery, then write everything back.
#[derive(Debug, Clone)]
pub struct UpdateTournamentData {
    pub name: String,
    pub acronym: String,
    pub description: Option<String>,
    pub rules: Option<String>,
    pub rank_range_lower: Option<i32>,
    pub rank_range_upper: Option<i32>,
    pub team_size_min: Option<i32>,
    pub team_size_max: Option<i32>,
    pub use_bws: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub staff_regs_open_at: Option<DateTime<Utc>>,
    pub staff_regs_close_at: Option<DateTime<Utc>>,
    pub player_regs_open_at: Option<DateTime<Utc>>,
    pub player_regs_close_at: Option<DateTime<Utc>>,
    pub concludes_at: Option<DateTime<Utc>>,
    pub links: serde_json::Value,
    pub other_dates: serde_json::Value,
    pub mod_multipliers: serde_json::Value,
}

pub async fn get_by_id(pool: &Db, id: Uuid) -> Result<Option<TournamentRow>> {
    sqlx::query_as::<_, TournamentRow>(&format!(
        "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1 AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_by_slug(pool: &Db, slug: &str) -> Result<Option<TournamentRow>> {
    sqlx::query_as::<_, TournamentRow>(&format!(
        "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE slug = $1 AND deleted_at IS NULL"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub async fn get_by_ids(pool: &Db, ids: &[Uuid]) -> Result<Vec<TournamentRow>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, TournamentRow>(&format!(
        "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = ANY($1::uuid[])"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
}

pub async fn list(
    pool: &Db,
    filter: TournamentFilter,
    page: LimitOffset,
) -> Result<Vec<TournamentRow>> {
    let mut query = sqlx::QueryBuilder::new(format!(
        "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE deleted_at IS NULL"
    ));

    if !filter.include_unpublished {
        query.push(" AND published_at IS NOT NULL AND published_at <= NOW()");
    }

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search.to_lowercase());
        query.push(" AND (LOWER(name) LIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR LOWER(acronym) LIKE ");
        query.push_bind(pattern);
        query.push(")");
    }

    query.push(" ORDER BY created_at DESC");
    query.push(" LIMIT ");
    query.push_bind(page.limit);
    query.push(" OFFSET ");
    query.push_bind(page.offset);

    query.build_query_as::<TournamentRow>().fetch_all(pool).await
}

pub async fn count(pool: &Db, filter: TournamentFilter) -> Result<i64> {
    let mut query =
        sqlx::QueryBuilder::new("SELECT COUNT(*) FROM tournaments WHERE deleted_at IS NULL");

    if !filter.include_unpublished {
        query.push(" AND published_at IS NOT NULL AND published_at <= NOW()");
    }

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search.to_lowercase());
        query.push(" AND (LOWER(name) LIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR LOWER(acronym) LIKE ");
        query.push_bind(pattern);
        query.push(")");
    }

    query.build_query_scalar::<i64>().fetch_one(pool).await
}

pub async fn create<'a>(
    db: impl PgExecutor<'a>,
    data: CreateTournamentData,
) -> Result<TournamentRow> {
    sqlx::query_as::<_, TournamentRow>(&format!(
        r#"
        INSERT INTO tournaments (name, slug, acronym, kind, description,
                                 rank_range_lower, rank_range_upper,
                                 team_size_min, team_size_max, use_bws)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {TOURNAMENT_COLUMNS}
        "#
    ))
    .bind(data.name)
    .bind(data.slug)
    .bind(data.acronym)
    .bind(data.kind)
    .bind(data.description)
    .bind(data.rank_range_lower)
    .bind(data.rank_range_upper)
    .bind(data.team_size_min)
    .bind(data.team_size_max)
    .bind(data.use_bws)
    .fetch_one(db)
    .await
}

pub async fn update(
    pool: &Db,
    id: Uuid,
    data: UpdateTournamentData,
) -> Result<Option<TournamentRow>> {
    sqlx::query_as::<_, TournamentRow>(&format!(
        r#"
        UPDATE tournaments
        SET name = $2, acronym = $3, description = $4, rules = $5,
            rank_range_lower = $6, rank_range_upper = $7,
            team_size_min = $8, team_size_max = $9, use_bws = $10,
            published_at = $11, staff_regs_open_at = $12, staff_regs_close_at = $13,
            player_regs_open_at = $14, player_regs_close_at = $15, concludes_at = $16,
            links = $17, other_dates = $18, mod_multipliers = $19,
            updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {TOURNAMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(data.name)
    .bind(data.acronym)
    .bind(data.description)
    .bind(data.rules)
    .bind(data.rank_range_lower)
    .bind(data.rank_range_upper)
    .bind(data.team_size_min)
    .bind(data.team_size_max)
    .bind(data.use_bws)
    .bind(data.published_at)
    .bind(data.staff_regs_open_at)
    .bind(data.staff_regs_close_at)
    .bind(data.player_regs_open_at)
    .bind(data.player_regs_close_at)
    .bind(data.concludes_at)
    .bind(data.links)
    .bind(data.other_dates)
    .bind(data.mod_multipliers)
    .fetch_optional(pool)
    .await
}

pub async fn soft_delete(pool: &Db, id: Uuid) -> Result<Option<TournamentRow>> {
    sqlx::query_as::<_, TournamentRow>(&format!(
        r#"
        UPDATE tournaments
        SET deleted_at = NOW(), updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {TOURNAMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Lock the tournament row for the duration of a registration transaction.
pub async fn get_for_update<'a>(
    db: impl PgExecutor<'a>,
    id: Uuid,
) -> Result<Option<TournamentRow>> {
    sqlx::query_as::<_, TournamentRow>(&format!(
        "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}
