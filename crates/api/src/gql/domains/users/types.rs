use async_graphql::{SimpleObject, ID};
use chrono::{DateTime, Utc};

#[derive(SimpleObject, Clone)]
pub struct User {
    pub id: ID,
    pub osu_user_id: i32,
    pub osu_username: String,
    pub discord_username: Option<String>,
    pub country_code: String,
    pub global_rank: Option<i32>,
    pub badge_count: i32,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<infra::models::UserRow> for User {
    fn from(row: infra::models::UserRow) -> Self {
        Self {
            id: row.id.into(),
            osu_user_id: row.osu_user_id,
            osu_username: row.osu_username,
            discord_username: row.discord_username,
            country_code: row.country_code,
            global_rank: row.global_rank,
            badge_count: row.badge_count,
            is_admin: row.is_admin,
            created_at: row.created_at,
        }
    }
}
