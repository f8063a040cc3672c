use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRow {
    pub id: Uuid,
    pub osu_user_id: i32,
    pub osu_username: String,
    pub discord_user_id: Option<String>,
    pub discord_username: Option<String>,
    pub country_code: String,
    pub global_rank: Option<i32>,
    pub badge_count: i32,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TournamentRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub acronym: String,
    pub kind: String,
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
    // JSONB lists validated by the checks layer before writes
    pub links: serde_json::Value,
    pub other_dates: serde_json::Value,
    pub mod_multipliers: serde_json::Value,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TournamentRow {
    pub fn is_published(&self) -> bool {
        self.published_at.is_some_and(|at| at <= Utc::now())
    }

    /// Player registrations are open when the window contains now.
    pub fn player_regs_open(&self) -> bool {
        let now = Utc::now();
        let opened = self.player_regs_open_at.is_some_and(|at| at <= now);
        let closed = self.player_regs_close_at.is_some_and(|at| at <= now);
        opened && !closed
    }

    pub fn staff_regs_open(&self) -> bool {
        let now = Utc::now();
        let opened = self.staff_regs_open_at.is_some_and(|at| at <= now);
        let closed = self.staff_regs_close_at.is_some_and(|at| at <= now);
        opened && !closed
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StageRow {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub label: String,
    pub format: String,
    pub order_idx: i32,
    pub is_main: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RoundRow {
    pub id: Uuid,
    pub stage_id: Uuid,
    pub label: String,
    pub order_idx: i32,
    pub target_star_rating: Option<f64>,
    pub mappool_published: bool,
    pub schedules_published: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ModpoolRow {
    pub id: Uuid,
    pub round_id: Uuid,
    pub category: String,
    pub map_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StaffRoleRow {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub name: String,
    pub color: String,
    pub order_idx: i32,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StaffMemberRow {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TeamRow {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub name: String,
    pub captain_user_id: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PlayerRow {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub user_id: Uuid,
    pub team_id: Option<Uuid>,
    pub bws_rank: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct InviteRow {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub team_id: Option<Uuid>,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub kind: String,
    pub status: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InviteRow {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub issued_by_user_id: Option<Uuid>,
    pub reason: String,
    pub banned_until: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl BanRow {
    /// Active = not revoked and either permanent or still within its window.
    pub fn is_active(&self) -> bool {
        if self.revoked_at.is_some() {
            return false;
        }
        match self.banned_until {
            None => true,
            Some(until) => until > Utc::now(),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct NotificationRow {
    pub id: Uuid,
    pub tournament_id: Option<Uuid>,
    pub message: String,
    pub vars: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserNotificationRow {
    pub notification_id: Uuid,
    pub user_id: Uuid,
    pub read_at: Option<DateTime<Utc>>,
}

/// Join of `user_notifications` with its parent notification, as listed
/// for a single user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserNotificationFullRow {
    pub notification_id: Uuid,
    pub user_id: Uuid,
    pub read_at: Option<DateTime<Utc>>,
    pub tournament_id: Option<Uuid>,
    pub message: String,
    pub vars: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FormRow {
    pub id: Uuid,
    pub tournament_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub fields: serde_json::Value,
    pub anonymous_responses: bool,
    pub closes_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormRow {
    pub fn is_closed(&self) -> bool {
        self.deleted_at.is_some() || self.closes_at.is_some_and(|at| at <= Utc::now())
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FormResponseRow {
    pub id: Uuid,
    pub form_id: Uuid,
    pub user_id: Option<Uuid>,
    pub answers: serde_json::Value,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ban(until: Option<DateTime<Utc>>, revoked: Option<DateTime<Utc>>) -> BanRow {
        BanRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            issued_by_user_id: None,
            reason: "multi-accounting".into(),
            banned_until: until,
            revoked_at: revoked,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn permanent_ban_is_active() {
        assert!(ban(None, None).is_active());
    }

    #[test]
    fn revoked_ban_is_inactive() {
        assert!(!ban(None, Some(Utc::now())).is_active());
    }

    #[test]
    fn elapsed_ban_is_inactive() {
        assert!(!ban(Some(Utc::now() - Duration::days(1)), None).is_active());
        assert!(ban(Some(Utc::now() + Duration::days(1)), None).is_active());
    }

    #[test]
    fn registration_window_requires_open_and_not_closed() {
        let mut t = TournamentRow {
            id: Uuid::new_v4(),
            name: "Test Cup".into(),
            slug: "test-cup".into(),
            acronym: "TC".into(),
            kind: "solo".into(),
            description: None,
            rules: None,
            rank_range_lower: None,
            rank_range_upper: None,
            team_size_min: None,
            team_size_max: None,
            use_bws: false,
            published_at: Some(Utc::now() - Duration::days(7)),
            staff_regs_open_at: None,
            staff_regs_close_at: None,
            player_regs_open_at: Some(Utc::now() - Duration::days(1)),
            player_regs_close_at: Some(Utc::now() + Duration::days(1)),
            concludes_at: None,
            links: serde_json::json!([]),
            other_dates: serde_json::json!([]),
            mod_multipliers: serde_json::json!([]),
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(t.player_regs_open());

        t.player_regs_close_at = Some(Utc::now() - Duration::hours(1));
        assert!(!t.player_regs_open());

        t.player_regs_open_at = None;
        t.player_regs_close_at = None;
        assert!(!t.player_regs_open());
    }
}
