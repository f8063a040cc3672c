use async_graphql::{ComplexObject, Context, Enum, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};

use crate::checks;
use crate::gql::common::helpers::parse_id;
use crate::gql::domains::stages::types::Stage;
use crate::gql::domains::staff::types::StaffRole;
use crate::gql::error::ResultExt;
use crate::state::AppState;
use infra::repos::{players, staff_roles, stages};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum TournamentKind {
    Solo,
    Teams,
    Draft,
}

impl TournamentKind {
    pub fn has_teams(self) -> bool {
        matches!(self, TournamentKind::Teams | TournamentKind::Draft)
    }
}

impl From<String> for TournamentKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "teams" => TournamentKind::Teams,
            "draft" => TournamentKind::Draft,
            _ => TournamentKind::Solo,
        }
    }
}

impl From<TournamentKind> for String {
    fn from(kind: TournamentKind) -> Self {
        match kind {
            TournamentKind::Solo => "solo".to_string(),
            TournamentKind::Teams => "teams".to_string(),
            TournamentKind::Draft => "draft".to_string(),
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum GameMod {
    Ez,
    Nf,
    Ht,
    Hd,
    Hr,
    Sd,
    Pf,
    Dt,
    Nc,
    Fl,
}

impl From<GameMod> for checks::GameMod {
    fn from(game_mod: GameMod) -> Self {
        match game_mod {
            GameMod::Ez => checks::GameMod::EZ,
            GameMod::Nf => checks::GameMod::NF,
            GameMod::Ht => checks::GameMod::HT,
            GameMod::Hd => checks::GameMod::HD,
            GameMod::Hr => checks::GameMod::HR,
            GameMod::Sd => checks::GameMod::SD,
            GameMod::Pf => checks::GameMod::PF,
            GameMod::Dt => checks::GameMod::DT,
            GameMod::Nc => checks::GameMod::NC,
            GameMod::Fl => checks::GameMod::FL,
        }
    }
}

impl From<checks::GameMod> for GameMod {
    fn from(game_mod: checks::GameMod) -> Self {
        match game_mod {
            checks::GameMod::EZ => GameMod::Ez,
            checks::GameMod::NF => GameMod::Nf,
            checks::GameMod::HT => GameMod::Ht,
            checks::GameMod::HD => GameMod::Hd,
            checks::GameMod::HR => GameMod::Hr,
            checks::GameMod::SD => GameMod::Sd,
            checks::GameMod::PF => GameMod::Pf,
            checks::GameMod::DT => GameMod::Dt,
            checks::GameMod::NC => GameMod::Nc,
            checks::GameMod::FL => GameMod::Fl,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct TournamentLink {
    pub label: String,
    pub url: String,
}

impl From<checks::TournamentLink> for TournamentLink {
    fn from(link: checks::TournamentLink) -> Self {
        Self {
            label: link.label,
            url: link.url,
        }
    }
}

#[derive(InputObject, Clone)]
pub struct TournamentLinkInput {
    pub label: String,
    pub url: String,
}

impl From<TournamentLinkInput> for checks::TournamentLink {
    fn from(input: TournamentLinkInput) -> Self {
        Self {
            label: input.label,
            url: input.url,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct DateWindow {
    pub label: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl From<checks::DateWindow> for DateWindow {
    fn from(window: checks::DateWindow) -> Self {
        Self {
            label: window.label,
            from: window.from,
            to: window.to,
        }
    }
}

#[derive(InputObject, Clone)]
pub struct DateWindowInput {
    pub label: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl From<DateWindowInput> for checks::DateWindow {
    fn from(input: DateWindowInput) -> Self {
        Self {
            label: input.label,
            from: input.from,
            to: input.to,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct ModMultiplier {
    pub mods: Vec<GameMod>,
    pub multiplier: f64,
}

impl From<checks::ModMultiplier> for ModMultiplier {
    fn from(rule: checks::ModMultiplier) -> Self {
        Self {
            mods: rule.mods.into_iter().map(GameMod::from).collect(),
            multiplier: rule.multiplier,
        }
    }
}

#[derive(InputObject, Clone)]
pub struct ModMultiplierInput {
    pub mods: Vec<GameMod>,
    pub multiplier: f64,
}

impl From<ModMultiplierInput> for checks::ModMultiplier {
    fn from(input: ModMultiplierInput) -> Self {
        Self {
            mods: input.mods.into_iter().map(checks::GameMod::from).collect(),
            multiplier: input.multiplier,
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Tournament {
    pub id: ID,
    pub name: String,
    pub slug: String,
    pub acronym: String,
    pub kind: TournamentKind,
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
    pub links: Vec<TournamentLink>,
    pub other_dates: Vec<DateWindow>,
    pub mod_multipliers: Vec<ModMultiplier>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<infra::models::TournamentRow> for Tournament {
    fn from(row: infra::models::TournamentRow) -> Self {
        // The JSONB lists were validated on write; a malformed value reads as empty.
        let links: Vec<checks::TournamentLink> =
            serde_json::from_value(row.links).unwrap_or_default();
        let other_dates: Vec<checks::DateWindow> =
            serde_json::from_value(row.other_dates).unwrap_or_default();
        let mod_multipliers: Vec<checks::ModMultiplier> =
            serde_json::from_value(row.mod_multipliers).unwrap_or_default();

        Self {
            id: row.id.into(),
            name: row.name,
            slug: row.slug,
            acronym: row.acronym,
            kind: row.kind.into(),
            description: row.description,
            rules: row.rules,
            rank_range_lower: row.rank_range_lower,
            rank_range_upper: row.rank_range_upper,
            team_size_min: row.team_size_min,
            team_size_max: row.team_size_max,
            use_bws: row.use_bws,
            published_at: row.published_at,
            staff_regs_open_at: row.staff_regs_open_at,
            staff_regs_close_at: row.staff_regs_close_at,
            player_regs_open_at: row.player_regs_open_at,
            player_regs_close_at: row.player_regs_close_at,
            concludes_at: row.concludes_at,
            links: links.into_iter().map(TournamentLink::from).collect(),
            other_dates: other_dates
                .into_iter()
                .map(<DateWindow as From<checks::DateWindow>>::from)
                .collect(),
            mod_multipliers: mod_multipliers
                .into_iter()
                .map(ModMultiplier::from)
                .collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[ComplexObject]
impl Tournament {
    async fn stages(&self, ctx: &Context<'_>) -> Result<Vec<Stage>> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&self.id, "tournament")?;

        let rows = stages::list_by_tournament(&state.db, tournament_id).await?;
        Ok(rows.into_iter().map(Stage::from).collect())
    }

    async fn staff_roles(&self, ctx: &Context<'_>) -> Result<Vec<StaffRole>> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&self.id, "tournament")?;

        let rows = staff_roles::list_by_tournament(&state.db, tournament_id).await?;
        Ok(rows.into_iter().map(StaffRole::from).collect())
    }

    async fn player_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&self.id, "tournament")?;

        players::count_by_tournament(&state.db, tournament_id)
            .await
            .db_err("Database operation failed")
    }
}

// Tournament input types

#[derive(InputObject)]
pub struct CreateTournamentInput {
    pub name: String,
    pub slug: String,
    pub acronym: String,
    pub kind: TournamentKind,
    pub description: Option<String>,
    pub rank_range_lower: Option<i32>,
    pub rank_range_upper: Option<i32>,
    pub team_size_min: Option<i32>,
    pub team_size_max: Option<i32>,
    #[graphql(default = false)]
    pub use_bws: bool,
}

/// Partial update; absent fields keep their current values. The milestone
/// dates travel as one block so a date can also be cleared.
#[derive(InputObject)]
pub struct UpdateTournamentInput {
    pub id: ID,
    pub name: Option<String>,
    pub acronym: Option<String>,
    pub description: Option<String>,
    pub rules: Option<String>,
    pub rank_range: Option<RankRangeInput>,
    pub team_size: Option<TeamSizeInput>,
    pub use_bws: Option<bool>,
    pub dates: Option<TournamentDatesInput>,
    pub links: Option<Vec<TournamentLinkInput>>,
    pub other_dates: Option<Vec<DateWindowInput>>,
    pub mod_multipliers: Option<Vec<ModMultiplierInput>>,
}

/// `Some(input)` with both bounds absent clears the range (open rank).
#[derive(InputObject)]
pub struct RankRangeInput {
    pub lower: Option<i32>,
    pub upper: Option<i32>,
}

#[derive(InputObject)]
pub struct TeamSizeInput {
    pub min: i32,
    pub max: i32,
}

/// Replaces the full milestone set; absent fields clear the milestone.
#[derive(InputObject)]
pub struct TournamentDatesInput {
    pub published_at: Option<DateTime<Utc>>,
    pub staff_regs_open_at: Option<DateTime<Utc>>,
    pub staff_regs_close_at: Option<DateTime<Utc>>,
    pub player_regs_open_at: Option<DateTime<Utc>>,
    pub player_regs_close_at: Option<DateTime<Utc>>,
    pub concludes_at: Option<DateTime<Utc>>,
}
