use async_graphql::{ComplexObject, Context, Enum, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};

use crate::gql::common::helpers::parse_id;
use crate::state::AppState;
use infra::repos::{modpools, rounds};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum StageFormat {
    Groups,
    Swiss,
    Qualifiers,
    SingleElim,
    DoubleElim,
    BattleRoyale,
}

impl From<String> for StageFormat {
    fn from(format: String) -> Self {
        match format.as_str() {
            "groups" => StageFormat::Groups,
            "swiss" => StageFormat::Swiss,
            "qualifiers" => StageFormat::Qualifiers,
            "double_elim" => StageFormat::DoubleElim,
            "battle_royale" => StageFormat::BattleRoyale,
            _ => StageFormat::SingleElim,
        }
    }
}

impl From<StageFormat> for String {
    fn from(format: StageFormat) -> Self {
        match format {
            StageFormat::Groups => "groups".to_string(),
            StageFormat::Swiss => "swiss".to_string(),
            StageFormat::Qualifiers => "qualifiers".to_string(),
            StageFormat::SingleElim => "single_elim".to_string(),
            StageFormat::DoubleElim => "double_elim".to_string(),
            StageFormat::BattleRoyale => "battle_royale".to_string(),
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Stage {
    pub id: ID,
    pub tournament_id: ID,
    pub label: String,
    pub format: StageFormat,
    pub order_idx: i32,
    pub is_main: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<infra::models::StageRow> for Stage {
    fn from(row: infra::models::StageRow) -> Self {
        Self {
            id: row.id.into(),
            tournament_id: row.tournament_id.into(),
            label: row.label,
            format: row.format.into(),
            order_idx: row.order_idx,
            is_main: row.is_main,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[ComplexObject]
impl Stage {
    async fn rounds(&self, ctx: &Context<'_>) -> Result<Vec<Round>> {
        let state = ctx.data::<AppState>()?;
        let stage_id = parse_id(&self.id, "stage")?;

        let rows = rounds::list_by_stage(&state.db, stage_id).await?;
        Ok(rows.into_iter().map(Round::from).collect())
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Round {
    pub id: ID,
    pub stage_id: ID,
    pub label: String,
    pub order_idx: i32,
    pub target_star_rating: Option<f64>,
    pub mappool_published: bool,
    pub schedules_published: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<infra::models::RoundRow> for Round {
    fn from(row: infra::models::RoundRow) -> Self {
        Self {
            id: row.id.into(),
            stage_id: row.stage_id.into(),
            label: row.label,
            order_idx: row.order_idx,
            target_star_rating: row.target_star_rating,
            mappool_published: row.mappool_published,
            schedules_published: row.schedules_published,
            starts_at: row.starts_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[ComplexObject]
impl Round {
    async fn modpools(&self, ctx: &Context<'_>) -> Result<Vec<Modpool>> {
        let state = ctx.data::<AppState>()?;
        let round_id = parse_id(&self.id, "round")?;

        let rows = modpools::list_by_round(&state.db, round_id).await?;
        Ok(rows.into_iter().map(Modpool::from).collect())
    }
}

#[derive(SimpleObject, Clone)]
pub struct Modpool {
    pub id: ID,
    pub round_id: ID,
    pub category: String,
    pub map_count: i32,
}

impl From<infra::models::ModpoolRow> for Modpool {
    fn from(row: infra::models::ModpoolRow) -> Self {
        Self {
            id: row.id.into(),
            round_id: row.round_id.into(),
            category: row.category,
            map_count: row.map_count,
        }
    }
}

// Stage and round input types

#[derive(InputObject)]
pub struct CreateStageInput {
    pub tournament_id: ID,
    pub label: String,
    pub format: StageFormat,
    #[graphql(default = false)]
    pub is_main: bool,
}

#[derive(InputObject)]
pub struct UpdateStageInput {
    pub id: ID,
    pub label: Option<String>,
    pub format: Option<StageFormat>,
}

#[derive(InputObject)]
pub struct CreateRoundInput {
    pub stage_id: ID,
    pub label: String,
    pub target_star_rating: Option<f64>,
    pub starts_at: Option<DateTime<Utc>>,
}

#[derive(InputObject)]
pub struct UpdateRoundInput {
    pub id: ID,
    pub label: Option<String>,
    pub target_star_rating: Option<f64>,
    pub mappool_published: Option<bool>,
    pub schedules_published: Option<bool>,
    pub starts_at: Option<DateTime<Utc>>,
}

#[derive(InputObject)]
pub struct ModpoolInput {
    pub category: String,
    pub map_count: i32,
}
