use async_graphql::{
    dataloader::DataLoader, ComplexObject, Context, InputObject, Result, SimpleObject, ID,
};
use chrono::{DateTime, Utc};

use crate::gql::common::helpers::parse_id;
use crate::gql::domains::users::types::User;
use crate::gql::error::ResultExt;
use crate::gql::loaders::{TeamLoader, UserLoader};
use crate::state::AppState;
use infra::repos::players;

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Player {
    pub id: ID,
    pub tournament_id: ID,
    pub user_id: ID,
    pub team_id: Option<ID>,
    pub bws_rank: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<infra::models::PlayerRow> for Player {
    fn from(row: infra::models::PlayerRow) -> Self {
        Self {
            id: row.id.into(),
            tournament_id: row.tournament_id.into(),
            user_id: row.user_id.into(),
            team_id: row.team_id.map(Into::into),
            bws_rank: row.bws_rank,
            created_at: row.created_at,
        }
    }
}

#[ComplexObject]
impl Player {
    async fn user(&self, ctx: &Context<'_>) -> Result<User> {
        let loader = ctx.data::<DataLoader<UserLoader>>()?;
        let user_id = parse_id(&self.user_id, "user")?;

        match loader.load_one(user_id).await.db_err("Loading user failed")? {
            Some(row) => Ok(row.into()),
            None => Err(async_graphql::Error::new("User not found")),
        }
    }

    async fn team(&self, ctx: &Context<'_>) -> Result<Option<Team>> {
        let Some(team_id) = &self.team_id else {
            return Ok(None);
        };

        let loader = ctx.data::<DataLoader<TeamLoader>>()?;
        let team_id = parse_id(team_id, "team")?;

        let row = loader.load_one(team_id).await.db_err("Loading team failed")?;
        Ok(row.map(Team::from))
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Team {
    pub id: ID,
    pub tournament_id: ID,
    pub name: String,
    pub captain_user_id: Option<ID>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<infra::models::TeamRow> for Team {
    fn from(row: infra::models::TeamRow) -> Self {
        Self {
            id: row.id.into(),
            tournament_id: row.tournament_id.into(),
            name: row.name,
            captain_user_id: row.captain_user_id.map(Into::into),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[ComplexObject]
impl Team {
    async fn members(&self, ctx: &Context<'_>) -> Result<Vec<Player>> {
        let state = ctx.data::<AppState>()?;
        let team_id = parse_id(&self.id, "team")?;

        let rows = players::list_by_team(&state.db, team_id).await?;
        Ok(rows.into_iter().map(Player::from).collect())
    }

    async fn captain(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(captain_id) = &self.captain_user_id else {
            return Ok(None);
        };

        let loader = ctx.data::<DataLoader<UserLoader>>()?;
        let captain_id = parse_id(captain_id, "user")?;

        let row = loader.load_one(captain_id).await.db_err("Loading user failed")?;
        Ok(row.map(User::from))
    }
}

// Registration input types

#[derive(InputObject)]
pub struct CreateTeamInput {
    pub tournament_id: ID,
    pub name: String,
}
