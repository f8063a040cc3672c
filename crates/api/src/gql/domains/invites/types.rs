use async_graphql::{
    dataloader::DataLoader, ComplexObject, Context, Enum, InputObject, Result, SimpleObject, ID,
};
use chrono::{DateTime, Utc};

use crate::gql::common::helpers::parse_id;
use crate::gql::domains::registrations::types::Team;
use crate::gql::domains::tournaments::types::Tournament;
use crate::gql::domains::users::types::User;
use crate::gql::error::ResultExt;
use crate::gql::loaders::{TeamLoader, TournamentLoader, UserLoader};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum InviteKind {
    TeamJoin,
    StaffJoin,
}

impl InviteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InviteKind::TeamJoin => "team_join",
            InviteKind::StaffJoin => "staff_join",
        }
    }
}

impl From<String> for InviteKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "staff_join" => InviteKind::StaffJoin,
            _ => InviteKind::TeamJoin,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
}

impl From<String> for InviteStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "accepted" => InviteStatus::Accepted,
            "declined" => InviteStatus::Declined,
            "cancelled" => InviteStatus::Cancelled,
            _ => InviteStatus::Pending,
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Invite {
    pub id: ID,
    pub tournament_id: ID,
    pub team_id: Option<ID>,
    pub from_user_id: ID,
    pub to_user_id: ID,
    pub kind: InviteKind,
    pub status: InviteStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<infra::models::InviteRow> for Invite {
    fn from(row: infra::models::InviteRow) -> Self {
        Self {
            id: row.id.into(),
            tournament_id: row.tournament_id.into(),
            team_id: row.team_id.map(Into::into),
            from_user_id: row.from_user_id.into(),
            to_user_id: row.to_user_id.into(),
            kind: row.kind.into(),
            status: row.status.into(),
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

#[ComplexObject]
impl Invite {
    async fn from_user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let loader = ctx.data::<DataLoader<UserLoader>>()?;
        let user_id = parse_id(&self.from_user_id, "user")?;

        let row = loader.load_one(user_id).await.db_err("Loading user failed")?;
        Ok(row.map(User::from))
    }

    async fn tournament(&self, ctx: &Context<'_>) -> Result<Option<Tournament>> {
        let loader = ctx.data::<DataLoader<TournamentLoader>>()?;
        let tournament_id = parse_id(&self.tournament_id, "tournament")?;

        let row = loader
            .load_one(tournament_id)
            .await
            .db_err("Loading tournament failed")?;
        Ok(row.map(Tournament::from))
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

// Invite input types

#[derive(InputObject)]
pub struct SendInviteInput {
    pub tournament_id: ID,
    pub to_user_id: ID,
    pub kind: InviteKind,
    pub team_id: Option<ID>,
}
