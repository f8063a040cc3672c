use async_graphql::{Error, Result, ID};
use uuid::Uuid;

use crate::gql::error::ResultExt;
use infra::db::Db;
use infra::models::{RoundRow, StageRow, TeamRow, TournamentRow};
use infra::repos::{rounds, stages, teams, tournaments};

pub fn parse_id(id: &ID, what: &str) -> Result<Uuid> {
    Uuid::parse_str(id.as_str()).gql_err(&format!("Invalid {what} ID"))
}

pub async fn get_tournament(db: &Db, id: Uuid) -> Result<TournamentRow> {
    tournaments::get_by_id(db, id)
        .await?
        .ok_or_else(|| Error::new("Tournament not found"))
}

pub async fn get_stage(db: &Db, id: Uuid) -> Result<StageRow> {
    stages::get_by_id(db, id)
        .await?
        .ok_or_else(|| Error::new("Stage not found"))
}

pub async fn get_round(db: &Db, id: Uuid) -> Result<RoundRow> {
    rounds::get_by_id(db, id)
        .await?
        .ok_or_else(|| Error::new("Round not found"))
}

pub async fn get_team(db: &Db, id: Uuid) -> Result<TeamRow> {
    teams::get_by_id(db, id)
        .await?
        .ok_or_else(|| Error::new("Team not found"))
}

/// Resolve the tournament a round belongs to, through its stage.
pub async fn tournament_id_for_round(db: &Db, round_id: Uuid) -> Result<Uuid> {
    rounds::tournament_id_of(db, round_id)
        .await?
        .ok_or_else(|| Error::new("Round not found"))
}
