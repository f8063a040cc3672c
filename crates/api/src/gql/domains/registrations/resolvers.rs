use async_graphql::{Context, Error, Object, Result, ID};

use crate::auth::permissions::require_user;
use crate::gql::common::helpers::{get_team, get_tournament, parse_id};
use crate::gql::common::types::{PaginatedResponse, PaginationInput};
use crate::gql::error::ResultExt;
use crate::gql::types::{CreateTeamInput, Player, Team, TournamentKind};
use crate::state::AppState;
use infra::models::UserRow;
use infra::repos::{bans, players, players::CreatePlayerData, teams, tournaments};

use super::service::{bws_rank, registration_block};

fn valid_team_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && trimmed.len() <= 32
}

/// An actively banned user can't register or manage rosters.
async fn reject_banned(state: &AppState, user: &UserRow) -> Result<()> {
    if let Some(ban) = bans::get_active_for_user(&state.db, user.id).await? {
        return Err(Error::new(format!("Your account is banned: {}", ban.reason)));
    }
    Ok(())
}

#[derive(Default)]
pub struct RegistrationQuery;

#[Object]
impl RegistrationQuery {
    /// Registered players of a tournament in registration order.
    async fn players(
        &self,
        ctx: &Context<'_>,
        tournament_id: ID,
        pagination: Option<PaginationInput>,
    ) -> Result<PaginatedResponse<Player>> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&tournament_id, "tournament")?;

        let page = pagination.unwrap_or_default().to_limit_offset();

        let (rows, total_count) = tokio::try_join!(
            players::list_by_tournament(&state.db, tournament_id, page),
            players::count_by_tournament(&state.db, tournament_id)
        )
        .db_err("Database operation failed")?;

        let items: Vec<Player> = rows.into_iter().map(Player::from).collect();
        Ok(PaginatedResponse::new(items, total_count, page))
    }

    async fn teams(&self, ctx: &Context<'_>, tournament_id: ID) -> Result<Vec<Team>> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&tournament_id, "tournament")?;

        let rows = teams::list_by_tournament(&state.db, tournament_id).await?;
        Ok(rows.into_iter().map(Team::from).collect())
    }

    /// The caller's own registration in a tournament, if any.
    async fn my_registration(
        &self,
        ctx: &Context<'_>,
        tournament_id: ID,
    ) -> Result<Option<Player>> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&tournament_id, "tournament")?;

        let row = players::get_by_tournament_and_user(&state.db, tournament_id, user.id).await?;
        Ok(row.map(Player::from))
    }
}

#[derive(Default)]
pub struct RegistrationMutation;

#[Object]
impl RegistrationMutation {
    /// Register for a tournament. Requires a linked Discord account, an open
    /// registration window, a rank inside the tournament's range and no
    /// active ban.
    async fn register_player(&self, ctx: &Context<'_>, tournament_id: ID) -> Result<Player> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&tournament_id, "tournament")?;

        let tournament = get_tournament(&state.db, tournament_id).await?;

        if let Some(message) = registration_block(&tournament, &user) {
            return Err(Error::new(message));
        }
        reject_banned(state, &user).await?;

        if players::get_by_tournament_and_user(&state.db, tournament_id, user.id)
            .await?
            .is_some()
        {
            return Err(Error::new("You are already registered"));
        }

        let bws = match (tournament.use_bws, user.global_rank) {
            (true, Some(rank)) => Some(bws_rank(rank, user.badge_count)),
            _ => None,
        };

        let player = players::create(
            &state.db,
            CreatePlayerData {
                tournament_id,
                user_id: user.id,
                team_id: None,
                bws_rank: bws,
            },
        )
        .await?;

        Ok(player.into())
    }

    /// Withdraw from a tournament while registrations are open.
    async fn unregister_player(&self, ctx: &Context<'_>, tournament_id: ID) -> Result<bool> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&tournament_id, "tournament")?;

        let tournament = get_tournament(&state.db, tournament_id).await?;
        if !tournament.player_regs_open() {
            return Err(Error::new(
                "Registrations are closed; contact the tournament staff to withdraw",
            ));
        }

        let player = players::get_by_tournament_and_user(&state.db, tournament_id, user.id)
            .await?
            .ok_or_else(|| Error::new("You are not registered"))?;

        if let Some(team_id) = player.team_id {
            let team = get_team(&state.db, team_id).await?;
            if team.captain_user_id == Some(user.id) {
                return Err(Error::new(
                    "Transfer the captaincy or disband your team before withdrawing",
                ));
            }
        }

        Ok(players::delete(&state.db, player.id).await? > 0)
    }

    /// Create a team; the creator joins it as captain.
    async fn create_team(&self, ctx: &Context<'_>, input: CreateTeamInput) -> Result<Team> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&input.tournament_id, "tournament")?;

        reject_banned(state, &user).await?;

        let tournament = get_tournament(&state.db, tournament_id).await?;
        let kind: TournamentKind = tournament.kind.into();
        if !kind.has_teams() {
            return Err(Error::new("This tournament doesn't have teams"));
        }

        if !valid_team_name(&input.name) {
            return Err(Error::new("Team names must be 1-32 characters"));
        }

        let player = players::get_by_tournament_and_user(&state.db, tournament_id, user.id)
            .await?
            .ok_or_else(|| Error::new("Register for the tournament before creating a team"))?;
        if player.team_id.is_some() {
            return Err(Error::new("Leave your current team first"));
        }

        let name = input.name.trim().to_string();
        if teams::get_by_name(&state.db, tournament_id, &name).await?.is_some() {
            return Err(Error::new("A team with this name already exists"));
        }

        let mut tx = state.db.begin().await?;
        // The row lock serializes competing team writes per tournament.
        tournaments::get_for_update(&mut *tx, tournament_id).await?;

        let team = teams::create(&mut *tx, tournament_id, &name, user.id).await?;
        players::set_team(&mut *tx, player.id, Some(team.id)).await?;

        tx.commit().await?;

        Ok(team.into())
    }

    /// Leave a team. The captain can only leave as the last member, which
    /// disbands the team.
    async fn leave_team(&self, ctx: &Context<'_>, team_id: ID) -> Result<bool> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let team_id = parse_id(&team_id, "team")?;

        let team = get_team(&state.db, team_id).await?;

        let player =
            players::get_by_tournament_and_user(&state.db, team.tournament_id, user.id)
                .await?
                .filter(|player| player.team_id == Some(team_id))
                .ok_or_else(|| Error::new("You are not on this team"))?;

        let mut tx = state.db.begin().await?;

        if team.captain_user_id == Some(user.id) {
            if players::count_by_team(&mut *tx, team_id).await? > 1 {
                tx.rollback().await?;
                return Err(Error::new(
                    "Transfer the captaincy before leaving, or kick the other members first",
                ));
            }
            teams::soft_delete(&mut *tx, team_id).await?;
        }

        players::set_team(&mut *tx, player.id, None).await?;
        tx.commit().await?;

        Ok(true)
    }

    /// Remove a member from the caller's team. Captain only.
    async fn kick_from_team(&self, ctx: &Context<'_>, team_id: ID, player_id: ID) -> Result<bool> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let team_id = parse_id(&team_id, "team")?;
        let player_id = parse_id(&player_id, "player")?;

        let team = get_team(&state.db, team_id).await?;
        if team.captain_user_id != Some(user.id) {
            return Err(Error::new("Only the team captain can kick members"));
        }

        let player = players::get_by_id(&state.db, player_id)
            .await?
            .filter(|player| player.team_id == Some(team_id))
            .ok_or_else(|| Error::new("That player is not on this team"))?;

        if player.user_id == user.id {
            return Err(Error::new("Use leaveTeam to leave your own team"));
        }

        Ok(players::set_team(&state.db, player.id, None).await?.is_some())
    }

    /// Hand the captaincy to another member of the team.
    async fn transfer_captaincy(
        &self,
        ctx: &Context<'_>,
        team_id: ID,
        to_user_id: ID,
    ) -> Result<Team> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let team_id = parse_id(&team_id, "team")?;
        let to_user_id = parse_id(&to_user_id, "user")?;

        let team = get_team(&state.db, team_id).await?;
        if team.captain_user_id != Some(user.id) {
            return Err(Error::new("Only the team captain can transfer the captaincy"));
        }
        if to_user_id == user.id {
            return Err(Error::new("You are already the captain"));
        }

        players::get_by_tournament_and_user(&state.db, team.tournament_id, to_user_id)
            .await?
            .filter(|player| player.team_id == Some(team_id))
            .ok_or_else(|| Error::new("The new captain must be a member of the team"))?;

        let updated = teams::set_captain(&state.db, team_id, to_user_id)
            .await?
            .ok_or_else(|| Error::new("Team not found"))?;

        Ok(updated.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_name_bounds() {
        assert!(valid_team_name("mouse only"));
        assert!(valid_team_name("  padded  "));
        assert!(!valid_team_name("   "));
        assert!(!valid_team_name(&"x".repeat(33)));
    }
}
