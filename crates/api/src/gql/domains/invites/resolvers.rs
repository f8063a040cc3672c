use async_graphql::{Context, Error, Object, Result, ID};
use serde_json::json;
use uuid::Uuid;

use crate::auth::permissions::{require_staff, require_user};
use crate::auth::Permission;
use crate::gql::common::helpers::{get_team, get_tournament, parse_id};
use crate::gql::common::types::{PaginatedResponse, PaginationInput};
use crate::gql::domains::notifications::service::notify_users;
use crate::gql::error::ResultExt;
use crate::gql::types::{Invite, InviteKind, SendInviteInput};
use crate::state::AppState;
use infra::models::{InviteRow, TeamRow, UserRow};
use infra::repos::{
    bans, invites, invites::CreateInviteData, players, staff_members, tournaments, users,
};

/// Invites lapse after two weeks if the recipient never responds.
const INVITE_EXPIRY_DAYS: i32 = 14;

async fn get_invite(state: &AppState, id: Uuid) -> Result<InviteRow> {
    invites::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::new("Invite not found"))
}

/// Actively banned users can't receive or accept invites.
async fn reject_banned(state: &AppState, user_id: Uuid) -> Result<()> {
    if bans::get_active_for_user(&state.db, user_id).await?.is_some() {
        return Err(Error::new("That account is banned"));
    }
    Ok(())
}

#[derive(Default)]
pub struct InviteQuery;

#[Object]
impl InviteQuery {
    /// The caller's pending invites, newest first.
    async fn my_invites(
        &self,
        ctx: &Context<'_>,
        pagination: Option<PaginationInput>,
    ) -> Result<PaginatedResponse<Invite>> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let page = pagination.unwrap_or_default().to_limit_offset();

        let (rows, total_count) = tokio::try_join!(
            invites::list_pending_for_user(&state.db, user.id, page),
            invites::count_pending_for_user(&state.db, user.id)
        )
        .db_err("Database operation failed")?;

        let items: Vec<Invite> = rows.into_iter().map(Invite::from).collect();
        Ok(PaginatedResponse::new(items, total_count, page))
    }

    /// Every invite sent within a tournament, for its staff.
    async fn tournament_invites(
        &self,
        ctx: &Context<'_>,
        tournament_id: ID,
        pagination: Option<PaginationInput>,
    ) -> Result<PaginatedResponse<Invite>> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&tournament_id, "tournament")?;

        require_staff(ctx, tournament_id, &[Permission::ManageStaffMembers]).await?;

        let page = pagination.unwrap_or_default().to_limit_offset();

        let (rows, total_count) = tokio::try_join!(
            invites::list_by_tournament(&state.db, tournament_id, page),
            invites::count_by_tournament(&state.db, tournament_id)
        )
        .db_err("Database operation failed")?;

        let items: Vec<Invite> = rows.into_iter().map(Invite::from).collect();
        Ok(PaginatedResponse::new(items, total_count, page))
    }
}

#[derive(Default)]
pub struct InviteMutation;

#[Object]
impl InviteMutation {
    /// Invite a player onto a team (captain) or a user onto the staff
    /// (staff with member management rights). The recipient is notified.
    async fn send_invite(&self, ctx: &Context<'_>, input: SendInviteInput) -> Result<Invite> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&input.tournament_id, "tournament")?;
        let to_user_id = parse_id(&input.to_user_id, "user")?;

        if to_user_id == user.id {
            return Err(Error::new("You can't invite yourself"));
        }

        let target = users::get_by_id(&state.db, to_user_id)
            .await?
            .ok_or_else(|| Error::new("User not found"))?;
        reject_banned(state, target.id).await?;

        let tournament = get_tournament(&state.db, tournament_id).await?;

        let team = match input.kind {
            InviteKind::TeamJoin => {
                Some(self.check_team_invite(ctx, &input, tournament_id, &user, &target).await?)
            }
            InviteKind::StaffJoin => {
                require_staff(ctx, tournament_id, &[Permission::ManageStaffMembers]).await?;

                if staff_members::get(&state.db, tournament_id, to_user_id)
                    .await?
                    .is_some()
                {
                    return Err(Error::new("That user is already on the staff"));
                }
                None
            }
        };
        let team_id = team.as_ref().map(|team| team.id);

        if invites::pending_duplicate_exists(
            &state.db,
            tournament_id,
            to_user_id,
            input.kind.as_str(),
            team_id,
        )
        .await?
        {
            return Err(Error::new("That user already has a pending invite"));
        }

        let invite = invites::create(
            &state.db,
            CreateInviteData {
                tournament_id,
                team_id,
                from_user_id: user.id,
                to_user_id,
                kind: input.kind.as_str().to_string(),
                expires_in_days: INVITE_EXPIRY_DAYS,
            },
        )
        .await?;

        let (message, vars) = match team {
            Some(team) => (
                "{user} invited you to join {team} in {tournament}",
                json!({
                    "user": user.osu_username,
                    "team": team.name,
                    "tournament": tournament.name,
                }),
            ),
            None => (
                "{user} invited you to staff {tournament}",
                json!({
                    "user": user.osu_username,
                    "tournament": tournament.name,
                }),
            ),
        };

        notify_users(
            &state.db,
            Some(tournament_id),
            message.to_string(),
            vars,
            &[to_user_id],
        )
        .await?;

        Ok(invite.into())
    }

    /// Accept a pending invite. The membership side effect happens in the
    /// same transaction as the status flip, so a failed join leaves the
    /// invite pending.
    async fn accept_invite(&self, ctx: &Context<'_>, id: ID) -> Result<Invite> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let invite_id = parse_id(&id, "invite")?;

        let invite = get_invite(state, invite_id).await?;
        if invite.to_user_id != user.id {
            return Err(Error::new("This invite isn't addressed to you"));
        }
        if invite.status != "pending" {
            return Err(Error::new("This invite is no longer pending"));
        }
        if invite.is_expired() {
            return Err(Error::new("This invite has expired"));
        }
        reject_banned(state, user.id).await?;

        let mut tx = state.db.begin().await?;

        let resolved = invites::resolve(&mut *tx, invite_id, "accepted")
            .await?
            .ok_or_else(|| Error::new("This invite is no longer pending"))?;

        match InviteKind::from(invite.kind.clone()) {
            InviteKind::TeamJoin => {
                let team_id = invite
                    .team_id
                    .ok_or_else(|| Error::new("This invite's team no longer exists"))?;
                let team = get_team(&state.db, team_id).await?;

                let player = players::get_by_tournament_and_user(
                    &state.db,
                    invite.tournament_id,
                    user.id,
                )
                .await?
                .ok_or_else(|| Error::new("Register for the tournament before joining a team"))?;
                if player.team_id.is_some() {
                    return Err(Error::new("Leave your current team first"));
                }

                // Lock the tournament row so concurrent accepts can't
                // overfill the team.
                let tournament =
                    tournaments::get_for_update(&mut *tx, invite.tournament_id)
                        .await?
                        .ok_or_else(|| Error::new("Tournament not found"))?;

                if let Some(max) = tournament.team_size_max {
                    let members = players::count_by_team(&mut *tx, team.id).await?;
                    if members >= i64::from(max) {
                        return Err(Error::new("That team is already full"));
                    }
                }

                players::set_team(&mut *tx, player.id, Some(team.id)).await?;
            }
            InviteKind::StaffJoin => {
                if staff_members::get(&state.db, invite.tournament_id, user.id)
                    .await?
                    .is_none()
                {
                    staff_members::create(&mut *tx, invite.tournament_id, user.id).await?;
                }
            }
        }

        tx.commit().await?;

        Ok(resolved.into())
    }

    /// Decline a pending invite addressed to the caller.
    async fn decline_invite(&self, ctx: &Context<'_>, id: ID) -> Result<Invite> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let invite_id = parse_id(&id, "invite")?;

        let invite = get_invite(state, invite_id).await?;
        if invite.to_user_id != user.id {
            return Err(Error::new("This invite isn't addressed to you"));
        }

        let resolved = invites::resolve(&state.db, invite_id, "declined")
            .await?
            .ok_or_else(|| Error::new("This invite is no longer pending"))?;

        Ok(resolved.into())
    }

    /// Withdraw a pending invite. The sender can always cancel; staff with
    /// member management rights can cancel any staff invite.
    async fn cancel_invite(&self, ctx: &Context<'_>, id: ID) -> Result<Invite> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let invite_id = parse_id(&id, "invite")?;

        let invite = get_invite(state, invite_id).await?;

        if invite.from_user_id != user.id {
            if invite.kind != "staff_join" {
                return Err(Error::new("Only the sender can cancel this invite"));
            }
            require_staff(
                ctx,
                invite.tournament_id,
                &[Permission::ManageStaffMembers],
            )
            .await?;
        }

        let resolved = invites::resolve(&state.db, invite_id, "cancelled")
            .await?
            .ok_or_else(|| Error::new("This invite is no longer pending"))?;

        Ok(resolved.into())
    }
}

impl InviteMutation {
    /// Team invites: the sender must captain the team, the recipient must be
    /// a teamless registered player, and the team must have room.
    async fn check_team_invite(
        &self,
        ctx: &Context<'_>,
        input: &SendInviteInput,
        tournament_id: Uuid,
        sender: &UserRow,
        target: &UserRow,
    ) -> Result<TeamRow> {
        let state = ctx.data::<AppState>()?;

        let team_id = input
            .team_id
            .as_ref()
            .ok_or_else(|| Error::new("Team invites need a team"))?;
        let team_id = parse_id(team_id, "team")?;

        let team = get_team(&state.db, team_id).await?;
        if team.tournament_id != tournament_id {
            return Err(Error::new("Team belongs to a different tournament"));
        }
        if team.captain_user_id != Some(sender.id) {
            return Err(Error::new("Only the team captain can send team invites"));
        }

        let player =
            players::get_by_tournament_and_user(&state.db, tournament_id, target.id)
                .await?
                .ok_or_else(|| {
                    Error::new("That user isn't registered for the tournament")
                })?;
        if player.team_id.is_some() {
            return Err(Error::new("That player is already on a team"));
        }

        let tournament = get_tournament(&state.db, tournament_id).await?;
        if let Some(max) = tournament.team_size_max {
            let members = players::count_by_team(&state.db, team_id).await?;
            if members >= i64::from(max) {
                return Err(Error::new("Your team is already full"));
            }
        }

        Ok(team)
    }
}
