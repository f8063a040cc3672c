use async_graphql::{Context, Error, Object, Result, ID};
use chrono::Utc;

use crate::auth::permissions::{require_admin, require_user};
use crate::gql::common::helpers::parse_id;
use crate::gql::common::types::{PaginatedResponse, PaginationInput};
use crate::gql::error::ResultExt;
use crate::gql::types::{Ban, IssueBanInput};
use crate::state::AppState;
use infra::repos::{bans, bans::CreateBanData, sessions, users};

#[derive(Default)]
pub struct BanQuery;

#[Object]
impl BanQuery {
    /// Full ban ledger, newest first. Admin only.
    async fn bans(
        &self,
        ctx: &Context<'_>,
        pagination: Option<PaginationInput>,
    ) -> Result<PaginatedResponse<Ban>> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let page = pagination.unwrap_or_default().to_limit_offset();

        let (rows, total_count) = tokio::try_join!(
            bans::list(&state.db, page),
            bans::count(&state.db)
        )
        .db_err("Database operation failed")?;

        let items: Vec<Ban> = rows.into_iter().map(Ban::from).collect();
        Ok(PaginatedResponse::new(items, total_count, page))
    }

    /// A single user's ban history. Admin only.
    async fn user_bans(&self, ctx: &Context<'_>, user_id: ID) -> Result<Vec<Ban>> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let user_id = parse_id(&user_id, "user")?;

        let rows = bans::list_for_user(&state.db, user_id).await?;
        Ok(rows.into_iter().map(Ban::from).collect())
    }

    /// The caller's own active ban, if any.
    async fn my_active_ban(&self, ctx: &Context<'_>) -> Result<Option<Ban>> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let row = bans::get_active_for_user(&state.db, user.id).await?;
        Ok(row.map(Ban::from))
    }
}

#[derive(Default)]
pub struct BanMutation;

#[Object]
impl BanMutation {
    /// Ban a user. Their sessions are revoked in the same transaction, so an
    /// open login stops working immediately.
    async fn issue_ban(&self, ctx: &Context<'_>, input: IssueBanInput) -> Result<Ban> {
        let caller = require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let user_id = parse_id(&input.user_id, "user")?;

        if user_id == caller.id {
            return Err(Error::new("You can't ban yourself"));
        }

        let reason = input.reason.trim();
        if reason.is_empty() || reason.len() > 500 {
            return Err(Error::new("Ban reasons must be 1-500 characters"));
        }

        if let Some(until) = input.banned_until {
            if until <= Utc::now() {
                return Err(Error::new("The ban must end in the future"));
            }
        }

        let target = users::get_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| Error::new("User not found"))?;
        if target.is_admin {
            return Err(Error::new("Administrators can't be banned"));
        }

        if bans::get_active_for_user(&state.db, user_id).await?.is_some() {
            return Err(Error::new("That user is already banned"));
        }

        let mut tx = state.db.begin().await?;

        let ban = bans::create(
            &mut *tx,
            CreateBanData {
                user_id,
                issued_by_user_id: caller.id,
                reason: reason.to_string(),
                banned_until: input.banned_until,
            },
        )
        .await?;

        sessions::delete_by_user(&mut *tx, user_id).await?;

        tx.commit().await?;

        Ok(ban.into())
    }

    /// Lift a ban early.
    async fn revoke_ban(&self, ctx: &Context<'_>, id: ID) -> Result<Ban> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let ban_id = parse_id(&id, "ban")?;

        let revoked = bans::revoke(&state.db, ban_id)
            .await?
            .ok_or_else(|| Error::new("No revocable ban found"))?;

        Ok(revoked.into())
    }
}
