use async_graphql::{Context, Error, Object, Result, ID};

use crate::auth::permissions::{require_admin, require_user};
use crate::gql::common::helpers::parse_id;
use crate::gql::common::types::{PaginatedResponse, PaginationInput};
use crate::gql::error::ResultExt;
use crate::gql::types::User;
use crate::state::AppState;
use infra::repos::{users, users::UserFilter};

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// The logged-in user's own account.
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let user = require_user(ctx).await?;
        Ok(user.into())
    }

    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<Option<User>> {
        let state = ctx.data::<AppState>()?;
        let user_id = parse_id(&id, "user")?;

        Ok(users::get_by_id(&state.db, user_id).await?.map(User::from))
    }

    /// Search the user directory by osu! or Discord name. Admin only.
    async fn users(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
        pagination: Option<PaginationInput>,
    ) -> Result<PaginatedResponse<User>> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let filter = UserFilter { search };
        let page = pagination.unwrap_or_default().to_limit_offset();

        let (rows, total_count) = tokio::try_join!(
            users::list(&state.db, filter.clone(), page),
            users::count(&state.db, filter)
        )
        .db_err("Database operation failed")?;

        let items: Vec<User> = rows.into_iter().map(User::from).collect();
        Ok(PaginatedResponse::new(items, total_count, page))
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    /// Detach the linked Discord identity from the caller's account.
    async fn unlink_discord(&self, ctx: &Context<'_>) -> Result<User> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;

        if user.discord_user_id.is_none() {
            return Err(Error::new("No Discord account is linked"));
        }

        let updated = users::unlink_discord(&state.db, user.id)
            .await?
            .ok_or_else(|| Error::new("Your account no longer exists"))?;

        Ok(updated.into())
    }

    /// Grant or revoke site administration. Admins can't demote themselves,
    /// so the site always keeps at least one.
    async fn set_user_admin(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
        is_admin: bool,
    ) -> Result<User> {
        let caller = require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let user_id = parse_id(&user_id, "user")?;

        if caller.id == user_id && !is_admin {
            return Err(Error::new("You can't revoke your own administrator access"));
        }

        let updated = users::set_admin(&state.db, user_id, is_admin)
            .await?
            .ok_or_else(|| Error::new("User not found"))?;

        Ok(updated.into())
    }
}
