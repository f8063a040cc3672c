use async_graphql::{Context, Error, Object, Result, ID};

use crate::auth::permissions::{require_staff, require_user};
use crate::auth::Permission;
use crate::gql::common::helpers::parse_id;
use crate::gql::common::types::{PaginatedResponse, PaginationInput};
use crate::gql::error::ResultExt;
use crate::gql::types::{NotifyInput, UserNotification};
use crate::state::AppState;
use infra::repos::{notifications, players, staff_members};

use super::service::notify_users;
use super::types::vars_to_json;

fn valid_message(message: &str) -> bool {
    let trimmed = message.trim();
    !trimmed.is_empty() && trimmed.len() <= 500
}

#[derive(Default)]
pub struct NotificationQuery;

#[Object]
impl NotificationQuery {
    /// The caller's notifications, newest first.
    async fn my_notifications(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = false)] unread_only: bool,
        pagination: Option<PaginationInput>,
    ) -> Result<PaginatedResponse<UserNotification>> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let page = pagination.unwrap_or_default().to_limit_offset();

        let (rows, total_count) = tokio::try_join!(
            notifications::list_for_user(&state.db, user.id, unread_only, page),
            notifications::count_for_user(&state.db, user.id, unread_only)
        )
        .db_err("Database operation failed")?;

        let items: Vec<UserNotification> =
            rows.into_iter().map(UserNotification::from).collect();
        Ok(PaginatedResponse::new(items, total_count, page))
    }

    async fn unread_notification_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;

        notifications::count_unread(&state.db, user.id)
            .await
            .db_err("Database operation failed")
    }
}

#[derive(Default)]
pub struct NotificationMutation;

#[Object]
impl NotificationMutation {
    /// Send a notification to every staff member of a tournament.
    async fn notify_staff(&self, ctx: &Context<'_>, input: NotifyInput) -> Result<i32> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&input.tournament_id, "tournament")?;

        require_staff(ctx, tournament_id, &[Permission::ManageStaffMembers]).await?;

        if !valid_message(&input.message) {
            return Err(Error::new("Messages must be 1-500 characters"));
        }

        let recipients = staff_members::user_ids_by_tournament(&state.db, tournament_id).await?;

        let delivered = notify_users(
            &state.db,
            Some(tournament_id),
            input.message,
            vars_to_json(input.vars),
            &recipients,
        )
        .await?;

        Ok(delivered as i32)
    }

    /// Send a notification to every registered player of a tournament.
    async fn notify_players(&self, ctx: &Context<'_>, input: NotifyInput) -> Result<i32> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&input.tournament_id, "tournament")?;

        require_staff(ctx, tournament_id, &[Permission::ManageRegs]).await?;

        if !valid_message(&input.message) {
            return Err(Error::new("Messages must be 1-500 characters"));
        }

        let recipients = players::user_ids_by_tournament(&state.db, tournament_id).await?;

        let delivered = notify_users(
            &state.db,
            Some(tournament_id),
            input.message,
            vars_to_json(input.vars),
            &recipients,
        )
        .await?;

        Ok(delivered as i32)
    }

    /// Mark one of the caller's notifications as read.
    async fn mark_notification_read(
        &self,
        ctx: &Context<'_>,
        notification_id: ID,
    ) -> Result<bool> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let notification_id = parse_id(&notification_id, "notification")?;

        Ok(notifications::mark_read(&state.db, notification_id, user.id).await? > 0)
    }

    async fn mark_all_notifications_read(&self, ctx: &Context<'_>) -> Result<i32> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;

        Ok(notifications::mark_all_read(&state.db, user.id).await? as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_bounds() {
        assert!(valid_message("Mappool is out!"));
        assert!(!valid_message("   "));
        assert!(!valid_message(&"x".repeat(501)));
    }
}
