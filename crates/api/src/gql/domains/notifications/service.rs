use sqlx::Result;
use uuid::Uuid;

use crate::gql::subscriptions::publish_user_notification;
use crate::gql::types::UserNotification;
use infra::db::Db;
use infra::repos::{notifications, notifications::CreateNotificationData};

/// Persist a notification plus its per-recipient fan-out rows in one
/// transaction, then push the rendered message onto each recipient's live
/// stream. The live push happens after the commit so subscribers never see a
/// notification that failed to persist.
pub async fn notify_users(
    db: &Db,
    tournament_id: Option<Uuid>,
    message: String,
    vars: serde_json::Value,
    user_ids: &[Uuid],
) -> Result<u64> {
    if user_ids.is_empty() {
        return Ok(0);
    }

    let mut tx = db.begin().await?;

    let notification = notifications::create(
        &mut *tx,
        CreateNotificationData {
            tournament_id,
            message,
            vars,
        },
    )
    .await?;

    let delivered = notifications::add_recipients(&mut *tx, notification.id, user_ids).await?;

    tx.commit().await?;

    for user_id in user_ids {
        publish_user_notification(UserNotification::from(
            infra::models::UserNotificationFullRow {
                notification_id: notification.id,
                user_id: *user_id,
                read_at: None,
                tournament_id: notification.tournament_id,
                message: notification.message.clone(),
                vars: notification.vars.clone(),
                created_at: notification.created_at,
            },
        ));
    }

    Ok(delivered)
}
