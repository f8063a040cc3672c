use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::{NotificationRow, UserNotificationFullRow};
use crate::pagination::LimitOffset;

const NOTIFICATION_COLUMNS: &str = "id, tournament_id, message, vars, created_at";

#[derive(Debug, Clone)]
pub struct CreateNotificationData {
    pub tournament_id: Option<Uuid>,
    pub message: String,
    pub vars: serde_json::Value,
}

/// Notification row and fan-out rows are written in the caller's transaction
/// so a half-delivered notification never persists.
pub async fn create<'a>(
    db: impl PgExecutor<'a>,
    data: CreateNotificationData,
) -> Result<NotificationRow> {
    sqlx::query_as::<_, NotificationRow>(&format!(
        r#"
        INSERT INTO notifications (tournament_id, message, vars)
        VALUES ($1, $2, $3)
        RETURNING {NOTIFICATION_COLUMNS}
        "#
    ))
    .bind(data.tournament_id)
    .bind(data.message)
    .bind(data.vars)
    .fetch_one(db)
    .await
}

pub async fn add_recipients<'a>(
    db: impl PgExecutor<'a>,
    notification_id: Uuid,
    user_ids: &[Uuid],
) -> Result<u64> {
    if user_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query(
        r#"
        INSERT INTO user_notifications (notification_id, user_id)
        SELECT $1, unnest($2::uuid[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(notification_id)
    .bind(user_ids)
    .execute(db)
    .await?;

    Ok(result.rows_affected())
}

pub async fn list_for_user(
    pool: &Db,
    user_id: Uuid,
    unread_only: bool,
    page: LimitOffset,
) -> Result<Vec<UserNotificationFullRow>> {
    let mut query = sqlx::QueryBuilder::new(
        r#"
        SELECT un.notification_id, un.user_id, un.read_at,
               n.tournament_id, n.message, n.vars, n.created_at
        FROM user_notifications un
        JOIN notifications n ON n.id = un.notification_id
        WHERE un.user_id =
        "#,
    );
    query.push_bind(user_id);

    if unread_only {
        query.push(" AND un.read_at IS NULL");
    }

    query.push(" ORDER BY n.created_at DESC");
    query.push(" LIMIT ");
    query.push_bind(page.limit);
    query.push(" OFFSET ");
    query.push_bind(page.offset);

    query
        .build_query_as::<UserNotificationFullRow>()
        .fetch_all(pool)
        .await
}

pub async fn count_for_user(pool: &Db, user_id: Uuid, unread_only: bool) -> Result<i64> {
    let mut query = sqlx::QueryBuilder::new(
        "SELECT COUNT(*) FROM user_notifications WHERE user_id = ",
    );
    query.push_bind(user_id);

    if unread_only {
        query.push(" AND read_at IS NULL");
    }

    query.build_query_scalar::<i64>().fetch_one(pool).await
}

pub async fn count_unread(pool: &Db, user_id: Uuid) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM user_notifications WHERE user_id = $1 AND read_at IS NULL",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn mark_read(pool: &Db, notification_id: Uuid, user_id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE user_notifications
        SET read_at = NOW()
        WHERE notification_id = $1 AND user_id = $2 AND read_at IS NULL
        "#,
    )
    .bind(notification_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn mark_all_read(pool: &Db, user_id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE user_notifications SET read_at = NOW() WHERE user_id = $1 AND read_at IS NULL",
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
