use async_graphql::{InputObject, SimpleObject, ID};
use chrono::{DateTime, Utc};

use super::vars::render_message;

/// One user's copy of a notification, with the message already rendered
/// against the stored variable map.
#[derive(SimpleObject, Clone)]
pub struct UserNotification {
    pub id: ID,
    pub user_id: ID,
    pub tournament_id: Option<ID>,
    pub message: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<infra::models::UserNotificationFullRow> for UserNotification {
    fn from(row: infra::models::UserNotificationFullRow) -> Self {
        Self {
            id: row.notification_id.into(),
            user_id: row.user_id.into(),
            tournament_id: row.tournament_id.map(Into::into),
            message: render_message(&row.message, &row.vars),
            read_at: row.read_at,
            created_at: row.created_at,
        }
    }
}

// Notification input types

#[derive(InputObject, Clone)]
pub struct MessageVarInput {
    pub key: String,
    pub value: String,
}

#[derive(InputObject)]
pub struct NotifyInput {
    pub tournament_id: ID,
    pub message: String,
    pub vars: Option<Vec<MessageVarInput>>,
}

/// Collect key/value pairs into the JSONB vars map.
pub fn vars_to_json(vars: Option<Vec<MessageVarInput>>) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = vars
        .unwrap_or_default()
        .into_iter()
        .map(|var| (var.key, serde_json::Value::String(var.value)))
        .collect();

    serde_json::Value::Object(map)
}
