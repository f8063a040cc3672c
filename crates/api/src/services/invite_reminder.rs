use std::collections::HashSet;
use std::time::Duration;

use serde_json::json;
use tokio::time::{interval, Interval};
use tracing::{error, info};
use uuid::Uuid;

use crate::gql::domains::notifications::service::notify_users;
use crate::state::AppState;
use infra::repos::{invites, tournaments};

/// Remind recipients about pending invites expiring within this window.
const REMINDER_WINDOW_HOURS: i32 = 24;
const CHECK_INTERVAL_SECONDS: u64 = 600;

pub struct InviteReminderService {
    state: AppState,
    interval: Interval,
    // Invites already reminded, so an invite gets at most one reminder.
    reminded: HashSet<Uuid>,
}

impl InviteReminderService {
    pub fn new(state: AppState) -> Self {
        let interval = interval(Duration::from_secs(CHECK_INTERVAL_SECONDS));

        Self {
            state,
            interval,
            reminded: HashSet::new(),
        }
    }

    pub async fn run(&mut self) {
        info!("Starting invite reminder service");

        loop {
            self.interval.tick().await;

            if let Err(e) = self.remind_expiring_invites().await {
                error!("Error checking expiring invites: {e}");
            }

            self.prune_resolved().await;
        }
    }

    async fn remind_expiring_invites(&mut self) -> sqlx::Result<()> {
        let expiring =
            invites::expiring_soon(&self.state.db, REMINDER_WINDOW_HOURS).await?;

        for invite in expiring {
            if self.reminded.contains(&invite.id) {
                continue;
            }

            let Some(tournament) =
                tournaments::get_by_id(&self.state.db, invite.tournament_id).await?
            else {
                // Tournament gone; the cascade removed the invite too.
                self.reminded.insert(invite.id);
                continue;
            };

            notify_users(
                &self.state.db,
                Some(invite.tournament_id),
                "Your invite to {tournament} expires in less than a day".to_string(),
                json!({ "tournament": tournament.name }),
                &[invite.to_user_id],
            )
            .await?;

            info!(invite_id = %invite.id, "Sent invite expiry reminder");
            self.reminded.insert(invite.id);
        }

        Ok(())
    }

    /// Drop dedup entries for invites that are resolved, expired or gone, so
    /// the set doesn't grow forever.
    async fn prune_resolved(&mut self) {
        let mut to_remove = Vec::new();

        for invite_id in &self.reminded {
            match invites::get_by_id(&self.state.db, *invite_id).await {
                Ok(Some(invite)) => {
                    if invite.status != "pending" || invite.is_expired() {
                        to_remove.push(*invite_id);
                    }
                }
                Ok(None) => to_remove.push(*invite_id),
                // Keep the entry and retry on the next tick.
                Err(_) => {}
            }
        }

        for id in to_remove {
            self.reminded.remove(&id);
        }
    }
}

/// Spawn the reminder loop as a background task.
pub fn spawn_invite_reminder_service(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut service = InviteReminderService::new(state);
        service.run().await;
    })
}
