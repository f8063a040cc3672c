use std::collections::HashMap;

use async_graphql::{Context, Result, Subscription};
use futures_util::Stream;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use uuid::Uuid;

use crate::auth::jwt::Claims;
use crate::gql::error::ResultExt;
use crate::gql::types::UserNotification;

const CHANNEL_CAPACITY: usize = 100;

/// In-process registry of live notification streams, one broadcast channel
/// per connected user. Channels are created on first subscribe and dropped
/// again once a publish finds no receivers, so idle users cost nothing.
#[derive(Default)]
struct NotificationHub {
    senders: HashMap<Uuid, broadcast::Sender<UserNotification>>,
}

impl NotificationHub {
    fn subscribe(&mut self, user_id: Uuid) -> broadcast::Receiver<UserNotification> {
        self.senders
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    fn publish(&mut self, user_id: Uuid, notification: UserNotification) {
        let Some(sender) = self.senders.get(&user_id) else {
            return;
        };
        if sender.send(notification).is_err() {
            // Every receiver is gone; reclaim the channel.
            self.senders.remove(&user_id);
        }
    }
}

static HUB: Lazy<Mutex<NotificationHub>> = Lazy::new(Mutex::default);

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Live stream of the caller's notifications (requires authentication).
    async fn my_notifications(
        &self,
        ctx: &Context<'_>,
    ) -> Result<impl Stream<Item = Result<UserNotification, BroadcastStreamRecvError>>> {
        let claims = ctx.data::<Claims>()?;
        let user_id = Uuid::parse_str(&claims.sub).gql_err("Invalid user ID")?;

        let receiver = HUB.lock().subscribe(user_id);
        Ok(BroadcastStream::new(receiver))
    }
}

/// Push a notification onto its recipient's live stream, if they're listening.
pub fn publish_user_notification(notification: UserNotification) {
    let Ok(user_id) = Uuid::parse_str(notification.user_id.as_str()) else {
        return;
    };
    HUB.lock().publish(user_id, notification);
}
