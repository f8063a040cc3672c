//! Dataloaders for the row types that GraphQL objects reference by ID
//! (`Player.user`, `Invite.tournament`, `Team.captain`, ...). Each one
//! batches a tick's worth of lookups into a single `ANY($1)` query through
//! the matching repo.

use async_graphql::dataloader::Loader;
use infra::{db::Db, models, repos};
use std::{collections::HashMap, future::Future, sync::Arc};
use uuid::Uuid;

macro_rules! id_loader {
    ($loader:ident, $row:ty, $repo:ident) => {
        #[derive(Clone)]
        pub struct $loader {
            db: Db,
        }

        impl $loader {
            pub fn new(db: Db) -> Self {
                Self { db }
            }
        }

        impl Loader<Uuid> for $loader {
            type Value = $row;
            type Error = Arc<sqlx::Error>;

            fn load(
                &self,
                keys: &[Uuid],
            ) -> impl Future<Output = Result<HashMap<Uuid, Self::Value>, Self::Error>> + Send
            {
                let db = self.db.clone();
                let ids: Vec<Uuid> = keys.to_vec();

                async move {
                    let rows = repos::$repo::get_by_ids(&db, &ids).await.map_err(Arc::new)?;
                    Ok(rows.into_iter().map(|row| (row.id, row)).collect())
                }
            }
        }
    };
}

id_loader!(UserLoader, models::UserRow, users);
id_loader!(TournamentLoader, models::TournamentRow, tournaments);
id_loader!(TeamLoader, models::TeamRow, teams);
