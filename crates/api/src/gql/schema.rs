use async_graphql::dataloader::DataLoader;
use async_graphql::Schema;

use super::loaders::{TeamLoader, TournamentLoader, UserLoader};
use super::{MutationRoot, QueryRoot, SubscriptionRoot};
use crate::state::AppState;

pub type AppSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

/// Build the schema with shared state and dataloaders in the context.
/// Introspection stays off unless GQL_INTROSPECTION=true.
pub fn build_schema(state: AppState) -> AppSchema {
    let db = state.db.clone();

    let mut builder = Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        SubscriptionRoot,
    )
    .data(state)
    .data(DataLoader::new(UserLoader::new(db.clone()), tokio::spawn))
    .data(DataLoader::new(
        TournamentLoader::new(db.clone()),
        tokio::spawn,
    ))
    .data(DataLoader::new(TeamLoader::new(db), tokio::spawn))
    .limit_depth(15)
    .limit_complexity(200);

    let introspection = std::env::var("GQL_INTROSPECTION").is_ok_and(|value| value == "true");
    if !introspection {
        builder = builder.disable_introspection();
    }

    builder.finish()
}
