use async_graphql::{
    dataloader::DataLoader, ComplexObject, Context, InputObject, Result, SimpleObject, ID,
};
use chrono::{DateTime, Utc};

use crate::gql::common::helpers::parse_id;
use crate::gql::domains::users::types::User;
use crate::gql::error::ResultExt;
use crate::gql::loaders::UserLoader;

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Ban {
    pub id: ID,
    pub user_id: ID,
    pub issued_by_user_id: Option<ID>,
    pub reason: String,
    pub banned_until: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<infra::models::BanRow> for Ban {
    fn from(row: infra::models::BanRow) -> Self {
        let is_active = row.is_active();
        Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            issued_by_user_id: row.issued_by_user_id.map(Into::into),
            reason: row.reason,
            banned_until: row.banned_until,
            revoked_at: row.revoked_at,
            created_at: row.created_at,
            is_active,
        }
    }
}

#[ComplexObject]
impl Ban {
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let loader = ctx.data::<DataLoader<UserLoader>>()?;
        let user_id = parse_id(&self.user_id, "user")?;

        let row = loader.load_one(user_id).await.db_err("Loading user failed")?;
        Ok(row.map(User::from))
    }

    async fn issued_by(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(issuer_id) = &self.issued_by_user_id else {
            return Ok(None);
        };

        let loader = ctx.data::<DataLoader<UserLoader>>()?;
        let issuer_id = parse_id(issuer_id, "user")?;

        let row = loader.load_one(issuer_id).await.db_err("Loading user failed")?;
        Ok(row.map(User::from))
    }
}

// Ban input types

#[derive(InputObject)]
pub struct IssueBanInput {
    pub user_id: ID,
    pub reason: String,
    /// Absent for a permanent ban.
    pub banned_until: Option<DateTime<Utc>>,
}
