use async_graphql::{dataloader::DataLoader, ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};

use crate::gql::common::helpers::parse_id;
use crate::gql::domains::users::types::User;
use crate::gql::error::ResultExt;
use crate::gql::loaders::UserLoader;
use crate::state::AppState;
use infra::repos::staff_members;

#[derive(SimpleObject, Clone)]
pub struct StaffRole {
    pub id: ID,
    pub tournament_id: ID,
    pub name: String,
    pub color: String,
    pub order_idx: i32,
    pub permissions: Vec<String>,
}

impl From<infra::models::StaffRoleRow> for StaffRole {
    fn from(row: infra::models::StaffRoleRow) -> Self {
        Self {
            id: row.id.into(),
            tournament_id: row.tournament_id.into(),
            name: row.name,
            color: row.color,
            order_idx: row.order_idx,
            permissions: row.permissions,
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct StaffMember {
    pub id: ID,
    pub tournament_id: ID,
    pub user_id: ID,
    pub joined_at: DateTime<Utc>,
}

impl From<infra::models::StaffMemberRow> for StaffMember {
    fn from(row: infra::models::StaffMemberRow) -> Self {
        Self {
            id: row.id.into(),
            tournament_id: row.tournament_id.into(),
            user_id: row.user_id.into(),
            joined_at: row.joined_at,
        }
    }
}

#[ComplexObject]
impl StaffMember {
    async fn user(&self, ctx: &Context<'_>) -> Result<User> {
        let loader = ctx.data::<DataLoader<UserLoader>>()?;
        let user_id = parse_id(&self.user_id, "user")?;

        match loader.load_one(user_id).await.db_err("Loading user failed")? {
            Some(row) => Ok(row.into()),
            None => Err(async_graphql::Error::new("User not found")),
        }
    }

    async fn roles(&self, ctx: &Context<'_>) -> Result<Vec<StaffRole>> {
        let state = ctx.data::<AppState>()?;
        let member_id = parse_id(&self.id, "staff member")?;

        let rows = staff_members::roles_of(&state.db, member_id).await?;
        Ok(rows.into_iter().map(StaffRole::from).collect())
    }
}

// Staff input types

#[derive(InputObject)]
pub struct CreateStaffRoleInput {
    pub tournament_id: ID,
    pub name: String,
    #[graphql(default_with = "\"slate\".to_string()")]
    pub color: String,
    pub permissions: Vec<String>,
}

#[derive(InputObject)]
pub struct UpdateStaffRoleInput {
    pub id: ID,
    pub name: Option<String>,
    pub color: Option<String>,
    pub permissions: Option<Vec<String>>,
}

#[derive(InputObject)]
pub struct SetStaffMemberRolesInput {
    pub staff_member_id: ID,
    pub staff_role_ids: Vec<ID>,
}
