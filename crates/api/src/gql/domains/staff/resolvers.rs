use async_graphql::{Context, Error, Object, Result, ID};
use std::str::FromStr;

use crate::auth::permissions::{require_staff, require_user};
use crate::auth::Permission;
use crate::gql::common::helpers::parse_id;
use crate::gql::types::{
    CreateStaffRoleInput, SetStaffMemberRolesInput, StaffMember, StaffRole, UpdateStaffRoleInput,
};
use crate::state::AppState;
use infra::repos::{
    staff_members, staff_roles,
    staff_roles::{CreateStaffRoleData, UpdateStaffRoleData},
};

/// Role permission lists come in as strings; every entry must name a known
/// permission.
fn parse_permissions(names: &[String]) -> Result<Vec<String>> {
    for name in names {
        Permission::from_str(name).map_err(Error::new)?;
    }
    Ok(names.to_vec())
}

#[derive(Default)]
pub struct StaffQuery;

#[Object]
impl StaffQuery {
    /// Staff roles of a tournament in display order.
    async fn staff_roles(&self, ctx: &Context<'_>, tournament_id: ID) -> Result<Vec<StaffRole>> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&tournament_id, "tournament")?;

        let rows = staff_roles::list_by_tournament(&state.db, tournament_id).await?;
        Ok(rows.into_iter().map(StaffRole::from).collect())
    }

    /// Staff members of a tournament. Requires staff-listing rights.
    async fn staff_members(
        &self,
        ctx: &Context<'_>,
        tournament_id: ID,
    ) -> Result<Vec<StaffMember>> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&tournament_id, "tournament")?;

        require_staff(
            ctx,
            tournament_id,
            &[Permission::ViewStaffMembers, Permission::ManageStaffMembers],
        )
        .await?;

        let rows = staff_members::list_by_tournament(&state.db, tournament_id).await?;
        Ok(rows.into_iter().map(StaffMember::from).collect())
    }
}

#[derive(Default)]
pub struct StaffMutation;

#[Object]
impl StaffMutation {
    async fn create_staff_role(
        &self,
        ctx: &Context<'_>,
        input: CreateStaffRoleInput,
    ) -> Result<StaffRole> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&input.tournament_id, "tournament")?;

        require_staff(ctx, tournament_id, &[Permission::ManageStaffMembers]).await?;

        if input.name.trim().is_empty() || input.name.len() > 40 {
            return Err(Error::new("Role names must be 1-40 characters"));
        }
        let permissions = parse_permissions(&input.permissions)?;

        if staff_roles::get_by_name(&state.db, tournament_id, &input.name)
            .await?
            .is_some()
        {
            return Err(Error::new("A role with this name already exists"));
        }

        let role = staff_roles::create(
            &state.db,
            CreateStaffRoleData {
                tournament_id,
                name: input.name,
                color: input.color,
                permissions,
            },
        )
        .await?;

        Ok(role.into())
    }

    async fn update_staff_role(
        &self,
        ctx: &Context<'_>,
        input: UpdateStaffRoleInput,
    ) -> Result<StaffRole> {
        let state = ctx.data::<AppState>()?;
        let role_id = parse_id(&input.id, "staff role")?;

        let current = staff_roles::get_by_id(&state.db, role_id)
            .await?
            .ok_or_else(|| Error::new("Staff role not found"))?;

        require_staff(ctx, current.tournament_id, &[Permission::ManageStaffMembers]).await?;

        // The Host role anchors the permission model.
        if current.name == "Host" {
            return Err(Error::new("The Host role can't be edited"));
        }

        let name = input.name.unwrap_or(current.name);
        if name.trim().is_empty() || name.len() > 40 {
            return Err(Error::new("Role names must be 1-40 characters"));
        }

        if let Some(existing) =
            staff_roles::get_by_name(&state.db, current.tournament_id, &name).await?
        {
            if existing.id != role_id {
                return Err(Error::new("A role with this name already exists"));
            }
        }

        let permissions = match input.permissions {
            Some(names) => parse_permissions(&names)?,
            None => current.permissions,
        };

        let updated = staff_roles::update(
            &state.db,
            role_id,
            UpdateStaffRoleData {
                name,
                color: input.color.unwrap_or(current.color),
                permissions,
            },
        )
        .await?
        .ok_or_else(|| Error::new("Staff role not found"))?;

        Ok(updated.into())
    }

    /// Swap the display order of two roles of the same tournament.
    async fn swap_staff_role_order(
        &self,
        ctx: &Context<'_>,
        first: ID,
        second: ID,
    ) -> Result<Vec<StaffRole>> {
        let state = ctx.data::<AppState>()?;
        let first_id = parse_id(&first, "staff role")?;
        let second_id = parse_id(&second, "staff role")?;

        let first_role = staff_roles::get_by_id(&state.db, first_id)
            .await?
            .ok_or_else(|| Error::new("Staff role not found"))?;
        let second_role = staff_roles::get_by_id(&state.db, second_id)
            .await?
            .ok_or_else(|| Error::new("Staff role not found"))?;

        if first_role.tournament_id != second_role.tournament_id {
            return Err(Error::new("Roles belong to different tournaments"));
        }

        require_staff(
            ctx,
            first_role.tournament_id,
            &[Permission::ManageStaffMembers],
        )
        .await?;

        let mut tx = state.db.begin().await?;
        staff_roles::set_order(&mut *tx, first_id, second_role.order_idx).await?;
        staff_roles::set_order(&mut *tx, second_id, first_role.order_idx).await?;
        tx.commit().await?;

        let rows = staff_roles::list_by_tournament(&state.db, first_role.tournament_id).await?;
        Ok(rows.into_iter().map(StaffRole::from).collect())
    }

    async fn delete_staff_role(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let role_id = parse_id(&id, "staff role")?;

        let role = staff_roles::get_by_id(&state.db, role_id)
            .await?
            .ok_or_else(|| Error::new("Staff role not found"))?;

        require_staff(ctx, role.tournament_id, &[Permission::ManageStaffMembers]).await?;

        if role.name == "Host" {
            return Err(Error::new("The Host role can't be deleted"));
        }

        Ok(staff_roles::delete(&state.db, role_id).await? > 0)
    }

    /// Replace a staff member's role set.
    async fn set_staff_member_roles(
        &self,
        ctx: &Context<'_>,
        input: SetStaffMemberRolesInput,
    ) -> Result<StaffMember> {
        let state = ctx.data::<AppState>()?;
        let member_id = parse_id(&input.staff_member_id, "staff member")?;

        let member = staff_members::get_by_id(&state.db, member_id)
            .await?
            .ok_or_else(|| Error::new("Staff member not found"))?;

        require_staff(ctx, member.tournament_id, &[Permission::ManageStaffMembers]).await?;

        // Every assigned role must belong to the member's tournament.
        let mut role_ids = Vec::with_capacity(input.staff_role_ids.len());
        for role_id in &input.staff_role_ids {
            let role_id = parse_id(role_id, "staff role")?;
            let role = staff_roles::get_by_id(&state.db, role_id)
                .await?
                .ok_or_else(|| Error::new("Staff role not found"))?;
            if role.tournament_id != member.tournament_id {
                return Err(Error::new("Role belongs to a different tournament"));
            }
            role_ids.push(role_id);
        }

        let mut tx = state.db.begin().await?;
        staff_members::clear_roles(&mut *tx, member_id).await?;
        for role_id in role_ids {
            staff_members::add_role(&mut *tx, member_id, role_id).await?;
        }
        tx.commit().await?;

        Ok(member.into())
    }

    /// Remove another member from the tournament's staff.
    async fn remove_staff_member(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let member_id = parse_id(&id, "staff member")?;

        let member = staff_members::get_by_id(&state.db, member_id)
            .await?
            .ok_or_else(|| Error::new("Staff member not found"))?;

        let caller = require_staff(
            ctx,
            member.tournament_id,
            &[Permission::ManageStaffMembers],
        )
        .await?;

        if caller.id == member.user_id {
            return Err(Error::new("Use leaveStaff to remove yourself"));
        }

        Ok(staff_members::delete(&state.db, member_id).await? > 0)
    }

    /// Leave a tournament's staff.
    async fn leave_staff(&self, ctx: &Context<'_>, tournament_id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&tournament_id, "tournament")?;

        let user = require_user(ctx).await?;

        let member = staff_members::get(&state.db, tournament_id, user.id)
            .await?
            .ok_or_else(|| Error::new("You are not a staff member of this tournament"))?;

        // The host can't abandon their own tournament.
        let roles = staff_members::roles_of(&state.db, member.id).await?;
        if roles.iter().any(|role| role.name == "Host") {
            return Err(Error::new(
                "The host can't leave; delete the tournament or transfer hosting first",
            ));
        }

        Ok(staff_members::delete(&state.db, member.id).await? > 0)
    }
}
