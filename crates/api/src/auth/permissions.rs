use async_graphql::{Context, Error, Result};
use std::collections::HashSet;
use std::str::FromStr;
use uuid::Uuid;

use crate::auth::Claims;
use crate::state::AppState;
use infra::models::UserRow;
use infra::repos::{staff_members, users};

/// A single grantable capability within one tournament. Stored as strings in
/// `staff_roles.permissions`; unknown strings are ignored on read so a removed
/// permission never locks a role out entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Host,
    Debug,
    ManageTournament,
    ManageAssets,
    ViewStaffMembers,
    ManageStaffMembers,
    ViewRegs,
    ManageRegs,
    ManagePoolStructure,
    ManagePooledMaps,
    ManageMatches,
    ManageForms,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Host => "host",
            Permission::Debug => "debug",
            Permission::ManageTournament => "manage_tournament",
            Permission::ManageAssets => "manage_assets",
            Permission::ViewStaffMembers => "view_staff_members",
            Permission::ManageStaffMembers => "manage_staff_members",
            Permission::ViewRegs => "view_regs",
            Permission::ManageRegs => "manage_regs",
            Permission::ManagePoolStructure => "manage_pool_structure",
            Permission::ManagePooledMaps => "manage_pooled_maps",
            Permission::ManageMatches => "manage_matches",
            Permission::ManageForms => "manage_forms",
        }
    }

    pub const ALL: &'static [Permission] = &[
        Permission::Host,
        Permission::Debug,
        Permission::ManageTournament,
        Permission::ManageAssets,
        Permission::ViewStaffMembers,
        Permission::ManageStaffMembers,
        Permission::ViewRegs,
        Permission::ManageRegs,
        Permission::ManagePoolStructure,
        Permission::ManagePooledMaps,
        Permission::ManageMatches,
        Permission::ManageForms,
    ];
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .find(|permission| permission.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown permission: {s}"))
    }
}

/// The union of every role's permission list a staff member holds in one
/// tournament.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet(HashSet<Permission>);

impl PermissionSet {
    pub fn from_role_lists(lists: &[Vec<String>]) -> Self {
        let mut set = HashSet::new();
        for list in lists {
            for name in list {
                if let Ok(permission) = name.parse::<Permission>() {
                    set.insert(permission);
                }
            }
        }
        Self(set)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Hosts and debuggers hold every permission implicitly.
    pub fn has_any(&self, required: &[Permission]) -> bool {
        if self.0.contains(&Permission::Host) || self.0.contains(&Permission::Debug) {
            return true;
        }
        required.iter().any(|permission| self.0.contains(permission))
    }
}

/// Require a valid login; returns the verified claims.
pub fn require_auth(ctx: &Context<'_>) -> Result<Claims> {
    ctx.data::<Claims>()
        .cloned()
        .map_err(|_| Error::new("You must be logged in to perform this action"))
}

/// Require a valid login and resolve the caller's user record.
pub async fn require_user(ctx: &Context<'_>) -> Result<UserRow> {
    let claims = require_auth(ctx)?;
    let user_id = claims.user_id().map_err(|e| Error::new(e.to_string()))?;

    let state = ctx.data::<AppState>()?;
    users::get_by_id(&state.db, user_id)
        .await
        .map_err(|e| Error::new(e.to_string()))?
        .ok_or_else(|| Error::new("Your account no longer exists"))
}

/// Site administrators only.
pub async fn require_admin(ctx: &Context<'_>) -> Result<UserRow> {
    let user = require_user(ctx).await?;

    if !user.is_admin {
        return Err(Error::new(
            "Access denied: administrator privileges required",
        ));
    }

    Ok(user)
}

/// Require staff membership in the tournament holding any of the listed
/// permissions. Site admins pass without being staff.
pub async fn require_staff(
    ctx: &Context<'_>,
    tournament_id: Uuid,
    required: &[Permission],
) -> Result<UserRow> {
    let user = require_user(ctx).await?;

    if user.is_admin {
        return Ok(user);
    }

    let state = ctx.data::<AppState>()?;
    let role_lists = staff_members::role_permissions_for_user(&state.db, tournament_id, user.id)
        .await
        .map_err(|e| Error::new(e.to_string()))?;

    let permissions = PermissionSet::from_role_lists(&role_lists);
    if permissions.is_empty() {
        return Err(Error::new(
            "Access denied: you are not a staff member of this tournament",
        ));
    }

    if !permissions.has_any(required) {
        let names: Vec<&str> = required.iter().map(Permission::as_str).collect();
        return Err(Error::new(format!(
            "Access denied: this action requires one of the following permissions: {}",
            names.join(", ")
        )));
    }

    Ok(user)
}

/// Destructive tournament-level actions are reserved for the host role
/// specifically, not the general host/debug override.
pub async fn require_host(ctx: &Context<'_>, tournament_id: Uuid) -> Result<UserRow> {
    let user = require_user(ctx).await?;

    if user.is_admin {
        return Ok(user);
    }

    let state = ctx.data::<AppState>()?;
    let role_lists = staff_members::role_permissions_for_user(&state.db, tournament_id, user.id)
        .await
        .map_err(|e| Error::new(e.to_string()))?;

    let permissions = PermissionSet::from_role_lists(&role_lists);
    if !permissions.contains(Permission::Host) {
        return Err(Error::new(
            "Access denied: only the tournament host can perform this action",
        ));
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_names_round_trip() {
        for permission in Permission::ALL {
            assert_eq!(
                permission.as_str().parse::<Permission>().unwrap(),
                *permission
            );
        }
        assert!("definitely_not_a_permission".parse::<Permission>().is_err());
    }

    #[test]
    fn union_across_roles() {
        let set = PermissionSet::from_role_lists(&[
            vec!["view_regs".into()],
            vec!["manage_regs".into(), "view_staff_members".into()],
        ]);

        assert!(set.contains(Permission::ViewRegs));
        assert!(set.contains(Permission::ManageRegs));
        assert!(set.contains(Permission::ViewStaffMembers));
        assert!(!set.contains(Permission::ManageTournament));
    }

    #[test]
    fn has_any_is_set_membership() {
        let set = PermissionSet::from_role_lists(&[vec!["manage_pooled_maps".into()]]);

        assert!(set.has_any(&[Permission::ManagePoolStructure, Permission::ManagePooledMaps]));
        assert!(!set.has_any(&[Permission::ManageTournament]));
    }

    #[test]
    fn host_implies_everything() {
        let set = PermissionSet::from_role_lists(&[vec!["host".into()]]);
        assert!(set.has_any(&[Permission::ManageMatches]));
        assert!(set.has_any(&[Permission::ManageForms]));

        let debug = PermissionSet::from_role_lists(&[vec!["debug".into()]]);
        assert!(debug.has_any(&[Permission::ManageTournament]));
    }

    #[test]
    fn unknown_permission_strings_are_skipped() {
        let set = PermissionSet::from_role_lists(&[vec![
            "view_regs".into(),
            "legacy_permission".into(),
        ]]);

        assert!(set.contains(Permission::ViewRegs));
        assert!(!set.is_empty());
    }

    #[test]
    fn empty_role_list_grants_nothing() {
        let set = PermissionSet::from_role_lists(&[]);
        assert!(set.is_empty());
        assert!(!set.has_any(&[Permission::ViewRegs]));
    }
}
