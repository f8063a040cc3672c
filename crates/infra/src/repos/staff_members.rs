use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::{StaffMemberRow, StaffRoleRow};

const STAFF_MEMBER_COLUMNS: &str = "id, tournament_id, user_id, joined_at";

pub async fn get(pool: &Db, tournament_id: Uuid, user_id: Uuid) -> Result<Option<StaffMemberRow>> {
    sqlx::query_as::<_, StaffMemberRow>(&format!(
        "SELECT {STAFF_MEMBER_COLUMNS} FROM staff_members WHERE tournament_id = $1 AND user_id = $2"
    ))
    .bind(tournament_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn get_by_id(pool: &Db, id: Uuid) -> Result<Option<StaffMemberRow>> {
    sqlx::query_as::<_, StaffMemberRow>(&format!(
        "SELECT {STAFF_MEMBER_COLUMNS} FROM staff_members WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn list_by_tournament(pool: &Db, tournament_id: Uuid) -> Result<Vec<StaffMemberRow>> {
    sqlx::query_as::<_, StaffMemberRow>(&format!(
        "SELECT {STAFF_MEMBER_COLUMNS} FROM staff_members WHERE tournament_id = $1 ORDER BY joined_at ASC"
    ))
    .bind(tournament_id)
    .fetch_all(pool)
    .await
}

pub async fn create<'a>(
    db: impl PgExecutor<'a>,
    tournament_id: Uuid,
    user_id: Uuid,
) -> Result<StaffMemberRow> {
    sqlx::query_as::<_, StaffMemberRow>(&format!(
        r#"
        INSERT INTO staff_members (tournament_id, user_id)
        VALUES ($1, $2)
        RETURNING {STAFF_MEMBER_COLUMNS}
        "#
    ))
    .bind(tournament_id)
    .bind(user_id)
    .fetch_one(db)
    .await
}

pub async fn delete(pool: &Db, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM staff_members WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// All roles held by one staff member, in display order.
pub async fn roles_of(pool: &Db, staff_member_id: Uuid) -> Result<Vec<StaffRoleRow>> {
    sqlx::query_as::<_, StaffRoleRow>(
        r#"
        SELECT r.id, r.tournament_id, r.name, r.color, r.order_idx, r.permissions,
               r.created_at, r.updated_at
        FROM staff_roles r
        JOIN staff_member_roles smr ON smr.staff_role_id = r.id
        WHERE smr.staff_member_id = $1
        ORDER BY r.order_idx ASC
        "#,
    )
    .bind(staff_member_id)
    .fetch_all(pool)
    .await
}

/// Role permission lists for a user within one tournament; the caller unions
/// them into a permission set.
pub async fn role_permissions_for_user(
    pool: &Db,
    tournament_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<Vec<String>>> {
    sqlx::query_scalar::<_, Vec<String>>(
        r#"
        SELECT r.permissions
        FROM staff_roles r
        JOIN staff_member_roles smr ON smr.staff_role_id = r.id
        JOIN staff_members sm ON sm.id = smr.staff_member_id
        WHERE sm.tournament_id = $1 AND sm.user_id = $2
        "#,
    )
    .bind(tournament_id)
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn add_role<'a>(
    db: impl PgExecutor<'a>,
    staff_member_id: Uuid,
    staff_role_id: Uuid,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO staff_member_roles (staff_member_id, staff_role_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(staff_member_id)
    .bind(staff_role_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected())
}

pub async fn clear_roles<'a>(db: impl PgExecutor<'a>, staff_member_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM staff_member_roles WHERE staff_member_id = $1")
        .bind(staff_member_id)
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}

pub async fn user_ids_by_tournament(pool: &Db, tournament_id: Uuid) -> Result<Vec<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT user_id FROM staff_members WHERE tournament_id = $1",
    )
    .bind(tournament_id)
    .fetch_all(pool)
    .await
}
