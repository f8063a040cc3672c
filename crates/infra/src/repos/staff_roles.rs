use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::db::Db;
use crate::models::StaffRoleRow;

const STAFF_ROLE_COLUMNS: &str =
    "id, tournament_id, name, color, order_idx, permissions, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CreateStaffRoleData {
    pub tournament_id: Uuid,
    pub name: String,
    pub color: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateStaffRoleData {
    pub name: String,
    pub color: String,
    pub permissions: Vec<String>,
}

pub async fn get_by_id(pool: &Db, id: Uuid) -> Result<Option<StaffRoleRow>> {
    sqlx::query_as::<_, StaffRoleRow>(&format!(
        "SELECT {STAFF_ROLE_COLUMNS} FROM staff_roles WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_by_name(
    pool: &Db,
    tournament_id: Uuid,
    name: &str,
) -> Result<Option<StaffRoleRow>> {
    sqlx::query_as::<_, StaffRoleRow>(&format!(
        "SELECT {STAFF_ROLE_COLUMNS} FROM staff_roles WHERE tournament_id = $1 AND LOWER(name) = LOWER($2)"
    ))
    .bind(tournament_id)
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn list_by_tournament(pool: &Db, tournament_id: Uuid) -> Result<Vec<StaffRoleRow>> {
    sqlx::query_as::<_, StaffRoleRow>(&format!(
        "SELECT {STAFF_ROLE_COLUMNS} FROM staff_roles WHERE tournament_id = $1 ORDER BY order_idx ASC"
    ))
    .bind(tournament_id)
    .fetch_all(pool)
    .await
}

pub async fn create<'a>(
    db: impl PgExecutor<'a>,
    data: CreateStaffRoleData,
) -> Result<StaffRoleRow> {
    sqlx::query_as::<_, StaffRoleRow>(&format!(
        r#"
        INSERT INTO staff_roles (tournament_id, name, color, order_idx, permissions)
        VALUES ($1, $2, $3,
                (SELECT COALESCE(MAX(order_idx) + 1, 0) FROM staff_roles WHERE tournament_id = $1),
                $4)
        RETURNING {STAFF_ROLE_COLUMNS}
        "#
    ))
    .bind(data.tournament_id)
    .bind(data.name)
    .bind(data.color)
    .bind(data.permissions)
    .fetch_one(db)
    .await
}

pub async fn update(
    pool: &Db,
    id: Uuid,
    data: UpdateStaffRoleData,
) -> Result<Option<StaffRoleRow>> {
    sqlx::query_as::<_, StaffRoleRow>(&format!(
        r#"
        UPDATE staff_roles
        SET name = $2, color = $3, permissions = $4, updated_at = NOW()
        WHERE id = $1
        RETURNING {STAFF_ROLE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(data.name)
    .bind(data.color)
    .bind(data.permissions)
    .fetch_optional(pool)
    .await
}

pub async fn set_order<'a>(db: impl PgExecutor<'a>, id: Uuid, order_idx: i32) -> Result<u64> {
    let result =
        sqlx::query("UPDATE staff_roles SET order_idx = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(order_idx)
            .execute(db)
            .await?;

    Ok(result.rows_affected())
}

pub async fn delete(pool: &Db, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM staff_roles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
