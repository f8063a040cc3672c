use chrono::{DateTime, Utc};
use sqlx::Result;
use uuid::Uuid;

use crate::db::Db;
use crate::models::{FormResponseRow, FormRow};
use crate::pagination::LimitOffset;

const FORM_COLUMNS: &str = "id, tournament_id, title, description, fields, \
     anonymous_responses, closes_at, deleted_at, created_at, updated_at";

const RESPONSE_COLUMNS: &str = "id, form_id, user_id, answers, submitted_at";

#[derive(Debug, Clone)]
pub struct CreateFormData {
    pub tournament_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub fields: serde_json::Value,
    pub anonymous_responses: bool,
    pub closes_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct UpdateFormData {
    pub title: String,
    pub description: Option<String>,
    pub fields: serde_json::Value,
    pub anonymous_responses: bool,
    pub closes_at: Option<DateTime<Utc>>,
}

pub async fn get_by_id(pool: &Db, id: Uuid) -> Result<Option<FormRow>> {
    sqlx::query_as::<_, FormRow>(&format!(
        "SELECT {FORM_COLUMNS} FROM forms WHERE id = $1 AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn list_by_tournament(pool: &Db, tournament_id: Uuid) -> Result<Vec<FormRow>> {
    sqlx::query_as::<_, FormRow>(&format!(
        "SELECT {FORM_COLUMNS} FROM forms WHERE tournament_id = $1 AND deleted_at IS NULL ORDER BY created_at DESC"
    ))
    .bind(tournament_id)
    .fetch_all(pool)
    .await
}

/// Forms not tied to any tournament (site-wide surveys).
pub async fn list_global(pool: &Db) -> Result<Vec<FormRow>> {
    sqlx::query_as::<_, FormRow>(&format!(
        "SELECT {FORM_COLUMNS} FROM forms WHERE tournament_id IS NULL AND deleted_at IS NULL ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn create(pool: &Db, data: CreateFormData) -> Result<FormRow> {
    sqlx::query_as::<_, FormRow>(&format!(
        r#"
        INSERT INTO forms (tournament_id, title, description, fields, anonymous_responses, closes_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {FORM_COLUMNS}
        "#
    ))
    .bind(data.tournament_id)
    .bind(data.title)
    .bind(data.description)
    .bind(data.fields)
    .bind(data.anonymous_responses)
    .bind(data.closes_at)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &Db, id: Uuid, data: UpdateFormData) -> Result<Option<FormRow>> {
    sqlx::query_as::<_, FormRow>(&format!(
        r#"
        UPDATE forms
        SET title = $2, description = $3, fields = $4, anonymous_responses = $5,
            closes_at = $6, updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {FORM_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(data.title)
    .bind(data.description)
    .bind(data.fields)
    .bind(data.anonymous_responses)
    .bind(data.closes_at)
    .fetch_optional(pool)
    .await
}

pub async fn soft_delete(pool: &Db, id: Uuid) -> Result<Option<FormRow>> {
    sqlx::query_as::<_, FormRow>(&format!(
        r#"
        UPDATE forms
        SET deleted_at = NOW(), updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {FORM_COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create_response(
    pool: &Db,
    form_id: Uuid,
    user_id: Option<Uuid>,
    answers: serde_json::Value,
) -> Result<FormResponseRow> {
    sqlx::query_as::<_, FormResponseRow>(&format!(
        r#"
        INSERT INTO form_responses (form_id, user_id, answers)
        VALUES ($1, $2, $3)
        RETURNING {RESPONSE_COLUMNS}
        "#
    ))
    .bind(form_id)
    .bind(user_id)
    .bind(answers)
    .fetch_one(pool)
    .await
}

pub async fn list_responses(
    pool: &Db,
    form_id: Uuid,
    page: LimitOffset,
) -> Result<Vec<FormResponseRow>> {
    sqlx::query_as::<_, FormResponseRow>(&format!(
        r#"
        SELECT {RESPONSE_COLUMNS} FROM form_responses
        WHERE form_id = $1
        ORDER BY submitted_at DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(form_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await
}

pub async fn count_responses(pool: &Db, form_id: Uuid) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM form_responses WHERE form_id = $1")
        .bind(form_id)
        .fetch_one(pool)
        .await
}

/// Non-anonymous forms accept one response per user.
pub async fn user_has_response(pool: &Db, form_id: Uuid, user_id: Uuid) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM form_responses WHERE form_id = $1 AND user_id = $2",
    )
    .bind(form_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}
