use async_graphql::{
    dataloader::DataLoader, ComplexObject, Context, Enum, InputObject, Json, Result,
    SimpleObject, ID,
};
use chrono::{DateTime, Utc};

use crate::checks;
use crate::gql::common::helpers::parse_id;
use crate::gql::domains::users::types::User;
use crate::gql::error::ResultExt;
use crate::gql::loaders::UserLoader;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum FormFieldKind {
    ShortText,
    LongText,
    Number,
    Select,
    Checkbox,
}

impl From<checks::FormFieldKind> for FormFieldKind {
    fn from(kind: checks::FormFieldKind) -> Self {
        match kind {
            checks::FormFieldKind::ShortText => FormFieldKind::ShortText,
            checks::FormFieldKind::LongText => FormFieldKind::LongText,
            checks::FormFieldKind::Number => FormFieldKind::Number,
            checks::FormFieldKind::Select => FormFieldKind::Select,
            checks::FormFieldKind::Checkbox => FormFieldKind::Checkbox,
        }
    }
}

impl From<FormFieldKind> for checks::FormFieldKind {
    fn from(kind: FormFieldKind) -> Self {
        match kind {
            FormFieldKind::ShortText => checks::FormFieldKind::ShortText,
            FormFieldKind::LongText => checks::FormFieldKind::LongText,
            FormFieldKind::Number => checks::FormFieldKind::Number,
            FormFieldKind::Select => checks::FormFieldKind::Select,
            FormFieldKind::Checkbox => checks::FormFieldKind::Checkbox,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct FormField {
    pub id: String,
    pub label: String,
    pub kind: FormFieldKind,
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub options: Vec<String>,
}

impl From<checks::FormField> for FormField {
    fn from(field: checks::FormField) -> Self {
        Self {
            id: field.id,
            label: field.label,
            kind: field.kind.into(),
            required: field.required,
            min: field.min,
            max: field.max,
            options: field.options,
        }
    }
}

#[derive(InputObject, Clone)]
pub struct FormFieldInput {
    pub id: String,
    pub label: String,
    pub kind: FormFieldKind,
    #[graphql(default = false)]
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[graphql(default)]
    pub options: Vec<String>,
}

impl From<FormFieldInput> for checks::FormField {
    fn from(input: FormFieldInput) -> Self {
        Self {
            id: input.id,
            label: input.label,
            kind: input.kind.into(),
            required: input.required,
            min: input.min,
            max: input.max,
            options: input.options,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct Form {
    pub id: ID,
    pub tournament_id: Option<ID>,
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<FormField>,
    pub anonymous_responses: bool,
    pub closes_at: Option<DateTime<Utc>>,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<infra::models::FormRow> for Form {
    fn from(row: infra::models::FormRow) -> Self {
        let is_closed = row.is_closed();
        // Field definitions were validated on write; a malformed value reads
        // as an empty list.
        let fields: Vec<checks::FormField> =
            serde_json::from_value(row.fields).unwrap_or_default();

        Self {
            id: row.id.into(),
            tournament_id: row.tournament_id.map(Into::into),
            title: row.title,
            description: row.description,
            fields: fields.into_iter().map(FormField::from).collect(),
            anonymous_responses: row.anonymous_responses,
            closes_at: row.closes_at,
            is_closed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct FormResponse {
    pub id: ID,
    pub form_id: ID,
    pub user_id: Option<ID>,
    pub answers: Json<serde_json::Value>,
    pub submitted_at: DateTime<Utc>,
}

impl From<infra::models::FormResponseRow> for FormResponse {
    fn from(row: infra::models::FormResponseRow) -> Self {
        Self {
            id: row.id.into(),
            form_id: row.form_id.into(),
            user_id: row.user_id.map(Into::into),
            answers: Json(row.answers),
            submitted_at: row.submitted_at,
        }
    }
}

#[ComplexObject]
impl FormResponse {
    /// Absent for anonymous responses.
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(user_id) = &self.user_id else {
            return Ok(None);
        };

        let loader = ctx.data::<DataLoader<UserLoader>>()?;
        let user_id = parse_id(user_id, "user")?;

        let row = loader.load_one(user_id).await.db_err("Loading user failed")?;
        Ok(row.map(User::from))
    }
}

// Form input types

#[derive(InputObject)]
pub struct CreateFormInput {
    /// Absent for a site-wide form.
    pub tournament_id: Option<ID>,
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<FormFieldInput>,
    #[graphql(default = false)]
    pub anonymous_responses: bool,
    pub closes_at: Option<DateTime<Utc>>,
}

/// Partial update; absent fields keep their current values.
#[derive(InputObject)]
pub struct UpdateFormInput {
    pub id: ID,
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Option<Vec<FormFieldInput>>,
    pub anonymous_responses: Option<bool>,
    pub closes_at: Option<DateTime<Utc>>,
}
