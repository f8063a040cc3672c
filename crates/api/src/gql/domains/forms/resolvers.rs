use async_graphql::{Context, Error, Json, Object, Result, ID};
use uuid::Uuid;

use crate::auth::permissions::{require_admin, require_staff, require_user};
use crate::auth::Permission;
use crate::checks;
use crate::gql::common::helpers::parse_id;
use crate::gql::common::types::{PaginatedResponse, PaginationInput};
use crate::gql::error::ResultExt;
use crate::gql::types::{CreateFormInput, Form, FormResponse, UpdateFormInput};
use crate::state::AppState;
use infra::models::FormRow;
use infra::repos::{forms, forms::CreateFormData, forms::UpdateFormData};

fn valid_title(title: &str) -> bool {
    let trimmed = title.trim();
    !trimmed.is_empty() && trimmed.len() <= 80
}

async fn get_form(state: &AppState, id: Uuid) -> Result<FormRow> {
    forms::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::new("Form not found"))
}

/// Tournament forms are managed by staff with form rights; site-wide forms
/// by admins.
async fn require_form_manager(ctx: &Context<'_>, tournament_id: Option<Uuid>) -> Result<()> {
    match tournament_id {
        Some(tournament_id) => {
            require_staff(ctx, tournament_id, &[Permission::ManageForms]).await?;
        }
        None => {
            require_admin(ctx).await?;
        }
    }
    Ok(())
}

#[derive(Default)]
pub struct FormQuery;

#[Object]
impl FormQuery {
    async fn form(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Form>> {
        let state = ctx.data::<AppState>()?;
        let form_id = parse_id(&id, "form")?;

        Ok(forms::get_by_id(&state.db, form_id).await?.map(Form::from))
    }

    /// Forms of a tournament, or the site-wide forms when no tournament is
    /// given.
    async fn forms(&self, ctx: &Context<'_>, tournament_id: Option<ID>) -> Result<Vec<Form>> {
        let state = ctx.data::<AppState>()?;

        let rows = match tournament_id {
            Some(tournament_id) => {
                let tournament_id = parse_id(&tournament_id, "tournament")?;
                forms::list_by_tournament(&state.db, tournament_id).await?
            }
            None => forms::list_global(&state.db).await?,
        };

        Ok(rows.into_iter().map(Form::from).collect())
    }

    /// Submitted responses of a form. Restricted to whoever manages the form.
    async fn form_responses(
        &self,
        ctx: &Context<'_>,
        form_id: ID,
        pagination: Option<PaginationInput>,
    ) -> Result<PaginatedResponse<FormResponse>> {
        let state = ctx.data::<AppState>()?;
        let form_id = parse_id(&form_id, "form")?;

        let form = get_form(state, form_id).await?;
        require_form_manager(ctx, form.tournament_id).await?;

        let page = pagination.unwrap_or_default().to_limit_offset();

        let (rows, total_count) = tokio::try_join!(
            forms::list_responses(&state.db, form_id, page),
            forms::count_responses(&state.db, form_id)
        )
        .db_err("Database operation failed")?;

        let items: Vec<FormResponse> = rows.into_iter().map(FormResponse::from).collect();
        Ok(PaginatedResponse::new(items, total_count, page))
    }
}

#[derive(Default)]
pub struct FormMutation;

#[Object]
impl FormMutation {
    async fn create_form(&self, ctx: &Context<'_>, input: CreateFormInput) -> Result<Form> {
        let state = ctx.data::<AppState>()?;

        let tournament_id = input
            .tournament_id
            .as_ref()
            .map(|id| parse_id(id, "tournament"))
            .transpose()?;

        require_form_manager(ctx, tournament_id).await?;

        if !valid_title(&input.title) {
            return Err(Error::new("Form titles must be 1-80 characters"));
        }

        let fields: Vec<checks::FormField> =
            input.fields.into_iter().map(Into::into).collect();
        if let Some(message) = checks::form_fields(&fields) {
            return Err(Error::new(message));
        }

        let form = forms::create(
            &state.db,
            CreateFormData {
                tournament_id,
                title: input.title,
                description: input.description,
                fields: serde_json::to_value(&fields)?,
                anonymous_responses: input.anonymous_responses,
                closes_at: input.closes_at,
            },
        )
        .await?;

        Ok(form.into())
    }

    async fn update_form(&self, ctx: &Context<'_>, input: UpdateFormInput) -> Result<Form> {
        let state = ctx.data::<AppState>()?;
        let form_id = parse_id(&input.id, "form")?;

        let current = get_form(state, form_id).await?;
        require_form_manager(ctx, current.tournament_id).await?;

        let title = input.title.unwrap_or(current.title);
        if !valid_title(&title) {
            return Err(Error::new("Form titles must be 1-80 characters"));
        }

        let fields: Vec<checks::FormField> = match input.fields {
            Some(fields) => fields.into_iter().map(Into::into).collect(),
            None => serde_json::from_value(current.fields).unwrap_or_default(),
        };
        if let Some(message) = checks::form_fields(&fields) {
            return Err(Error::new(message));
        }

        let updated = forms::update(
            &state.db,
            form_id,
            UpdateFormData {
                title,
                description: input.description.or(current.description),
                fields: serde_json::to_value(&fields)?,
                anonymous_responses: input
                    .anonymous_responses
                    .unwrap_or(current.anonymous_responses),
                closes_at: input.closes_at.or(current.closes_at),
            },
        )
        .await?
        .ok_or_else(|| Error::new("Form not found"))?;

        Ok(updated.into())
    }

    /// Soft-delete a form; its responses stay queryable by staff.
    async fn delete_form(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let form_id = parse_id(&id, "form")?;

        let form = get_form(state, form_id).await?;
        require_form_manager(ctx, form.tournament_id).await?;

        Ok(forms::soft_delete(&state.db, form_id).await?.is_some())
    }

    /// Submit answers to an open form. Requires login even for anonymous
    /// forms; those just don't store who answered.
    async fn submit_form_response(
        &self,
        ctx: &Context<'_>,
        form_id: ID,
        answers: Json<serde_json::Value>,
    ) -> Result<FormResponse> {
        let user = require_user(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let form_id = parse_id(&form_id, "form")?;

        let form = get_form(state, form_id).await?;
        if form.is_closed() {
            return Err(Error::new("This form is no longer accepting responses"));
        }

        let serde_json::Value::Object(answer_map) = &answers.0 else {
            return Err(Error::new("Answers must be an object keyed by field id"));
        };

        let fields: Vec<checks::FormField> =
            serde_json::from_value(form.fields).unwrap_or_default();
        if let Some(message) = checks::form_answers(&fields, answer_map) {
            return Err(Error::new(message));
        }

        if !form.anonymous_responses
            && forms::user_has_response(&state.db, form_id, user.id).await?
        {
            return Err(Error::new("You have already responded to this form"));
        }

        let user_id = (!form.anonymous_responses).then_some(user.id);

        let response =
            forms::create_response(&state.db, form_id, user_id, answers.0).await?;

        Ok(response.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_bounds() {
        assert!(valid_title("Staff application"));
        assert!(!valid_title(" "));
        assert!(!valid_title(&"x".repeat(81)));
    }
}
