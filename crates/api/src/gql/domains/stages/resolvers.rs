use async_graphql::{Context, Error, Object, Result, ID};

use crate::auth::permissions::require_staff;
use crate::auth::Permission;
use crate::checks;
use crate::gql::common::helpers::{get_round, get_stage, parse_id, tournament_id_for_round};
use crate::gql::types::{
    CreateRoundInput, CreateStageInput, Modpool, ModpoolInput, Round, Stage, UpdateRoundInput,
    UpdateStageInput,
};
use crate::state::AppState;
use infra::repos::{
    modpools, rounds, stages,
    rounds::{CreateRoundData, UpdateRoundData},
    stages::{CreateStageData, UpdateStageData},
};

#[derive(Default)]
pub struct StageQuery;

#[Object]
impl StageQuery {
    /// All stages of a tournament in display order.
    async fn stages(&self, ctx: &Context<'_>, tournament_id: ID) -> Result<Vec<Stage>> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&tournament_id, "tournament")?;

        let rows = stages::list_by_tournament(&state.db, tournament_id).await?;
        Ok(rows.into_iter().map(Stage::from).collect())
    }
}

#[derive(Default)]
pub struct StageMutation;

#[Object]
impl StageMutation {
    async fn create_stage(&self, ctx: &Context<'_>, input: CreateStageInput) -> Result<Stage> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&input.tournament_id, "tournament")?;

        require_staff(ctx, tournament_id, &[Permission::ManageTournament]).await?;

        if input.label.trim().is_empty() || input.label.len() > 40 {
            return Err(Error::new("Stage labels must be 1-40 characters"));
        }

        let existing = stages::list_by_tournament(&state.db, tournament_id).await?;
        if existing
            .iter()
            .any(|stage| stage.label.eq_ignore_ascii_case(&input.label))
        {
            return Err(Error::new("A stage with this label already exists"));
        }

        // Making the new stage the main one displaces the previous main stage.
        let mut tx = state.db.begin().await?;
        if input.is_main {
            stages::clear_main(&mut *tx, tournament_id).await?;
        }

        let stage = stages::create(
            &mut *tx,
            CreateStageData {
                tournament_id,
                label: input.label,
                format: input.format.into(),
                is_main: input.is_main,
            },
        )
        .await?;

        tx.commit().await?;

        Ok(stage.into())
    }

    async fn update_stage(&self, ctx: &Context<'_>, input: UpdateStageInput) -> Result<Stage> {
        let state = ctx.data::<AppState>()?;
        let stage_id = parse_id(&input.id, "stage")?;

        let current = get_stage(&state.db, stage_id).await?;
        require_staff(ctx, current.tournament_id, &[Permission::ManageTournament]).await?;

        let label = input.label.unwrap_or(current.label);
        if label.trim().is_empty() || label.len() > 40 {
            return Err(Error::new("Stage labels must be 1-40 characters"));
        }

        let siblings = stages::list_by_tournament(&state.db, current.tournament_id).await?;
        if siblings
            .iter()
            .any(|stage| stage.id != stage_id && stage.label.eq_ignore_ascii_case(&label))
        {
            return Err(Error::new("A stage with this label already exists"));
        }

        let format = input
            .format
            .map(String::from)
            .unwrap_or(current.format);

        let updated = stages::update(&state.db, stage_id, UpdateStageData { label, format })
            .await?
            .ok_or_else(|| Error::new("Stage not found"))?;

        Ok(updated.into())
    }

    /// Mark a stage as the tournament's main stage.
    async fn set_main_stage(&self, ctx: &Context<'_>, id: ID) -> Result<Stage> {
        let state = ctx.data::<AppState>()?;
        let stage_id = parse_id(&id, "stage")?;

        let stage = get_stage(&state.db, stage_id).await?;
        require_staff(ctx, stage.tournament_id, &[Permission::ManageTournament]).await?;

        let mut tx = state.db.begin().await?;
        stages::clear_main(&mut *tx, stage.tournament_id).await?;
        let updated = stages::set_main(&mut *tx, stage_id)
            .await?
            .ok_or_else(|| Error::new("Stage not found"))?;
        tx.commit().await?;

        Ok(updated.into())
    }

    /// Swap the display order of two stages of the same tournament.
    async fn swap_stage_order(&self, ctx: &Context<'_>, first: ID, second: ID) -> Result<Vec<Stage>> {
        let state = ctx.data::<AppState>()?;
        let first_id = parse_id(&first, "stage")?;
        let second_id = parse_id(&second, "stage")?;

        let first_stage = get_stage(&state.db, first_id).await?;
        let second_stage = get_stage(&state.db, second_id).await?;

        if first_stage.tournament_id != second_stage.tournament_id {
            return Err(Error::new("Stages belong to different tournaments"));
        }

        require_staff(
            ctx,
            first_stage.tournament_id,
            &[Permission::ManageTournament],
        )
        .await?;

        let mut tx = state.db.begin().await?;
        stages::set_order(&mut *tx, first_id, second_stage.order_idx).await?;
        stages::set_order(&mut *tx, second_id, first_stage.order_idx).await?;
        tx.commit().await?;

        let rows = stages::list_by_tournament(&state.db, first_stage.tournament_id).await?;
        Ok(rows.into_iter().map(Stage::from).collect())
    }

    async fn delete_stage(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let stage_id = parse_id(&id, "stage")?;

        let stage = get_stage(&state.db, stage_id).await?;
        require_staff(ctx, stage.tournament_id, &[Permission::ManageTournament]).await?;

        Ok(stages::delete(&state.db, stage_id).await? > 0)
    }

    async fn create_round(&self, ctx: &Context<'_>, input: CreateRoundInput) -> Result<Round> {
        let state = ctx.data::<AppState>()?;
        let stage_id = parse_id(&input.stage_id, "stage")?;

        let stage = get_stage(&state.db, stage_id).await?;
        require_staff(ctx, stage.tournament_id, &[Permission::ManagePoolStructure]).await?;

        if input.label.trim().is_empty() || input.label.len() > 40 {
            return Err(Error::new("Round labels must be 1-40 characters"));
        }

        let siblings = rounds::list_by_stage(&state.db, stage_id).await?;
        if siblings
            .iter()
            .any(|round| round.label.eq_ignore_ascii_case(&input.label))
        {
            return Err(Error::new("A round with this label already exists"));
        }

        let round = rounds::create(
            &state.db,
            CreateRoundData {
                stage_id,
                label: input.label,
                target_star_rating: input.target_star_rating,
                starts_at: input.starts_at,
            },
        )
        .await?;

        Ok(round.into())
    }

    /// Update a round, including its publication flags.
    async fn update_round(&self, ctx: &Context<'_>, input: UpdateRoundInput) -> Result<Round> {
        let state = ctx.data::<AppState>()?;
        let round_id = parse_id(&input.id, "round")?;

        let current = get_round(&state.db, round_id).await?;
        let tournament_id = tournament_id_for_round(&state.db, round_id).await?;
        require_staff(ctx, tournament_id, &[Permission::ManagePoolStructure]).await?;

        let label = input.label.unwrap_or(current.label);
        if label.trim().is_empty() || label.len() > 40 {
            return Err(Error::new("Round labels must be 1-40 characters"));
        }

        let mappool_published = input.mappool_published.unwrap_or(current.mappool_published);
        // An empty pool structure can't be published.
        if mappool_published && !current.mappool_published {
            let pools = modpools::list_by_round(&state.db, round_id).await?;
            if pools.is_empty() {
                return Err(Error::new(
                    "This round has no modpools; add them before publishing",
                ));
            }
        }

        let updated = rounds::update(
            &state.db,
            round_id,
            UpdateRoundData {
                label,
                target_star_rating: input.target_star_rating.or(current.target_star_rating),
                mappool_published,
                schedules_published: input
                    .schedules_published
                    .unwrap_or(current.schedules_published),
                starts_at: input.starts_at.or(current.starts_at),
            },
        )
        .await?
        .ok_or_else(|| Error::new("Round not found"))?;

        Ok(updated.into())
    }

    async fn delete_round(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let round_id = parse_id(&id, "round")?;

        let tournament_id = tournament_id_for_round(&state.db, round_id).await?;
        require_staff(ctx, tournament_id, &[Permission::ManagePoolStructure]).await?;

        Ok(rounds::delete(&state.db, round_id).await? > 0)
    }

    /// Replace a round's modpool list atomically.
    async fn set_modpools(
        &self,
        ctx: &Context<'_>,
        round_id: ID,
        pools: Vec<ModpoolInput>,
    ) -> Result<Vec<Modpool>> {
        let state = ctx.data::<AppState>()?;
        let round_id = parse_id(&round_id, "round")?;

        let tournament_id = tournament_id_for_round(&state.db, round_id).await?;
        require_staff(ctx, tournament_id, &[Permission::ManagePoolStructure]).await?;

        let proposed: Vec<(String, i32)> = pools
            .iter()
            .map(|pool| (pool.category.clone(), pool.map_count))
            .collect();
        if let Some(message) = checks::modpools(&proposed) {
            return Err(Error::new(message));
        }

        let mut tx = state.db.begin().await?;
        modpools::delete_by_round(&mut *tx, round_id).await?;

        let mut created = Vec::with_capacity(pools.len());
        for pool in &pools {
            created.push(modpools::insert(&mut *tx, round_id, &pool.category, pool.map_count).await?);
        }
        tx.commit().await?;

        Ok(created.into_iter().map(Modpool::from).collect())
    }
}
