use async_graphql::{Context, Error, Object, Result, ID};

use crate::auth::permissions::{require_admin, require_host, require_staff};
use crate::auth::Permission;
use crate::checks;
use crate::gql::common::helpers::{get_tournament, parse_id};
use crate::gql::common::types::{PaginatedResponse, PaginationInput};
use crate::gql::error::ResultExt;
use crate::gql::types::{
    CreateTournamentInput, Tournament, TournamentKind, UpdateTournamentInput,
};
use crate::state::AppState;
use infra::repos::{
    staff_members, staff_roles, tournaments,
    staff_roles::CreateStaffRoleData,
    tournaments::{CreateTournamentData, TournamentFilter, UpdateTournamentData},
};

/// Slugs become URL path segments, so the charset is strict.
fn valid_slug(slug: &str) -> bool {
    (2..=32).contains(&slug.len())
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-')
}

#[derive(Default)]
pub struct TournamentQuery;

#[Object]
impl TournamentQuery {
    /// Get a tournament by its URL slug. Unpublished tournaments are only
    /// visible to their staff.
    async fn tournament(&self, ctx: &Context<'_>, slug: String) -> Result<Option<Tournament>> {
        let state = ctx.data::<AppState>()?;

        let Some(row) = tournaments::get_by_slug(&state.db, &slug).await? else {
            return Ok(None);
        };

        if !row.is_published() {
            require_staff(ctx, row.id, Permission::ALL).await?;
        }

        Ok(Some(row.into()))
    }

    /// List published tournaments with optional name/acronym search.
    async fn tournaments(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
        pagination: Option<PaginationInput>,
    ) -> Result<PaginatedResponse<Tournament>> {
        let state = ctx.data::<AppState>()?;

        let filter = TournamentFilter {
            search,
            include_unpublished: false,
        };

        let page = pagination.unwrap_or_default().to_limit_offset();

        let (rows, total_count) = tokio::try_join!(
            tournaments::list(&state.db, filter.clone(), page),
            tournaments::count(&state.db, filter)
        )
        .db_err("Database operation failed")?;

        let items: Vec<Tournament> = rows.into_iter().map(Tournament::from).collect();
        Ok(PaginatedResponse::new(items, total_count, page))
    }
}

#[derive(Default)]
pub struct TournamentMutation;

#[Object]
impl TournamentMutation {
    /// Create a tournament. The creator becomes its host: the tournament,
    /// its default staff roles and the host's membership are written in one
    /// transaction.
    async fn create_tournament(
        &self,
        ctx: &Context<'_>,
        input: CreateTournamentInput,
    ) -> Result<Tournament> {
        let user = require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        if input.name.trim().is_empty() || input.name.len() > 80 {
            return Err(Error::new("Tournament names must be 1-80 characters"));
        }
        if !valid_slug(&input.slug) {
            return Err(Error::new(
                "Slugs must be 2-32 characters of lowercase letters, digits and dashes",
            ));
        }
        if input.acronym.trim().is_empty() || input.acronym.len() > 12 {
            return Err(Error::new("Acronyms must be 1-12 characters"));
        }

        if input.kind.has_teams() {
            let (Some(min), Some(max)) = (input.team_size_min, input.team_size_max) else {
                return Err(Error::new(
                    "Team tournaments need minimum and maximum team sizes",
                ));
            };
            if let Some(message) = checks::team_size(min, max) {
                return Err(Error::new(message));
            }
        }
        if let Some(message) = checks::rank_range(input.rank_range_lower, input.rank_range_upper) {
            return Err(Error::new(message));
        }

        if tournaments::get_by_slug(&state.db, &input.slug).await?.is_some() {
            return Err(Error::new("A tournament with this slug already exists"));
        }

        let mut tx = state.db.begin().await?;

        let tournament = tournaments::create(
            &mut *tx,
            CreateTournamentData {
                name: input.name,
                slug: input.slug,
                acronym: input.acronym,
                kind: input.kind.into(),
                description: input.description,
                rank_range_lower: input.rank_range_lower,
                rank_range_upper: input.rank_range_upper,
                team_size_min: input.team_size_min.filter(|_| input.kind.has_teams()),
                team_size_max: input.team_size_max.filter(|_| input.kind.has_teams()),
                use_bws: input.use_bws,
            },
        )
        .await?;

        let host_role = staff_roles::create(
            &mut *tx,
            CreateStaffRoleData {
                tournament_id: tournament.id,
                name: "Host".to_string(),
                color: "red".to_string(),
                permissions: vec![Permission::Host.as_str().to_string()],
            },
        )
        .await?;

        staff_roles::create(
            &mut *tx,
            CreateStaffRoleData {
                tournament_id: tournament.id,
                name: "Debugger".to_string(),
                color: "gray".to_string(),
                permissions: vec![Permission::Debug.as_str().to_string()],
            },
        )
        .await?;

        let member = staff_members::create(&mut *tx, tournament.id, user.id).await?;
        staff_members::add_role(&mut *tx, member.id, host_role.id).await?;

        tx.commit().await?;

        Ok(tournament.into())
    }

    /// Update tournament settings. The partial input is merged into the
    /// current record and the full consistency check battery runs against the
    /// merged result.
    async fn update_tournament(
        &self,
        ctx: &Context<'_>,
        input: UpdateTournamentInput,
    ) -> Result<Tournament> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&input.id, "tournament")?;

        require_staff(ctx, tournament_id, &[Permission::ManageTournament]).await?;

        let current = get_tournament(&state.db, tournament_id).await?;
        let kind: TournamentKind = current.kind.clone().into();

        // Merge the proposed changes over the stored values.
        let name = input.name.unwrap_or(current.name);
        let acronym = input.acronym.unwrap_or(current.acronym);
        if name.trim().is_empty() || name.len() > 80 {
            return Err(Error::new("Tournament names must be 1-80 characters"));
        }
        if acronym.trim().is_empty() || acronym.len() > 12 {
            return Err(Error::new("Acronyms must be 1-12 characters"));
        }

        let (rank_range_lower, rank_range_upper) = match input.rank_range {
            Some(range) => (range.lower, range.upper),
            None => (current.rank_range_lower, current.rank_range_upper),
        };
        let (team_size_min, team_size_max) = match input.team_size {
            Some(size) => (Some(size.min), Some(size.max)),
            None => (current.team_size_min, current.team_size_max),
        };
        let (published_at, staff_open, staff_close, player_open, player_close, concludes_at) =
            match input.dates {
                Some(dates) => (
                    dates.published_at,
                    dates.staff_regs_open_at,
                    dates.staff_regs_close_at,
                    dates.player_regs_open_at,
                    dates.player_regs_close_at,
                    dates.concludes_at,
                ),
                None => (
                    current.published_at,
                    current.staff_regs_open_at,
                    current.staff_regs_close_at,
                    current.player_regs_open_at,
                    current.player_regs_close_at,
                    current.concludes_at,
                ),
            };

        let links: Vec<checks::TournamentLink> = match input.links {
            Some(links) => links.into_iter().map(Into::into).collect(),
            None => serde_json::from_value(current.links).unwrap_or_default(),
        };
        let other_dates: Vec<checks::DateWindow> = match input.other_dates {
            Some(windows) => windows.into_iter().map(Into::into).collect(),
            None => serde_json::from_value(current.other_dates).unwrap_or_default(),
        };
        let mod_multipliers: Vec<checks::ModMultiplier> = match input.mod_multipliers {
            Some(rules) => rules.into_iter().map(Into::into).collect(),
            None => serde_json::from_value(current.mod_multipliers).unwrap_or_default(),
        };

        // Consistency checks over the merged settings.
        if kind.has_teams() {
            let (Some(min), Some(max)) = (team_size_min, team_size_max) else {
                return Err(Error::new(
                    "Team tournaments need minimum and maximum team sizes",
                ));
            };
            if let Some(message) = checks::team_size(min, max) {
                return Err(Error::new(message));
            }
        }

        let failure = checks::rank_range(rank_range_lower, rank_range_upper)
            .or_else(|| {
                checks::date_order(&[
                    ("Publication", published_at),
                    ("Staff registrations opening", staff_open),
                    ("Staff registrations closing", staff_close),
                    ("Conclusion", concludes_at),
                ])
            })
            .or_else(|| {
                checks::date_order(&[
                    ("Publication", published_at),
                    ("Player registrations opening", player_open),
                    ("Player registrations closing", player_close),
                    ("Conclusion", concludes_at),
                ])
            })
            .or_else(|| checks::other_dates(&other_dates))
            .or_else(|| checks::links(&links))
            .or_else(|| checks::mod_multipliers(&mod_multipliers));

        if let Some(message) = failure {
            return Err(Error::new(message));
        }

        let updated = tournaments::update(
            &state.db,
            tournament_id,
            UpdateTournamentData {
                name,
                acronym,
                description: input.description.or(current.description),
                rules: input.rules.or(current.rules),
                rank_range_lower,
                rank_range_upper,
                team_size_min,
                team_size_max,
                use_bws: input.use_bws.unwrap_or(current.use_bws),
                published_at,
                staff_regs_open_at: staff_open,
                staff_regs_close_at: staff_close,
                player_regs_open_at: player_open,
                player_regs_close_at: player_close,
                concludes_at,
                links: serde_json::to_value(&links)?,
                other_dates: serde_json::to_value(&other_dates)?,
                mod_multipliers: serde_json::to_value(&mod_multipliers)?,
            },
        )
        .await?
        .ok_or_else(|| Error::new("Tournament not found"))?;

        Ok(updated.into())
    }

    /// Soft-delete a tournament. Host only.
    async fn delete_tournament(&self, ctx: &Context<'_>, id: ID) -> Result<Tournament> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&id, "tournament")?;

        require_host(ctx, tournament_id).await?;

        let deleted = tournaments::soft_delete(&state.db, tournament_id)
            .await?
            .ok_or_else(|| Error::new("Tournament not found"))?;

        Ok(deleted.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_charset() {
        assert!(valid_slug("owc-2024"));
        assert!(valid_slug("5wc"));
        assert!(!valid_slug("OWC"));
        assert!(!valid_slug("a"));
        assert!(!valid_slug("-owc"));
        assert!(!valid_slug("owc-"));
        assert!(!valid_slug("has spaces"));
    }
}
