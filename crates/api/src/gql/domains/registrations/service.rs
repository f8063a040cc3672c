//! Registration eligibility helpers.

use infra::models::{TournamentRow, UserRow};

/// Badge-weighted seeding rank: `rank ^ (0.9937 ^ (badges ^ 2))`, rounded to
/// the nearest integer. With no badges this is the raw rank; every badge
/// pulls the effective rank closer to #1.
pub fn bws_rank(global_rank: i32, badge_count: i32) -> i32 {
    let rank = f64::from(global_rank.max(1));
    let badges = badge_count.max(0);

    let exponent = 0.9937_f64.powi(badges.saturating_mul(badges));
    rank.powf(exponent).round() as i32
}

/// Why a user can't register, or `None` when they're eligible. Ban and
/// duplicate-registration checks need the database and stay in the resolver.
pub fn registration_block(tournament: &TournamentRow, user: &UserRow) -> Option<String> {
    if user.discord_user_id.is_none() {
        return Some("Link your Discord account before registering".into());
    }

    if !tournament.is_published() {
        return Some("This tournament isn't accepting registrations".into());
    }
    if !tournament.player_regs_open() {
        return Some("Player registrations are closed".into());
    }

    if let (Some(lower), Some(upper)) =
        (tournament.rank_range_lower, tournament.rank_range_upper)
    {
        let Some(rank) = user.global_rank else {
            return Some("This tournament has a rank range and your rank is unknown".into());
        };
        if rank < lower || rank > upper {
            return Some(format!(
                "Your rank (#{rank}) is outside this tournament's range (#{lower}-#{upper})"
            ));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn no_badges_keeps_the_raw_rank() {
        assert_eq!(bws_rank(1, 0), 1);
        assert_eq!(bws_rank(5000, 0), 5000);
        assert_eq!(bws_rank(123_456, 0), 123_456);
    }

    #[test]
    fn badges_only_ever_improve_the_rank() {
        let rank = 10_000;
        let mut previous = bws_rank(rank, 0);
        for badges in 1..=6 {
            let adjusted = bws_rank(rank, badges);
            assert!(adjusted <= previous, "badge {badges} made the rank worse");
            previous = adjusted;
        }
        assert!(previous < rank);
        // A heavily-badged player still can't drop below #1.
        assert!(bws_rank(50, 30) >= 1);
    }

    fn tournament() -> TournamentRow {
        TournamentRow {
            id: Uuid::new_v4(),
            name: "Spring Cup".into(),
            slug: "spring-cup".into(),
            acronym: "SC".into(),
            kind: "solo".into(),
            description: None,
            rules: None,
            rank_range_lower: None,
            rank_range_upper: None,
            team_size_min: None,
            team_size_max: None,
            use_bws: false,
            published_at: Some(Utc::now() - Duration::days(7)),
            staff_regs_open_at: None,
            staff_regs_close_at: None,
            player_regs_open_at: Some(Utc::now() - Duration::days(1)),
            player_regs_close_at: Some(Utc::now() + Duration::days(7)),
            concludes_at: None,
            links: json!([]),
            other_dates: json!([]),
            mod_multipliers: json!([]),
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(rank: Option<i32>) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            osu_user_id: 2,
            osu_username: "peppy".into(),
            discord_user_id: Some("1234".into()),
            discord_username: Some("peppy".into()),
            country_code: "AU".into(),
            global_rank: rank,
            badge_count: 0,
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn open_tournament_accepts_an_eligible_user() {
        assert!(registration_block(&tournament(), &user(Some(5000))).is_none());
    }

    #[test]
    fn discord_link_is_required() {
        let mut u = user(Some(5000));
        u.discord_user_id = None;
        assert!(registration_block(&tournament(), &u)
            .unwrap()
            .contains("Discord"));
    }

    #[test]
    fn closed_window_is_rejected() {
        let mut t = tournament();
        t.player_regs_close_at = Some(Utc::now() - Duration::hours(1));
        assert!(registration_block(&t, &user(Some(5000))).is_some());
    }

    #[test]
    fn rank_range_is_enforced() {
        let mut t = tournament();
        t.rank_range_lower = Some(1000);
        t.rank_range_upper = Some(10_000);

        assert!(registration_block(&t, &user(Some(5000))).is_none());
        assert!(registration_block(&t, &user(Some(500))).is_some());
        assert!(registration_block(&t, &user(Some(20_000))).is_some());
        assert!(registration_block(&t, &user(None)).is_some());
    }
}
