//! Authorization-guard coverage: every protected operation must refuse an
//! unauthenticated caller before touching the database. The test pool is
//! lazy, so a guard that leaks through to a query fails loudly with a
//! connection error instead of the expected message.

mod common;

use async_graphql::Variables;
use common::*;
use serde_json::json;

async fn assert_requires_login(query: &str, variables: serde_json::Value) {
    let schema = test_schema();

    let response = execute_graphql(
        &schema,
        query,
        Some(Variables::from_json(variables)),
        None,
    )
    .await;

    assert!(
        !response.errors.is_empty(),
        "expected a guard error for: {query}"
    );
    assert!(
        response.errors[0].message.contains("logged in"),
        "unexpected error for {query}: {}",
        response.errors[0].message
    );
}

#[tokio::test]
async fn create_tournament_requires_login() {
    assert_requires_login(
        r#"
        mutation CreateTournament($input: CreateTournamentInput!) {
            createTournament(input: $input) { id }
        }
        "#,
        json!({
            "input": {
                "name": "Osu World Cup 2025",
                "slug": "owc-2025",
                "acronym": "OWC25",
                "kind": "SOLO"
            }
        }),
    )
    .await;
}

#[tokio::test]
async fn register_player_requires_login() {
    assert_requires_login(
        r#"
        mutation Register($id: ID!) {
            registerPlayer(tournamentId: $id) { id }
        }
        "#,
        json!({ "id": "6e5d9ad1-7a2f-4b65-a0d5-8a9f61a8a2f7" }),
    )
    .await;
}

#[tokio::test]
async fn create_team_requires_login() {
    assert_requires_login(
        r#"
        mutation CreateTeam($input: CreateTeamInput!) {
            createTeam(input: $input) { id }
        }
        "#,
        json!({
            "input": {
                "tournamentId": "6e5d9ad1-7a2f-4b65-a0d5-8a9f61a8a2f7",
                "name": "mouse only"
            }
        }),
    )
    .await;
}

#[tokio::test]
async fn send_invite_requires_login() {
    assert_requires_login(
        r#"
        mutation SendInvite($input: SendInviteInput!) {
            sendInvite(input: $input) { id }
        }
        "#,
        json!({
            "input": {
                "tournamentId": "6e5d9ad1-7a2f-4b65-a0d5-8a9f61a8a2f7",
                "toUserId": "0b0f7a94-5a1e-4a77-bf3e-2f0f6ea2b7c1",
                "kind": "STAFF_JOIN"
            }
        }),
    )
    .await;
}

#[tokio::test]
async fn issue_ban_requires_login() {
    assert_requires_login(
        r#"
        mutation IssueBan($input: IssueBanInput!) {
            issueBan(input: $input) { id }
        }
        "#,
        json!({
            "input": {
                "userId": "0b0f7a94-5a1e-4a77-bf3e-2f0f6ea2b7c1",
                "reason": "multi-accounting"
            }
        }),
    )
    .await;
}

#[tokio::test]
async fn notify_staff_requires_login() {
    assert_requires_login(
        r#"
        mutation Notify($input: NotifyInput!) {
            notifyStaff(input: $input)
        }
        "#,
        json!({
            "input": {
                "tournamentId": "6e5d9ad1-7a2f-4b65-a0d5-8a9f61a8a2f7",
                "message": "Mappool is out!"
            }
        }),
    )
    .await;
}

#[tokio::test]
async fn submit_form_response_requires_login() {
    assert_requires_login(
        r#"
        mutation Submit($id: ID!, $answers: JSON!) {
            submitFormResponse(formId: $id, answers: $answers) { id }
        }
        "#,
        json!({
            "id": "6e5d9ad1-7a2f-4b65-a0d5-8a9f61a8a2f7",
            "answers": {}
        }),
    )
    .await;
}

#[tokio::test]
async fn unlink_discord_requires_login() {
    assert_requires_login(
        "mutation { unlinkDiscord { id } }",
        json!({}),
    )
    .await;
}

#[tokio::test]
async fn mark_all_read_requires_login() {
    assert_requires_login(
        "mutation { markAllNotificationsRead }",
        json!({}),
    )
    .await;
}

#[tokio::test]
async fn personal_queries_require_login() {
    for query in [
        "{ me { id } }",
        "{ myInvites { totalCount } }",
        "{ myNotifications { totalCount } }",
        "{ unreadNotificationCount }",
        "{ myActiveBan { id } }",
    ] {
        assert_requires_login(query, json!({})).await;
    }
}

#[tokio::test]
async fn admin_queries_require_login() {
    for query in [
        "{ users { totalCount } }",
        "{ bans { totalCount } }",
    ] {
        assert_requires_login(query, json!({})).await;
    }
}

#[tokio::test]
async fn introspection_is_disabled_by_default() {
    std::env::remove_var("GQL_INTROSPECTION");
    let schema = test_schema();

    let response =
        execute_graphql(&schema, "{ __schema { types { name } } }", None, None).await;

    assert!(!response.errors.is_empty());
}

#[tokio::test]
async fn schema_builds_with_every_domain_merged() {
    let schema = test_schema();
    let sdl = schema.sdl();

    for needle in [
        "createTournament",
        "registerPlayer",
        "sendInvite",
        "issueBan",
        "notifyPlayers",
        "submitFormResponse",
        "myNotifications",
        "setModpools",
    ] {
        assert!(sdl.contains(needle), "schema is missing {needle}");
    }
}
