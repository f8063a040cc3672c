use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::app::build_router;
use api::gql::build_schema;
use api::services::spawn_invite_reminder_service;
use api::state::AppState;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn env_or<T: std::str::FromStr>(name: &str, fallback: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(fallback)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let max_connections = env_or("DATABASE_MAX_CONNECTIONS", 30);
    let pool = infra::db::connect(&database_url, max_connections).await?;
    tracing::info!("Connected to Postgres with max {max_connections} connections");

    if env_or("SKIP_MIGRATIONS", false) {
        tracing::info!("Skipping database migrations (SKIP_MIGRATIONS=true)");
    } else {
        sqlx::migrate!("../../migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let state = AppState::new(pool)?;
    let schema = build_schema(state.clone());

    // Reminds recipients about invites that are about to lapse.
    let _reminder_handle = spawn_invite_reminder_service(state.clone());

    let app = build_router(state, schema);

    let port: u16 = env_or("PORT", 8080);
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
