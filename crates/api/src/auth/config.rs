use anyhow::{Context, Result};
use std::env;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_expiration_minutes: u64,
    pub session_expiration_days: u64,
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    pub osu_client_id: String,
    pub osu_client_secret: String,
    pub discord_client_id: String,
    pub discord_client_secret: String,
    pub redirect_base_url: String,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_expiration_minutes: env::var("ACCESS_TOKEN_EXPIRATION_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap_or(15),
            session_expiration_days: env::var("SESSION_EXPIRATION_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            cookie_domain: env::var("COOKIE_DOMAIN").ok(),
            cookie_secure: env::var("COOKIE_SECURE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            osu_client_id: env::var("OSU_CLIENT_ID").unwrap_or_default(),
            osu_client_secret: env::var("OSU_CLIENT_SECRET").unwrap_or_default(),
            discord_client_id: env::var("DISCORD_CLIENT_ID").unwrap_or_default(),
            discord_client_secret: env::var("DISCORD_CLIENT_SECRET").unwrap_or_default(),
            redirect_base_url: env::var("REDIRECT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
        })
    }
}
