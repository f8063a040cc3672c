use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::auth::cookie::{build_clear_cookie, build_session_cookie, extract_session_token};
use crate::auth::OAuthProvider;
use crate::error::AppError;
use crate::state::AppState;
use infra::models::UserRow;
use infra::repos::{bans, sessions, sessions::CreateSession, users};

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: String,
}

#[derive(Serialize)]
pub struct AuthorizeResponse {
    pub auth_url: String,
    pub csrf_token: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserRow,
}

fn parse_provider(provider: &str) -> Result<OAuthProvider, AppError> {
    OAuthProvider::parse(provider)
        .ok_or_else(|| AppError::BadRequest("Invalid OAuth provider".to_string()))
}

pub async fn authorize(
    State(state): State<AppState>,
    Path(provider_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let provider = parse_provider(&provider_str)?;

    let (auth_url, csrf_token) = state.oauth_service().get_authorize_url(provider)?;

    Ok(Json(AuthorizeResponse {
        auth_url,
        csrf_token,
    }))
}

pub async fn callback(
    State(state): State<AppState>,
    Path(provider_str): Path<String>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Result<impl IntoResponse, AppError> {
    match parse_provider(&provider_str)? {
        OAuthProvider::Osu => osu_callback(state, headers, query.code).await,
        OAuthProvider::Discord => discord_callback(state, headers, query.code).await,
    }
}

/// osu! is the primary login: upsert the account from the osu! identity,
/// refuse banned users, open a session and hand out an access token.
async fn osu_callback(
    state: AppState,
    headers: HeaderMap,
    code: String,
) -> Result<axum::response::Response, AppError> {
    let identity = state.oauth_service().exchange_osu(code).await?;

    let user = users::upsert_osu(&state.db, identity).await?;

    if let Some(ban) = bans::get_active_for_user(&state.db, user.id).await? {
        return Err(AppError::Forbidden(format!(
            "Your account is banned: {}",
            ban.reason
        )));
    }

    let config = state.auth_config();
    let raw_token = generate_session_token();
    let expires_at = Utc::now() + Duration::days(config.session_expiration_days as i64);

    sessions::create(
        &state.db,
        CreateSession {
            user_id: user.id,
            token_hash: hash_session_token(&raw_token),
            ip_address: client_ip(&headers),
            user_agent: client_user_agent(&headers),
            expires_at,
        },
    )
    .await?;

    let token = state
        .jwt_service()
        .create_token(user.id, user.osu_username.clone(), user.is_admin)?;

    let cookie = build_session_cookie(
        &raw_token,
        config.session_expiration_days * 24 * 60 * 60,
        &config.cookie_domain,
        config.cookie_secure,
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse { token, user }),
    )
        .into_response())
}

/// Discord links a second identity onto the caller's existing session; the
/// session cookie scopes to /auth, so the callback carries it.
async fn discord_callback(
    state: AppState,
    headers: HeaderMap,
    code: String,
) -> Result<axum::response::Response, AppError> {
    let session = session_from_headers(&state, &headers).await?;

    let discord_user = state.oauth_service().exchange_discord(code).await?;

    let user = users::link_discord(
        &state.db,
        session.user_id,
        &discord_user.id,
        &discord_user.username,
    )
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let token = state
        .jwt_service()
        .create_token(user.id, user.osu_username.clone(), user.is_admin)?;

    Ok(Json(AuthResponse { token, user }).into_response())
}

/// Rotate the session token and issue a fresh access token.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let session = session_from_headers(&state, &headers).await?;

    let user = users::get_by_id(&state.db, session.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Your account no longer exists".to_string()))?;

    if let Some(ban) = bans::get_active_for_user(&state.db, user.id).await? {
        return Err(AppError::Forbidden(format!(
            "Your account is banned: {}",
            ban.reason
        )));
    }

    let config = state.auth_config();
    let raw_token = generate_session_token();
    let expires_at = Utc::now() + Duration::days(config.session_expiration_days as i64);

    sessions::rotate(&state.db, session.id, &hash_session_token(&raw_token), expires_at)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session expired".to_string()))?;

    let token = state
        .jwt_service()
        .create_token(user.id, user.osu_username.clone(), user.is_admin)?;

    let cookie = build_session_cookie(
        &raw_token,
        config.session_expiration_days * 24 * 60 * 60,
        &config.cookie_domain,
        config.cookie_secure,
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse { token, user }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if let Some(raw_token) = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_session_token)
    {
        sessions::delete_by_token_hash(&state.db, &hash_session_token(&raw_token)).await?;
    }

    let config = state.auth_config();
    let cookie = build_clear_cookie(&config.cookie_domain, config.cookie_secure);

    Ok(([(header::SET_COOKIE, cookie)], Json(serde_json::json!({ "ok": true }))))
}

async fn session_from_headers(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<infra::models::SessionRow, AppError> {
    let raw_token = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_session_token)
        .ok_or_else(|| AppError::Unauthorized("No session cookie".to_string()))?;

    sessions::get_active(&state.db, &hash_session_token(&raw_token))
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session expired".to_string()))
}

fn generate_session_token() -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(rand::random::<[u8; 32]>())
}

/// Only the hash is stored; a database leak doesn't leak usable tokens.
fn hash_session_token(raw_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
}

fn client_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_tokens_are_unique_and_url_safe() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
        assert!(!a.contains('+') && !a.contains('/') && !a.contains('='));
    }

    #[test]
    fn token_hash_is_stable_hex() {
        let hash = hash_session_token("some-token");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_session_token("some-token"));
        assert_ne!(hash, hash_session_token("other-token"));
    }

    #[test]
    fn first_forwarded_ip_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.9"));
    }
}
