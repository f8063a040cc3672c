use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl,
    Scope, TokenResponse, TokenUrl,
};
use oauth2::{AsyncHttpClient, HttpClientError, HttpResponse};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

use crate::auth::AuthConfig;
use crate::error::AppError;
use infra::repos::users::OsuIdentity;

/// Wrapper around reqwest 0.13 Client that implements oauth2's AsyncHttpClient trait.
/// oauth2 5.0 bundles its own reqwest 0.12 integration, but since we use reqwest 0.13,
/// we need a bridge implementation.
#[derive(Clone)]
struct OAuth2HttpClient(reqwest::Client);

impl<'c> AsyncHttpClient<'c> for OAuth2HttpClient {
    type Error = HttpClientError<reqwest::Error>;
    type Future =
        Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + Send + Sync + 'c>>;

    fn call(&'c self, request: oauth2::HttpRequest) -> Self::Future {
        Box::pin(async move {
            let method = request.method().clone();
            let url = request.uri().to_string();

            let mut req_builder = self.0.request(method, &url);
            for (name, value) in request.headers().iter() {
                req_builder = req_builder.header(name, value);
            }
            req_builder = req_builder.body(request.into_body());

            let response = req_builder.send().await.map_err(Box::new)?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(Box::new)?.to_vec();

            let mut builder = axum::http::Response::builder().status(status);
            for (name, value) in headers.iter() {
                builder = builder.header(name, value);
            }

            builder.body(body).map_err(HttpClientError::Http)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Osu,
    Discord,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Osu => "osu",
            OAuthProvider::Discord => "discord",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "osu" => Some(OAuthProvider::Osu),
            "discord" => Some(OAuthProvider::Discord),
            _ => None,
        }
    }

    fn auth_url(&self) -> &'static str {
        match self {
            OAuthProvider::Osu => "https://osu.ppy.sh/oauth/authorize",
            OAuthProvider::Discord => "https://discord.com/oauth2/authorize",
        }
    }

    fn token_url(&self) -> &'static str {
        match self {
            OAuthProvider::Osu => "https://osu.ppy.sh/oauth/token",
            OAuthProvider::Discord => "https://discord.com/api/oauth2/token",
        }
    }

    fn scope(&self) -> &'static str {
        match self {
            OAuthProvider::Osu => "identify public",
            OAuthProvider::Discord => "identify",
        }
    }
}

// osu! /api/v2/me/osu response, reduced to the fields we keep.

#[derive(Debug, Serialize, Deserialize)]
pub struct OsuMe {
    pub id: i32,
    pub username: String,
    pub country: OsuCountry,
    #[serde(default)]
    pub statistics: Option<OsuStatistics>,
    #[serde(default)]
    pub badges: Vec<OsuBadge>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OsuCountry {
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OsuStatistics {
    pub global_rank: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OsuBadge {
    pub description: String,
}

impl From<OsuMe> for OsuIdentity {
    fn from(me: OsuMe) -> Self {
        Self {
            osu_user_id: me.id,
            osu_username: me.username,
            country_code: me.country.code,
            global_rank: me.statistics.and_then(|stats| stats.global_rank),
            badge_count: me.badges.len() as i32,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
}

#[derive(Clone)]
pub struct OAuthService {
    config: AuthConfig,
    http_client: reqwest::Client,
    oauth2_client: OAuth2HttpClient,
}

impl OAuthService {
    pub fn new(config: AuthConfig) -> Self {
        let http_client = reqwest::Client::new();
        Self {
            config,
            oauth2_client: OAuth2HttpClient(http_client.clone()),
            http_client,
        }
    }

    fn client(
        &self,
        provider: OAuthProvider,
    ) -> Result<
        BasicClient<
            oauth2::EndpointSet,
            oauth2::EndpointNotSet,
            oauth2::EndpointNotSet,
            oauth2::EndpointNotSet,
            oauth2::EndpointSet,
        >,
        AppError,
    > {
        let (client_id, client_secret) = match provider {
            OAuthProvider::Osu => (
                self.config.osu_client_id.clone(),
                self.config.osu_client_secret.clone(),
            ),
            OAuthProvider::Discord => (
                self.config.discord_client_id.clone(),
                self.config.discord_client_secret.clone(),
            ),
        };

        let redirect_url = format!(
            "{}/auth/{}/callback",
            self.config.redirect_base_url,
            provider.as_str()
        );

        Ok(BasicClient::new(ClientId::new(client_id))
            .set_client_secret(ClientSecret::new(client_secret))
            .set_auth_uri(
                AuthUrl::new(provider.auth_url().to_string())
                    .map_err(|e| AppError::Internal(format!("Invalid auth URL: {}", e)))?,
            )
            .set_token_uri(
                TokenUrl::new(provider.token_url().to_string())
                    .map_err(|e| AppError::Internal(format!("Invalid token URL: {}", e)))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(redirect_url)
                    .map_err(|e| AppError::Internal(format!("Invalid redirect URL: {}", e)))?,
            ))
    }

    pub fn get_authorize_url(&self, provider: OAuthProvider) -> Result<(String, String), AppError> {
        let client = self.client(provider)?;

        let (auth_url, csrf_token) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(provider.scope().to_string()))
            .url();

        Ok((auth_url.to_string(), csrf_token.secret().clone()))
    }

    async fn exchange_code(
        &self,
        provider: OAuthProvider,
        code: String,
    ) -> Result<String, AppError> {
        let client = self.client(provider)?;

        let token = client
            .exchange_code(AuthorizationCode::new(code))
            .request_async(&self.oauth2_client)
            .await
            .map_err(|e| AppError::Internal(format!("Token exchange failed: {}", e)))?;

        Ok(token.access_token().secret().clone())
    }

    /// Full osu! login: exchange the code, then fetch the caller's identity
    /// (username, country, rank, badges) from the osu! API.
    pub async fn exchange_osu(&self, code: String) -> Result<OsuIdentity, AppError> {
        let access_token = self.exchange_code(OAuthProvider::Osu, code).await?;

        let me = self
            .fetch_json::<OsuMe>("https://osu.ppy.sh/api/v2/me/osu", &access_token)
            .await?;

        Ok(me.into())
    }

    /// Discord account linking: exchange the code, then fetch the Discord user.
    pub async fn exchange_discord(&self, code: String) -> Result<DiscordUser, AppError> {
        let access_token = self.exchange_code(OAuthProvider::Discord, code).await?;

        self.fetch_json::<DiscordUser>("https://discord.com/api/users/@me", &access_token)
            .await
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, AppError> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch user info: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "Failed to fetch user info: {}",
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse user info: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osu_me_maps_to_identity() {
        let me: OsuMe = serde_json::from_value(serde_json::json!({
            "id": 124493,
            "username": "Cookiezi",
            "country": {"code": "KR"},
            "statistics": {"global_rank": 812},
            "badges": [
                {"description": "osu! World Cup 2015 winner"},
                {"description": "Contest winner"}
            ]
        }))
        .unwrap();

        let identity: OsuIdentity = me.into();
        assert_eq!(identity.osu_user_id, 124493);
        assert_eq!(identity.country_code, "KR");
        assert_eq!(identity.global_rank, Some(812));
        assert_eq!(identity.badge_count, 2);
    }

    #[test]
    fn osu_me_tolerates_missing_statistics() {
        let me: OsuMe = serde_json::from_value(serde_json::json!({
            "id": 2,
            "username": "peppy",
            "country": {"code": "AU"}
        }))
        .unwrap();

        let identity: OsuIdentity = me.into();
        assert_eq!(identity.global_rank, None);
        assert_eq!(identity.badge_count, 0);
    }
}
