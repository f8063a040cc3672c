use infra::db::Db;

use crate::auth::{AuthConfig, JwtService, OAuthService};

/// Shared per-process context; cheap to clone into handlers and resolvers.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    auth: AuthServices,
}

#[derive(Clone)]
struct AuthServices {
    config: AuthConfig,
    jwt: JwtService,
    oauth: OAuthService,
}

impl AppState {
    pub fn new(db: Db) -> anyhow::Result<Self> {
        let config = AuthConfig::from_env()?;
        let jwt = JwtService::new(&config);
        let oauth = OAuthService::new(config.clone());

        Ok(Self {
            db,
            auth: AuthServices { config, jwt, oauth },
        })
    }

    pub fn auth_config(&self) -> &AuthConfig {
        &self.auth.config
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.auth.jwt
    }

    pub fn oauth_service(&self) -> &OAuthService {
        &self.auth.oauth
    }
}
