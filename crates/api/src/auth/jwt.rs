use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthConfig;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub username: String,
    pub admin: bool,
    pub iat: i64, // Issued at
    pub exp: i64, // Expiration
}

impl Claims {
    pub fn new(user_id: Uuid, username: String, admin: bool, expiration_minutes: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::minutes(expiration_minutes as i64);

        Self {
            sub: user_id.to_string(),
            username,
            admin,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|e| AppError::Internal(format!("Invalid user ID in token: {}", e)))
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_minutes: u64,
}

impl JwtService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiration_minutes: config.access_token_expiration_minutes,
        }
    }

    pub fn create_token(
        &self,
        user_id: Uuid,
        username: String,
        admin: bool,
    ) -> Result<String, AppError> {
        let claims = Claims::new(user_id, username, admin, self.expiration_minutes);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-which-is-long-enough".into(),
            access_token_expiration_minutes: 15,
            session_expiration_days: 30,
            cookie_domain: None,
            cookie_secure: false,
            osu_client_id: String::new(),
            osu_client_secret: String::new(),
            discord_client_id: String::new(),
            discord_client_secret: String::new(),
            redirect_base_url: "http://localhost:8080".into(),
        }
    }

    #[test]
    fn token_round_trip() {
        let service = JwtService::new(&test_config());
        let user_id = Uuid::new_v4();

        let token = service
            .create_token(user_id, "peppy".into(), false)
            .unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.username, "peppy");
        assert!(!claims.admin);
    }

    #[test]
    fn tampered_token_rejected() {
        let service = JwtService::new(&test_config());
        let token = service
            .create_token(Uuid::new_v4(), "peppy".into(), true)
            .unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(service.verify_token(&tampered).is_err());
    }
}
