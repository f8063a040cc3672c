pub mod config;
pub mod cookie;
pub mod jwt;
pub mod oauth;
pub mod permissions;

pub use config::AuthConfig;
pub use jwt::{Claims, JwtService};
pub use oauth::{OAuthProvider, OAuthService};
pub use permissions::{Permission, PermissionSet};
