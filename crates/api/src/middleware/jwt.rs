use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// Validate a bearer token, when one is presented, and stash the verified
/// claims in the request extensions for the GraphQL context. Requests without
/// an Authorization header pass through anonymously; the guards decide what
/// anonymous callers may do.
pub async fn jwt_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned);

    if let Some(token) = bearer {
        let claims = state
            .jwt_service()
            .verify_token(&token)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;
        request.extensions_mut().insert(claims);
    }

    Ok(next.run(request).await)
}
