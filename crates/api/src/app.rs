use std::sync::Arc;
use std::time::Duration;

use async_graphql::{ObjectType, Schema, SubscriptionType};
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::{
    extract::{FromRequest, Request, State, WebSocketUpgrade},
    http::{
        header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::{Claims, JwtService};
use crate::error::AppError;
use crate::middleware::jwt::jwt_middleware;
use crate::routes::auth;
use crate::state::AppState;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Assemble the router: a health probe, the rate-limited auth surface, and
/// the GraphQL endpoint (POST for queries/mutations, WebSocket upgrade for
/// subscriptions).
pub fn build_router<Q, M, S>(state: AppState, schema: Schema<Q, M, S>) -> Router
where
    Q: ObjectType + Send + Sync + 'static,
    M: ObjectType + Send + Sync + 'static,
    S: SubscriptionType + Send + Sync + 'static,
{
    let graphql = Router::new().route(
        "/graphql",
        post({
            let schema = schema.clone();
            move |state, req| execute_graphql(state, req, schema)
        })
        .get({
            let schema = schema.clone();
            move |state, protocol, upgrade| subscribe_graphql(state, protocol, upgrade, schema)
        }),
    );

    Router::new()
        .route("/health", get(health))
        .merge(auth_router())
        .merge(graphql)
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, jwt_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(cors_layer())
}

/// OAuth + session routes, throttled to roughly 10 requests/minute per IP.
fn auth_router() -> Router<AppState> {
    let governor = GovernorConfigBuilder::default()
        .per_second(6)
        .burst_size(10)
        .finish()
        .unwrap();

    Router::new()
        .route("/auth/{provider}/authorize", get(auth::authorize))
        .route("/auth/{provider}/callback", get(auth::callback))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .layer(GovernorLayer::new(Arc::new(governor)))
}

fn cors_layer() -> CorsLayer {
    let allowed_origins =
        std::env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

/// Execute a GraphQL request with the caller's verified claims (left in the
/// request extensions by the JWT middleware) available to the resolvers.
async fn execute_graphql<Q, M, S>(
    State(state): State<AppState>,
    req: Request,
    schema: Schema<Q, M, S>,
) -> Result<Response, AppError>
where
    Q: ObjectType + Send + Sync + 'static,
    M: ObjectType + Send + Sync + 'static,
    S: SubscriptionType + Send + Sync + 'static,
{
    let claims = req.extensions().get::<Claims>().cloned();

    let gql_request = <GraphQLRequest as FromRequest<()>>::from_request(req, &())
        .await
        .map_err(|_| AppError::BadRequest("Invalid GraphQL request".to_string()))?
        .into_inner();

    let mut gql_request = gql_request.data(state);
    if let Some(claims) = claims {
        gql_request = gql_request.data(claims);
    }

    let response = schema.execute(gql_request).await;
    Ok(GraphQLResponse::from(response).into_response())
}

/// WebSocket subscriptions authenticate through the `connection_init`
/// payload instead of a header.
async fn subscribe_graphql<Q, M, S>(
    State(state): State<AppState>,
    protocol: GraphQLProtocol,
    upgrade: WebSocketUpgrade,
    schema: Schema<Q, M, S>,
) -> Response
where
    Q: ObjectType + Send + Sync + 'static,
    M: ObjectType + Send + Sync + 'static,
    S: SubscriptionType + Send + Sync + 'static,
{
    let jwt_service = state.jwt_service().clone();

    upgrade
        .protocols(["graphql-transport-ws", "graphql-ws"])
        .on_upgrade(move |stream| {
            GraphQLWebSocket::new(stream, schema, protocol)
                .on_connection_init(move |payload| {
                    let jwt_service = jwt_service.clone();
                    async move { ws_connection_data(&jwt_service, &payload) }
                })
                .serve()
        })
}

/// Build the per-connection context from the `connection_init` payload:
/// `connectionParams: { headers: { Authorization: "Bearer <token>" } }`.
fn ws_connection_data(
    jwt_service: &JwtService,
    payload: &serde_json::Value,
) -> async_graphql::Result<async_graphql::Data> {
    let mut data = async_graphql::Data::default();

    let token = payload
        .get("headers")
        .and_then(|headers| headers.get("Authorization"))
        .and_then(|value| value.as_str())
        .and_then(|value| value.strip_prefix("Bearer "));

    if let Some(token) = token {
        let claims = jwt_service
            .verify_token(token)
            .map_err(|_| async_graphql::Error::new("Invalid or expired token"))?;
        data.insert(claims);
    }

    Ok(data)
}

/// Liveness probe that also proves database connectivity.
async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    let _one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&state.db).await?;
    Ok("ok")
}
