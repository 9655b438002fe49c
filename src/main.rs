mod core;
mod features;
mod modules;
mod shared;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use socket2::{Domain, Protocol, Socket, Type};
use sqlx::PgPool;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::Config;
use crate::core::database::create_pool;
use crate::core::middleware::{
    admin_middleware, auth_middleware, basic_auth_middleware, cors_layer, MakeRequestUuid,
    MakeSpanWithRequestId,
};
use crate::core::openapi::api_doc;
use crate::features::auth::clients::SlackAuthClient;
use crate::features::auth::gate::AuthGate;
use crate::features::auth::routes::AuthState;
use crate::features::auth::services::{AuthService, TokenService};
use crate::features::categories::routes::CategoriesState;
use crate::features::categories::services::CategoryService;
use crate::features::submissions::routes::SubmissionsState;
use crate::features::submissions::services::SubmissionService;
use crate::features::users::clients::SlackAvatarClient;
use crate::features::users::routes::UsersState;
use crate::features::users::services::UserService;
use crate::modules::storage::MinIOClient;
use crate::modules::view_cache::ViewCache;

/// Liveness and database reachability probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are up"),
        (status = 503, description = "Database unreachable")
    ),
    tag = "health"
)]
pub async fn health_check(State(pool): State<PgPool>) -> impl IntoResponse {
    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "healthy",
                "database": "connected",
            })),
        ),
        Err(e) => {
            tracing::error!("Health check database probe failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "database": "disconnected",
                })),
            )
        }
    }
}

/// Bind with SO_REUSEADDR and TCP_NODELAY so restarts do not stumble
/// over lingering sockets.
fn create_listener(addr: SocketAddr) -> anyhow::Result<std::net::TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;
    Ok(socket.into())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let storage = Arc::new(
        MinIOClient::new(config.minio.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize storage: {}", e))?,
    );
    storage
        .ensure_bucket_exists()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare storage bucket: {}", e))?;

    // Services share the one pool created above.
    let user_service = Arc::new(UserService::new(pool.clone()));
    let category_service = Arc::new(CategoryService::new(pool.clone()));
    let submission_service = Arc::new(SubmissionService::new(pool.clone()));

    let token_service = Arc::new(TokenService::new(&config.session));
    let gate = Arc::new(AuthGate::new(user_service.clone()));
    let cache = Arc::new(ViewCache::new());

    let slack_auth = Arc::new(SlackAuthClient::new(
        config.slack.client_id.clone(),
        config.slack.client_secret.clone(),
        config.slack.team_id.clone(),
    ));
    let auth_service = Arc::new(AuthService::new(
        slack_auth,
        user_service.clone(),
        token_service.clone(),
    ));
    let avatars = Arc::new(SlackAvatarClient::new(config.slack.avatar_token.clone()));

    let auth_state = AuthState {
        service: auth_service,
    };
    let categories_state = CategoriesState {
        service: category_service,
        cache: cache.clone(),
    };
    let submissions_state = SubmissionsState {
        service: submission_service,
        storage: storage.clone(),
        cache: cache.clone(),
        gate: gate.clone(),
        timezone: config.contest.timezone,
    };
    let users_state = UsersState {
        service: user_service,
        avatars,
        cache: cache.clone(),
    };

    let admin_router = Router::new()
        .merge(features::users::routes::admin_routes(users_state))
        .merge(features::categories::routes::admin_routes(
            categories_state.clone(),
        ))
        .merge(features::submissions::routes::admin_routes(
            submissions_state.clone(),
        ))
        .layer(axum_middleware::from_fn_with_state(
            gate.clone(),
            admin_middleware,
        ));

    let api_router = Router::new()
        .merge(features::auth::routes::protected_routes(auth_state.clone()))
        .merge(features::categories::routes::protected_routes(
            categories_state,
        ))
        .merge(features::submissions::routes::protected_routes(
            submissions_state,
        ))
        .nest("/admin", admin_router)
        .layer(axum_middleware::from_fn_with_state(
            token_service.clone(),
            auth_middleware,
        ))
        .merge(features::auth::routes::public_routes(auth_state));

    let swagger: Router = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", api_doc(&config.swagger))
        .into();
    let swagger = match config.swagger.credentials() {
        Some(credentials) => swagger.layer(axum_middleware::from_fn(basic_auth_middleware(
            Arc::new(credentials),
        ))),
        None => swagger,
    };

    let app = Router::new()
        .route("/health", get(health_check).with_state(pool.clone()))
        .nest("/api", api_router)
        .merge(swagger)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(MakeSpanWithRequestId))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors_layer(config.app.cors_allowed_origins.clone()));

    let addr: SocketAddr = config
        .app
        .server_address()
        .parse()
        .context("Invalid server address")?;
    let listener = tokio::net::TcpListener::from_std(create_listener(addr)?)?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
