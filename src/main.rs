use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    middleware::from_fn,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gatekeepers_admin::config;
use gatekeepers_admin::database::DatabaseManager;
use gatekeepers_admin::handlers;
use gatekeepers_admin::middleware::require_admin;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, CLOUDINARY_*
    let _ = dotenvy::dotenv();

    let config = config::config();

    let default_filter = if config.api.enable_request_logging {
        "info,tower_http=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    info!("Starting Gatekeepers admin API in {:?} mode", config.environment);
    if config.security.jwt_secret.is_empty() {
        warn!("JWT_SECRET is not set; logins and admin routes will fail");
    } else if gatekeepers_admin::is_development!() && std::env::var("JWT_SECRET").is_err() {
        warn!("JWT_SECRET is not set; signing tokens with the development secret");
    }
    if !config.media.is_configured() {
        warn!("CLOUDINARY_* credentials are not set; image uploads will fail");
    }

    // Migrate in the background so /health answers while the database is down
    tokio::spawn(async {
        if let Err(e) = DatabaseManager::migrate().await {
            warn!("Database migrations not applied: {}", e);
        }
    });

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    info!("Gatekeepers admin API listening on http://{}", bind_addr);

    axum::serve(listener, app())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server");

    DatabaseManager::close().await;
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Admin only
        .merge(admin_routes())
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer())
                .layer(DefaultBodyLimit::max(config::config().api.max_request_size_bytes)),
        )
}

fn auth_public_routes() -> Router {
    use handlers::public::auth;

    Router::new().route("/api/auth/login", post(auth::auth_login))
}

fn admin_routes() -> Router {
    use handlers::protected as admin;

    Router::new()
        .route("/api/auth/whoami", get(admin::session_whoami))
        .route("/api/games", get(admin::games_list).post(admin::games_create))
        .route(
            "/api/games/:id",
            get(admin::game_get).put(admin::game_put).delete(admin::game_delete),
        )
        .route("/api/upload", post(admin::upload_post))
        // route_layer so unknown paths still answer 404 rather than 401
        .route_layer(from_fn(require_admin))
}

fn cors_layer() -> CorsLayer {
    if gatekeepers_admin::is_development!() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Gatekeepers Admin API",
            "version": version,
            "endpoints": {
                "health": "/health (public)",
                "login": "POST /api/auth/login (public - token acquisition)",
                "whoami": "GET /api/auth/whoami (admin)",
                "games": "/api/games[/:id] (admin)",
                "upload": "POST /api/upload (admin)",
            }
        }
    }))
}

async fn health() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
