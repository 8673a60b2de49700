use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use reelbox_api::auth::{self, AppState, AppStateInner};
use reelbox_api::middleware::require_admin;
use reelbox_api::{portal, recordings, uploads};
use reelbox_storage::{ObjectStore, S3ObjectStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelbox=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("REELBOX_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("REELBOX_DB_PATH").unwrap_or_else(|_| "reelbox.db".into());
    let host = std::env::var("REELBOX_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("REELBOX_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    let admin_email = std::env::var("REELBOX_ADMIN_EMAIL").ok();
    let admin_password = std::env::var("REELBOX_ADMIN_PASSWORD").ok();
    if admin_email.is_none() || admin_password.is_none() {
        warn!("REELBOX_ADMIN_EMAIL / REELBOX_ADMIN_PASSWORD unset; admin login is disabled");
    }

    // Init database
    let db = reelbox_db::Database::open(&PathBuf::from(&db_path))?;

    // Object storage is optional at startup; the operations that need it
    // surface the configuration error to the admin.
    let store: Option<Arc<dyn ObjectStore>> = match S3ObjectStore::from_env() {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            warn!("Object storage not configured: {}", e);
            None
        }
    };

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        store,
        jwt_secret,
        admin_email,
        admin_password,
    });

    // Routes
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/portal", get(portal::check_portal))
        .route("/recordings/{id}", get(recordings::get_recording))
        .route("/uploads", post(uploads::request_upload_target))
        .route("/recordings", post(uploads::commit_metadata))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/admin/portal/rotate", post(portal::rotate_portal))
        .route("/admin/recordings", get(recordings::list_recordings))
        .route(
            "/admin/recordings/{id}/renew",
            post(recordings::renew_recording),
        )
        .route(
            "/admin/recordings/{id}",
            delete(recordings::delete_recording),
        )
        .layer(from_fn_with_state(state.clone(), require_admin))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("reelbox server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /health — liveness check (no auth).
async fn health() -> &'static str {
    "OK"
}
