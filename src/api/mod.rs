//! HTTP server module
//!
//! Wires the fetch endpoints, system endpoints, API documentation, and the
//! static file surfaces into one router, with optional HTTP Basic
//! authentication covering all of it.

use crate::{Config, Result};
use axum::{
    Router,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the router with all route definitions
///
/// # Routes
///
/// ## Fetch Jobs
/// - `POST /api/fetch` - Start a download job (JSON body), progress over SSE
/// - `GET /api/run` - Same via query parameters, for manual invocation
///
/// ## System
/// - `GET /api/health` - Health check
/// - `GET /api/openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive API documentation (if enabled)
///
/// ## Static
/// - `/downloads/*` - Produced files (read-only view of the output directory)
/// - `/assets/*` - Static assets
/// - `/*` - UI bundle (index.html at the root)
///
/// When Basic auth credentials are configured, every route above — including
/// the static surfaces — sits behind the authentication layer.
pub fn create_router(config: Arc<Config>) -> Router {
    let state = AppState::new(config.clone());

    let router = Router::new()
        // Fetch jobs
        .route("/api/fetch", post(routes::fetch_media))
        .route("/api/run", get(routes::run_media))
        // System
        .route("/api/health", get(routes::health_check))
        .route("/api/openapi.json", get(routes::openapi_spec));

    // Merge Swagger UI routes if enabled in config (before applying state).
    // Swagger serves its own copy of the spec; /api/openapi.json stays the
    // canonical endpoint.
    let router = if config.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    // Static surfaces: produced files, assets, and the UI bundle
    let router = router
        .nest_service("/downloads", ServeDir::new(&config.output_dir))
        .nest_service("/assets", ServeDir::new(&config.assets_dir))
        .fallback_service(ServeDir::new(&config.ui_dir));

    // Add state to all routes
    let router = router.with_state(state);

    // Apply the Basic auth middleware if credentials are configured; it wraps
    // the whole surface, static files included
    let router = if config.basic_auth.is_some() {
        router.layer(middleware::from_fn_with_state(
            config.basic_auth.clone(),
            auth::require_basic_auth,
        ))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

/// Start the HTTP server on the configured bind address.
///
/// Creates a TCP listener, binds it, and serves the router until a
/// termination signal arrives (graceful shutdown).
///
/// # Arguments
///
/// * `config` - Arc-wrapped Config built once at startup
///
/// # Returns
///
/// Returns a Result<()> that completes when the server stops, either due to
/// an error or graceful shutdown.
///
/// # Example
///
/// ```no_run
/// use mediafetch::Config;
/// use std::sync::Arc;
///
/// # async fn example() -> mediafetch::Result<()> {
/// let config = Arc::new(Config::from_env()?);
///
/// // Start the server (blocks until shutdown)
/// mediafetch::api::start_api_server(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(config: Arc<Config>) -> Result<()> {
    let bind_address = config.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting HTTP server"
    );

    // Create the router with all routes
    let app = create_router(config);

    // Bind TCP listener to the configured address
    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(crate::wait_for_signal())
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("Server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
