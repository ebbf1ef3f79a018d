//! # mediafetch
//!
//! Self-hosted media download server: submit a URL over HTTP, follow the
//! downloader's progress over a live server-sent event stream, and receive a
//! public link to the produced file.
//!
//! ## Design Philosophy
//!
//! mediafetch is designed to be:
//! - **Stateless** - One job per request, owned by the request, never persisted
//! - **Event-driven** - Progress is pushed as it happens, no polling required
//! - **Contained** - Download links are only minted for files proven to live
//!   inside the configured output directory
//! - **Zero configuration** - Works out of the box; everything is tunable via
//!   environment variables
//!
//! ## Quick Start
//!
//! ```no_run
//! use mediafetch::{Config, api};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> mediafetch::Result<()> {
//!     let config = Arc::new(Config::from_env()?);
//!     std::fs::create_dir_all(&config.output_dir)?;
//!
//!     // Serve until SIGTERM/SIGINT
//!     api::start_api_server(config).await
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP server module
pub mod api;
/// Bridge between the external downloader process and the event stream
pub mod bridge;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Public download-link resolution
pub mod resolver;
/// Core types and events
pub mod types;
/// Pure helpers for job identity and input hygiene
pub mod utils;

// Re-export commonly used types
pub use config::{BasicAuthConfig, Config};
pub use error::{Error, Result};
pub use types::{Job, Mode, StreamEvent};

/// Wait for a termination signal (SIGTERM/SIGINT on unix, Ctrl+C elsewhere).
///
/// Signal registration can fail in restricted environments (containers,
/// tests); the Ctrl+C listener is the fallback.
#[cfg(unix)]
pub(crate) async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        _ => {
            tracing::warn!("Could not register unix signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
pub(crate) async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
    }
}
