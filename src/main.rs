//! mediafetch server binary
//!
//! Reads configuration from the environment, ensures the output directory
//! exists, and serves the HTTP API until a termination signal arrives.

use mediafetch::{Config, api};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> mediafetch::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    // The output directory must exist before the first job writes into it and
    // before ServeDir starts serving it
    std::fs::create_dir_all(&config.output_dir)?;

    tracing::info!(
        output_dir = %config.output_dir.display(),
        auth = config.basic_auth.is_some(),
        "mediafetch starting"
    );

    api::start_api_server(Arc::new(config)).await
}
