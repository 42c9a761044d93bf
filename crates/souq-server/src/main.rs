//! Binary entry point for the Souq offers server.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use souq_server::api::{self, AppState};
use souq_server::config::ServerConfig;
use souq_server::uploads::UploadStore;
use souq_store::OfferStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,souq_server=debug")),
        )
        .init();

    info!("Starting Souq offers server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------

    // Offer store (creates the offers document if missing)
    let offers = Arc::new(OfferStore::open(&config.data_file).await?);

    // Upload store (creates the content directory if missing)
    let uploads = Arc::new(UploadStore::new(&config.upload_dir, config.max_image_size).await?);

    let http_addr = config.http_addr;
    let state = AppState {
        offers,
        uploads,
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
