//! tiraz-api - Tiraz tailoring backend
//!
//! Serves the catalog, measurement upload/processing and health endpoints.
//! Configuration comes from the environment (see `tiraz_common::config`);
//! `--host` / `--port` override the configured bind address.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tiraz_api::{build_router, AppState};
use tiraz_common::Settings;

#[derive(Debug, Parser)]
#[command(name = "tiraz-api", version, about = "Tiraz tailoring backend")]
struct Args {
    /// Bind host (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Build identification before anything that can stall
    info!(
        "Starting tiraz-api {} built {}",
        env!("TIRAZ_BUILD_ID"),
        env!("TIRAZ_BUILT_AT")
    );

    let args = Args::parse();

    let mut settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }

    info!(
        environment = %settings.environment,
        debug = settings.debug,
        ai_service = %settings.ai_service_url,
        upload_dir = %settings.upload_dir.display(),
        "Configuration loaded"
    );

    let pool = tiraz_common::db::init_database(&settings.database_url)
        .await
        .context("Failed to initialize database")?;
    info!("Database connection established");

    let address = settings.bind_address();
    let prefix = settings.api_v1_prefix.clone();
    let state = AppState::new(pool, settings)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", address);
    info!("API prefix: {}", if prefix.is_empty() { "/" } else { prefix.as_str() });
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
