// Gatehouse API - HTTP Server

use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gatehouse_common::Config;
use gatehouse_identity::{IdentityConfig, IdentityProviderFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    init_tracing(&config);

    info!(
        app = %config.app_name,
        env = %config.environment,
        "Starting Gatehouse API server"
    );

    let identity_config = IdentityConfig::from_env().map_err(|e| {
        error!("Failed to load identity provider configuration: {}", e);
        e
    })?;

    let provider = IdentityProviderFactory::create(identity_config).map_err(|e| {
        error!("Failed to create identity provider: {}", e);
        e
    })?;

    let app = gatehouse_app::create_app(&config, Arc::from(provider));

    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => {
                error!(bind = %addr, "Requires elevated privileges")
            }
            std::io::ErrorKind::AddrInUse => error!(bind = %addr, "Port is already in use"),
            _ => error!(bind = %addr, error = %e, "Failed to bind listener"),
        }
        e
    })?;

    info!(
        host = %config.host,
        port = config.port,
        env = %config.environment,
        "HTTP server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured level applies to every target.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.is_development() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .pretty()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!(signal = "SIGINT", "Shutting down server");
        },
        _ = terminate => {
            info!(signal = "SIGTERM", "Shutting down server");
        },
    }
}
