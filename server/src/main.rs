mod app;
mod config;
mod routes;
mod state;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let region = config::load_region_config().await;
    let data_dir = config::data_dir();
    let dist_dir = config::dist_dir();
    tracing::info!(
        region = %region.title,
        data_dir = %data_dir.display(),
        dist_dir = %dist_dir.display(),
        "Loading region data..."
    );

    let catalog = state::load_catalog(&data_dir, &region).await;
    if catalog.units == 0 {
        tracing::warn!("no units loaded; quiz screens will finish immediately");
    } else {
        tracing::info!(
            units = catalog.units,
            features = catalog.features,
            unbound = catalog.unbound,
            "Region data loaded"
        );
    }

    let app = app::build_app(AppState::new(region, catalog), &dist_dir, &data_dir);

    let addr = format!("0.0.0.0:{}", config::server_port());
    tracing::info!("Shires server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
    }

    tracing::info!("Server shut down gracefully");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
