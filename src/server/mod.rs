//! HTTP transport for the validation service.

pub mod request_id;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::config::ServiceConfig;
use crate::service::PortOutService;
use crate::store::LibSqlRecordStore;

pub use routes::{AppState, SERVICE_NAME, port_out_routes};

/// Open the record store and serve until Ctrl+C or SIGTERM.
pub async fn run(config: ServiceConfig) -> crate::Result<()> {
    let store = LibSqlRecordStore::new_local(&config.database.path, &config.table_name).await?;
    let service = PortOutService::new(config.validation.clone(), Arc::new(store));
    let router = port_out_routes(&config.path, service);

    let listener = TcpListener::bind(config.listen_addr()).await?;
    info!(
        addr = %listener.local_addr()?,
        path = %config.path,
        "Port-out validation listening"
    );

    serve(listener, router, shutdown_signal()).await?;
    info!("Server shutdown complete");
    Ok(())
}

/// Serve `router` on `listener` with peer addresses available to handlers.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
