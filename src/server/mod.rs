//! HTTP server
//!
//! The gateway's axum surface: identity attachment, the access gate,
//! permission introspection and relaying to the CRUD service.

pub mod authenticate;
pub mod gate;
pub mod response;
pub mod routes;

pub use authenticate::authenticate;
pub use gate::access_gate;
pub use response::{ApiError, DenialDetails, ErrorBody};
pub use routes::{AppState, PermissionsResponse, build_router};

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Parse a bind address from host and port
pub fn bind_address(host: &str, port: u16) -> Result<SocketAddr, std::net::AddrParseError> {
    format!("{}:{}", host, port).parse()
}

/// Serve the router until Ctrl+C
pub async fn serve(router: Router, bind: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!("Gateway listening on http://{}", listener.local_addr()?);
    info!("Press Ctrl+C to stop the server");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
