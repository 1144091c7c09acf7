//! Tabulon server
//!
//! Serves CSV directories and function tables over HTTP/JSON as splittable,
//! paginated sources.

pub mod config;
pub mod error;
pub mod routes;
pub mod service;

pub use config::Settings;
pub use error::ServerError;
pub use service::{ConnectorService, InProcessClient};

use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// Binds the configured address and serves until `shutdown` resolves.
pub async fn run_server<F>(settings: Settings, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    settings.validate()?;
    let addr = settings.server_address()?;
    let service = Arc::new(ConnectorService::new(&settings));
    let app = routes::router(service);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "tabulon server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("tabulon server stopped");
    Ok(())
}
