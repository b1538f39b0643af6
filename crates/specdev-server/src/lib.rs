//! HTTP server for specdev.
//!
//! Two listeners run side by side:
//!
//! - the documentation server, serving the generated HTML and everything
//!   else under the project root
//! - the reload socket, carrying only the live-reload WebSocket at `/`
//!
//! They stay on separate ports so the injected client script can dial the
//! reload socket without touching the page origin.
//!
//! [`DevSession`] ties the build pipeline to the served state: it runs the
//! external tool, injects the reload client into the output, and notifies
//! connected browsers, strictly in that order.

mod app;
mod live_reload;
mod session;
mod state;
mod static_files;

pub use live_reload::{RELOAD_MESSAGE, ReloadHub};
pub use session::{DevSession, RebuildOutcome};
pub use state::AppState;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port serving the generated documentation.
    pub port: u16,
    /// Port carrying the live-reload WebSocket.
    pub reload_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3004,
            reload_port: 3005,
        }
    }
}

/// Server error.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding a listener failed.
    #[error("failed to bind {host}:{port}: {source}")]
    Bind {
        /// Configured host.
        host: String,
        /// Port that could not be bound.
        port: u16,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A listener failed while serving.
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Run both listeners until the shutdown signal fires.
///
/// In-flight connections are drained gracefully once `shutdown` changes
/// or its sender is dropped.
///
/// # Errors
///
/// Returns an error if either listener fails to bind or fails while
/// serving.
pub async fn run_server(
    config: ServerConfig,
    state: Arc<AppState>,
    shutdown: watch::Receiver<()>,
) -> Result<(), ServerError> {
    let docs_listener = bind(&config.host, config.port).await?;
    let reload_listener = bind(&config.host, config.reload_port).await?;

    tracing::info!(host = %config.host, port = config.port, "documentation server listening");
    tracing::info!(host = %config.host, port = config.reload_port, "reload socket listening");

    let docs = axum::serve(docs_listener, app::docs_router(Arc::clone(&state)))
        .with_graceful_shutdown(wait_for_shutdown(shutdown.clone()));
    let reload = axum::serve(reload_listener, app::reload_router(state))
        .with_graceful_shutdown(wait_for_shutdown(shutdown));

    tokio::try_join!(docs, reload).map_err(ServerError::Serve)?;
    Ok(())
}

async fn bind(host: &str, port: u16) -> Result<TcpListener, ServerError> {
    TcpListener::bind((host, port))
        .await
        .map_err(|source| ServerError::Bind {
            host: host.to_owned(),
            port,
            source,
        })
}

/// Resolve once the orchestrator signals shutdown (or goes away).
async fn wait_for_shutdown(mut shutdown: watch::Receiver<()>) {
    let _ = shutdown.changed().await;
    tracing::debug!("shutdown signal received");
}
