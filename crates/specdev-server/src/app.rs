//! Router construction.
//!
//! Builds the axum routers for both listeners.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::live_reload;
use crate::state::AppState;
use crate::static_files;

/// Router serving the generated documentation.
///
/// No security-header middleware here: the output file carries an injected
/// inline script, which a content security policy would refuse to run.
pub(crate) fn docs_router(state: Arc<AppState>) -> Router {
    static_files::static_router()
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Router carrying only the live reload WebSocket at `/`.
pub(crate) fn reload_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(live_reload::ws_handler))
        .with_state(state)
}
