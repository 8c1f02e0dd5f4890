//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::live_reload;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new().route("/reload.js", get(live_reload::reload_script));

    // WebSocket push endpoint for live reload
    if state.live_reload_enabled() {
        router = router.route("/__reload", get(live_reload::ws_handler));
    }

    // Everything else resolves against the served root
    router
        .fallback(static_files::serve_request)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
