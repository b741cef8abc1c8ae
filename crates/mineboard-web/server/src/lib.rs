pub mod routes;
pub mod state;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use routes::{ApiError, SharedState, api_router};
pub use state::AppState;

/// The API plus the built UI bundle served from `ui_dir` for every other
/// path.
pub fn build_app(state: AppState, ui_dir: &Path) -> Router {
    let ui = ServeDir::new(ui_dir).append_index_html_on_directories(true);
    api_router(Arc::new(state))
        .fallback_service(ui)
        .layer(TraceLayer::new_for_http())
}
