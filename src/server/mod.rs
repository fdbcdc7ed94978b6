//! Web front end
//!
//! An axum router serving the three localized pages, the analyze action,
//! static assets and a JSON health check.

pub mod render;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::utils::error::PlantVillageError;

pub use render::{Page, PageRenderer};
pub use state::{AppState, ServerConfig, SharedState, DEFAULT_MAX_UPLOAD_BYTES};

/// Build the application router
pub fn app(state: SharedState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(routes::health::health_check))
        // Pages
        .route("/", get(routes::pages::home))
        .route("/about", get(routes::pages::about))
        .route(
            "/recognition",
            get(routes::recognition::upload_form).post(routes::recognition::analyze),
        )
        // Assets
        .nest_service("/static", ServeDir::new(static_dir))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

impl IntoResponse for PlantVillageError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Html(format!("<h1>{}</h1><p>{}</p>", status, self))).into_response()
    }
}
