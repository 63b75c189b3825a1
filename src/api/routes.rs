//! API route configuration.

use crate::api::handlers::{
    create_link_handler, delete_link_handler, get_link_handler, health_handler,
    list_links_handler, metrics_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Link management routes, mounted under `/api`.
///
/// # Endpoints
///
/// - `GET    /links`          - List active links, newest first
/// - `POST   /links`          - Create a short link
/// - `GET    /links/{code}`   - Fetch an active link
/// - `DELETE /links/{code}`   - Soft-delete a link
/// - `GET    /health`         - Store health check
/// - `GET    /metrics`        - Prometheus counters
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route(
            "/links/{code}",
            get(get_link_handler).delete(delete_link_handler),
        )
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
}
