//! Handlers for link management endpoints (create, list, get, delete).

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::api::dto::link::{CreateLinkRequest, LinkResponse};
use crate::domain::entities::Link;
use crate::error::AppError;
use crate::state::AppState;

fn to_response(state: &AppState, link: Link) -> LinkResponse {
    let short_url = state.short_url(&link.code);
    LinkResponse::new(link, short_url)
}

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "target": "https://example.com",
///   "code": "promo24"   // optional, 6-8 alphanumeric
/// }
/// ```
///
/// # Responses
///
/// - **201 Created**: the created link
/// - **400 Bad Request**: missing or invalid target, malformed code, or a
///   body that is not a JSON object of strings
/// - **409 Conflict**: the requested code already exists (deleted links included)
/// - **500 Internal Server Error**: store failure, or no free generated code found
pub async fn create_link_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let Json(payload) = payload?;

    let link = state
        .link_service
        .create(
            payload.target.as_deref().unwrap_or_default(),
            payload.code.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(&state, link))))
}

/// Lists active links, newest first.
///
/// # Endpoint
///
/// `GET /api/links`
pub async fn list_links_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let links = state.link_service.list().await?;

    Ok(Json(
        links
            .into_iter()
            .map(|link| to_response(&state, link))
            .collect(),
    ))
}

/// Returns a single active link with its click count.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
///
/// # Errors
///
/// Returns 400 Bad Request for malformed codes and 404 Not Found for unknown
/// or deleted links.
pub async fn get_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get(&code).await?;

    Ok(Json(to_response(&state, link)))
}

/// Soft-deletes a short link.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}`
///
/// # Behavior
///
/// - The row is kept; it disappears from listings, lookups and redirects
/// - Deleting an already-deleted link returns 204 again
/// - The code stays reserved (see `CODE_REUSE`)
///
/// # Errors
///
/// Returns 400 Bad Request for malformed codes and 404 Not Found if no link
/// has this code.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.link_service.remove(&code).await?;

    Ok(StatusCode::NO_CONTENT)
}
