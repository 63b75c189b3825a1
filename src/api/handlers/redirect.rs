//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::error;
use url::Url;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its target URL, counting the click.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Reject codes outside `[A-Za-z0-9]{6,8}` without touching the store
/// 2. Resolve the code and increment its click counter in one transaction
/// 3. Return 302 Found with the target in `Location`
///
/// # Responses
///
/// - **302 Found**: active link
/// - **404 Not Found**: malformed code, unknown code or deleted link
/// - **500 Internal Server Error**: store failure or timeout
///
/// Error bodies are plain text and never carry internal details.
pub async fn redirect_handler(Path(code): Path<String>, State(state): State<AppState>) -> Response {
    match state.link_service.redirect(&code).await {
        Ok(target) => found(&target),
        Err(AppError::Validation { .. } | AppError::NotFound { .. }) => {
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
        Err(err) => {
            error!(code = %code, error = ?err, "Redirect error");
            internal_server_error()
        }
    }
}

/// Builds the 302 response. The stored target is re-serialized through the
/// URL parser first, which drops tabs and newlines a `Location` header
/// cannot carry.
fn found(target: &str) -> Response {
    let location = match Url::parse(target) {
        Ok(url) => HeaderValue::from_str(url.as_str()),
        Err(_) => HeaderValue::from_str(target),
    };

    match location {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(e) => {
            error!(target, error = %e, "Target is not a valid Location header value");
            internal_server_error()
        }
    }
}

fn internal_server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
