//! Handlers for link management endpoints (create, list, fetch, delete).

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::{info, warn};

use crate::api::dto::link::{
    CreateLinkRequest, CreateLinkResponse, DeleteLinkResponse, LinkListResponse, LinkResponse,
};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com", "code": "abc123" }
/// ```
///
/// `code` is optional; a 6-character code is generated when omitted.
///
/// # Response
///
/// `201 Created` with `{ "code": "abc123", "url": "https://example.com" }`.
///
/// # Errors
///
/// - 400 Bad Request for a malformed body, URL or code
/// - 409 Conflict if the custom code is already taken
pub async fn create_link_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), AppError> {
    let Json(payload) = payload?;

    let link = state
        .link_service
        .create_link(payload.url, payload.code)
        .await?;

    // The code may have been cached while it pointed elsewhere
    if let Err(e) = state.cache.invalidate(&link.code).await {
        warn!(error = %e, code = %link.code, "Failed to invalidate cache after create");
    }

    info!(code = %link.code, "Link created");

    Ok((
        StatusCode::CREATED,
        Json(CreateLinkResponse {
            code: link.code,
            url: link.url,
        }),
    ))
}

/// Lists all links, newest first.
///
/// # Endpoint
///
/// `GET /api/links`
pub async fn list_links_handler(
    State(state): State<AppState>,
) -> Result<Json<LinkListResponse>, AppError> {
    let links = state.link_service.list_links().await?;

    Ok(Json(LinkListResponse {
        links: links.into_iter().map(LinkResponse::from).collect(),
    }))
}

/// Returns one link with its click counters.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown.
pub async fn get_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link(&code).await?;
    Ok(Json(link.into()))
}

/// Deletes a link.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}`
///
/// # Cache
///
/// The cached redirect target is invalidated so the code stops resolving
/// immediately.
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteLinkResponse>, AppError> {
    state.link_service.delete_link(&code).await?;

    if let Err(e) = state.cache.invalidate(&code).await {
        warn!(error = %e, code = %code, "Failed to invalidate cache after delete");
    }

    info!(code = %code, "Link deleted");

    Ok(Json(DeleteLinkResponse {
        message: "Link deleted successfully".to_string(),
        code,
    }))
}
