//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, warn};
use url::Url;

use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::state::{AppState, DynLinkService};

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Check cache for the URL
/// 2. On cache miss, query the link store and populate the cache in the background
///    (re-checked against the store so a concurrent delete cannot leave a stale entry)
/// 3. Offer a click event to the background worker without waiting
/// 4. Return 302 Found
///
/// # Click Tracking
///
/// Click events go to a bounded channel. If the queue is full or closed the
/// click is dropped and logged; the redirect is served either way.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let url = resolve_url(&state, &code).await?;
    let location = location_header(&url)?;

    match state.click_sender.try_send(ClickEvent::new(code)) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            warn!(code = %event.code, "Click queue full, click dropped");
        }
        Err(TrySendError::Closed(event)) => {
            warn!(code = %event.code, "Click queue closed, click dropped");
        }
    }

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// Looks the code up in the cache, falling back to the link store.
async fn resolve_url(state: &AppState, code: &str) -> Result<String, AppError> {
    match state.cache.get_url(code).await {
        Ok(Some(url)) => {
            debug!(code, "Cache HIT");
            return Ok(url);
        }
        Ok(None) => debug!(code, "Cache MISS"),
        Err(e) => error!(code, error = %e, "Cache error, falling back to store"),
    }

    let link = state.link_service.get_link(code).await?;

    tokio::spawn(fill_cache(
        state.cache.clone(),
        state.link_service.clone(),
        link.code,
        link.url.clone(),
    ));

    Ok(link.url)
}

/// Caches `code -> url`, then drops the entry again if the store no longer
/// maps `code` to `url`.
///
/// A delete or recreate can land between the store lookup and the cache
/// write. Its own invalidation may then run before this write, so the store
/// is read once more after writing. Either that read sees the change, or the
/// change's invalidation runs after the write.
async fn fill_cache(
    cache: Arc<dyn CacheService>,
    link_service: Arc<DynLinkService>,
    code: String,
    url: String,
) {
    if let Err(e) = cache.set_url(&code, &url, None).await {
        error!(code = %code, error = %e, "Failed to cache URL");
        return;
    }

    let still_current = matches!(
        link_service.get_link(&code).await,
        Ok(link) if link.url == url
    );

    if !still_current {
        debug!(code = %code, "Link changed while caching, dropping entry");
        if let Err(e) = cache.invalidate(&code).await {
            error!(code = %code, error = %e, "Failed to drop stale cache entry");
        }
    }
}

/// Builds the `Location` value, falling back to the ASCII serialization of
/// the URL when the stored form contains characters not allowed in headers.
fn location_header(url: &str) -> Result<HeaderValue, AppError> {
    if let Ok(value) = HeaderValue::from_str(url) {
        return Ok(value);
    }

    Url::parse(url)
        .ok()
        .and_then(|parsed| HeaderValue::from_str(parsed.as_str()).ok())
        .ok_or_else(|| {
            AppError::internal(
                "Stored URL cannot be used as a Location header",
                json!({ "url": url }),
            )
        })
}
