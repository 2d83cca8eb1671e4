//! Axum route handlers for the review page.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use tracing::debug;

use crate::errors::AppError;
use crate::render::render_page;
use crate::review::page::{PageSnapshot, ReviewPage};
use crate::review::view::{select_view, PageView};
use crate::session::Viewer;
use crate::state::AppState;

/// Mounts (or reuses) the viewer's page and points it at `id`.
///
/// Signed-in viewers keep their page between requests, so its assets stay
/// reachable for the browser until the next navigation or an unmount.
/// Anyone else gets a throwaway page whose assets die with the request.
/// While the session is unresolved nothing is loaded: the page renders as
/// loading and refreshes until the viewer's identity is known.
async fn navigate(state: &AppState, viewer: &Viewer, id: &str) -> PageView {
    if viewer.session.is_loading() {
        debug!(
            "Session unresolved (storage ready: {}); resume {id} will render as loading",
            viewer.session.storage_ready()
        );
        return select_view(&PageSnapshot::loading(id, 0), &viewer.session);
    }
    let page = match viewer.signed_in_token() {
        Some(token) => state.pages.page_for(token),
        None => Arc::new(ReviewPage::new(None)),
    };
    let snapshot: PageSnapshot = page.navigate(id, &state.storage, &state.object_urls).await;
    select_view(&snapshot, &viewer.session)
}

/// GET /resume/:id
///
/// Renders the review page: error, login prompt, or the review itself.
pub async fn handle_review_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Result<(StatusCode, Html<String>), AppError> {
    let view = navigate(&state, &viewer, &id).await;
    let html = render_page(&view)?;
    Ok((view.status(), Html(html)))
}

/// GET /api/v1/resumes/:id/review
///
/// Same view as the HTML page, as JSON, for non-browser clients.
pub async fn handle_review_json(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> (StatusCode, Json<PageView>) {
    let view = navigate(&state, &viewer, &id).await;
    (view.status(), Json(view))
}

/// DELETE /api/v1/review/page
///
/// Unmounts the viewer's page and releases its object URLs.
pub async fn handle_unmount(
    State(state): State<AppState>,
    viewer: Viewer,
) -> Result<StatusCode, AppError> {
    let token = viewer.signed_in_token().ok_or(AppError::Unauthorized)?;
    if state.pages.unmount(token) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("No review page is mounted".to_string()))
    }
}
