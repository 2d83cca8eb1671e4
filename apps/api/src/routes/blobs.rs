use axum::{
    extract::{Path, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::Viewer;
use crate::state::AppState;

/// GET /blob/:token
///
/// Serves a live object URL to the viewer that owns it.
pub async fn handle_get_blob(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(token): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let object = state
        .object_urls
        .fetch(token, viewer.signed_in_token())
        .ok_or_else(|| AppError::NotFound(format!("Object {token} not found")))?;

    Ok((
        [
            (CONTENT_TYPE, object.content_type),
            (CACHE_CONTROL, "private, no-store".to_string()),
        ],
        object.bytes,
    ))
}
