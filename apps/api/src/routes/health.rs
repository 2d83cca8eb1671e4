use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and whether storage has come up.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-review",
        "storage_ready": state.storage.is_ready(),
        "mounted_pages": state.pages.mounted_count(),
        "live_object_urls": state.object_urls.live_count(),
    }))
}
