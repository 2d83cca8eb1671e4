pub mod blobs;
pub mod health;
pub mod review;

use axum::{
    routing::{delete, get},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/resume/:id", get(review::handle_review_page))
        .route("/blob/:token", get(blobs::handle_get_blob))
        .route(
            "/api/v1/resumes/:id/review",
            get(review::handle_review_json),
        )
        .route("/api/v1/review/page", delete(review::handle_unmount))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::session_key;
    use crate::storage::memory::{MemoryBlobStore, MemoryKvStore, SessionOutageKvStore};
    use crate::storage::Storage;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use bytes::Bytes;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const RECORD: &str = r#"{"resumePath":"r1","imagePath":"i1",
        "feedback":{"overallScore":81,"ATS":{"score":77,"tips":["Add metrics"]}}}"#;

    fn app_state(kv: MemoryKvStore, blobs: MemoryBlobStore, ready: bool) -> AppState {
        kv.insert(session_key("tok"), "{}");
        let storage = Storage::new(Arc::new(kv), Arc::new(blobs));
        if ready {
            storage.mark_ready();
        }
        AppState::new(storage, "session".to_string())
    }

    fn full_state() -> AppState {
        let kv = MemoryKvStore::default();
        kv.insert("resume:abc", RECORD);
        let blobs = MemoryBlobStore::default();
        blobs.insert("r1", Bytes::from_static(b"%PDF-1.7"));
        blobs.insert("i1", Bytes::from_static(b"png"));
        app_state(kv, blobs, true)
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("session={token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_readiness() {
        let app = build_router(full_state());
        let response = app.oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["storage_ready"], true);
    }

    #[tokio::test]
    async fn test_signed_in_viewer_sees_review() {
        let state = full_state();
        let app = build_router(state.clone());

        let response = app.oneshot(get("/resume/abc", Some("tok"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Resume Review"));
        assert!(html.contains("ATS Score - 77/100"));
        assert!(html.contains("Add metrics"));
        assert_eq!(state.object_urls.live_count(), 2);
        assert_eq!(state.pages.mounted_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_record_renders_error_page() {
        let app = build_router(full_state());
        let response = app
            .oneshot(get("/resume/nope", Some("tok")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = body_text(response).await;
        assert!(html.contains("Resume not found"));
        assert!(!html.contains("Resume Review"));
    }

    #[tokio::test]
    async fn test_error_beats_login_prompt() {
        let app = build_router(full_state());
        let response = app.oneshot(get("/resume/nope", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Resume not found"));
    }

    #[tokio::test]
    async fn test_signed_out_viewer_gets_login_prompt() {
        let state = full_state();
        let app = build_router(state.clone());

        let response = app.oneshot(get("/resume/abc", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let html = body_text(response).await;
        assert!(html.contains("/auth?next=/resume/abc"));
        // The throwaway page released its assets with the request.
        assert_eq!(state.object_urls.live_count(), 0);
        assert_eq!(state.pages.mounted_count(), 0);
    }

    #[tokio::test]
    async fn test_storage_not_ready_shows_loading() {
        let kv = MemoryKvStore::default();
        kv.insert("resume:abc", RECORD);
        let app = build_router(app_state(kv, MemoryBlobStore::default(), false));

        let response = app.oneshot(get("/resume/abc", Some("tok"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Loading analysis..."));
    }

    #[tokio::test]
    async fn test_session_outage_keeps_page_loading() {
        let kv = SessionOutageKvStore::default();
        kv.inner.insert("resume:abc", RECORD);
        let blobs = MemoryBlobStore::default();
        blobs.insert("r1", Bytes::from_static(b"%PDF-1.7"));
        blobs.insert("i1", Bytes::from_static(b"png"));
        let storage = Storage::new(Arc::new(kv), Arc::new(blobs));
        storage.mark_ready();
        let state = AppState::new(storage, "session".to_string());
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(get("/resume/abc", Some("tok")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Loading analysis..."));
        assert!(body.contains(r#"http-equiv="refresh""#));
        assert!(!body.contains("/blob/"));

        let response = app
            .oneshot(get("/api/v1/resumes/abc/review", Some("tok")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["view"], "content");
        assert!(json["preview"].is_null());

        assert_eq!(state.object_urls.live_count(), 0);
        assert_eq!(state.pages.mounted_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_image_reports_image_error() {
        let kv = MemoryKvStore::default();
        kv.insert("resume:abc", RECORD);
        let blobs = MemoryBlobStore::default();
        blobs.insert("r1", Bytes::from_static(b"%PDF-1.7"));
        let state = app_state(kv, blobs, true);
        let app = build_router(state.clone());

        let response = app
            .oneshot(get("/api/v1/resumes/abc/review", Some("tok")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["view"], "error");
        assert_eq!(json["message"], "Failed to load resume image");
        assert_eq!(state.object_urls.live_count(), 0);
    }

    #[tokio::test]
    async fn test_json_view_carries_feedback_and_preview() {
        let app = build_router(full_state());
        let response = app
            .oneshot(get("/api/v1/resumes/abc/review", Some("tok")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["view"], "content");
        assert_eq!(json["feedback"]["ATS"]["score"], 77.0);
        assert!(json["preview"]["resume_url"]
            .as_str()
            .unwrap()
            .starts_with("/blob/"));
    }

    #[tokio::test]
    async fn test_blob_served_only_to_owner() {
        let state = full_state();
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(get("/api/v1/resumes/abc/review", Some("tok")))
            .await
            .unwrap();
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        let pdf_href = json["preview"]["resume_url"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(get(&pdf_href, Some("tok")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        assert_eq!(body_text(response).await, "%PDF-1.7");

        let response = app.oneshot(get(&pdf_href, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unmount_releases_assets() {
        let state = full_state();
        let app = build_router(state.clone());

        app.clone()
            .oneshot(get("/resume/abc", Some("tok")))
            .await
            .unwrap();
        assert_eq!(state.object_urls.live_count(), 2);

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/v1/review/page")
            .header(header::COOKIE, "session=tok")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.object_urls.live_count(), 0);

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/v1/review/page")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
