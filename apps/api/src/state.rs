use std::sync::Arc;

use crate::review::object_url::ObjectUrlRegistry;
use crate::review::page::PageRegistry;
use crate::session::{KvSessionResolver, SessionResolver};
use crate::storage::Storage;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    /// Pluggable session source. Default: KvSessionResolver over the same store.
    pub sessions: Arc<dyn SessionResolver>,
    pub object_urls: Arc<ObjectUrlRegistry>,
    /// Mounted review pages, one per signed-in viewer.
    pub pages: Arc<PageRegistry>,
    pub session_cookie: String,
}

impl AppState {
    pub fn new(storage: Storage, session_cookie: String) -> Self {
        let sessions = Arc::new(KvSessionResolver::new(storage.clone()));
        Self {
            storage,
            sessions,
            object_urls: ObjectUrlRegistry::new(),
            pages: PageRegistry::new(),
            session_cookie,
        }
    }
}
