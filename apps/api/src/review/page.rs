//! Page instances and their load lifecycle.
//!
//! A [`ReviewPage`] holds what one viewer currently has on screen. Each
//! navigation bumps the page's generation; a load only commits if its
//! generation is still current when it finishes, so a slow load for an old
//! identifier can never overwrite a newer one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::models::Feedback;
use crate::review::loader::{load_review, LoadError, LoadedReview};
use crate::review::object_url::ObjectUrlRegistry;
use crate::storage::Storage;

/// Read-only copy of a page's state, taken under the page lock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSnapshot {
    pub id: String,
    pub generation: u64,
    pub resume_url: Option<String>,
    pub image_url: Option<String>,
    pub feedback: Option<Feedback>,
    pub error: Option<LoadError>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl PageSnapshot {
    /// The empty state a page starts from before any load lands.
    pub fn loading(id: &str, generation: u64) -> Self {
        Self {
            id: id.to_string(),
            generation,
            ..Self::default()
        }
    }
}

#[derive(Default)]
struct PageState {
    id: String,
    generation: u64,
    loaded: Option<LoadedReview>,
    error: Option<LoadError>,
    loaded_at: Option<DateTime<Utc>>,
}

impl PageState {
    fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            id: self.id.clone(),
            generation: self.generation,
            resume_url: self.loaded.as_ref().map(|l| l.resume_url.href()),
            image_url: self.loaded.as_ref().map(|l| l.image_url.href()),
            feedback: self.loaded.as_ref().and_then(|l| l.feedback.clone()),
            error: self.error.clone(),
            loaded_at: self.loaded_at,
        }
    }
}

pub struct ReviewPage {
    owner: Option<String>,
    generation: AtomicU64,
    state: Mutex<PageState>,
}

impl ReviewPage {
    /// `owner` is the viewer token object URLs are bound to, if any.
    pub fn new(owner: Option<String>) -> Self {
        Self {
            owner,
            generation: AtomicU64::new(0),
            state: Mutex::new(PageState::default()),
        }
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.lock().snapshot()
    }

    /// Points the page at `id` and loads it.
    ///
    /// The previous assets are released up front. When storage is not ready
    /// or the id is empty the page is left in its loading state and the
    /// next navigation tries again. The returned snapshot always belongs to
    /// this navigation's generation.
    pub async fn navigate(
        &self,
        id: &str,
        storage: &Storage,
        object_urls: &Arc<ObjectUrlRegistry>,
    ) -> PageSnapshot {
        let generation = self.begin(id);

        if id.trim().is_empty() {
            debug!("Navigation without a resume id; nothing to load");
            return PageSnapshot::loading(id, generation);
        }
        if !storage.is_ready() {
            debug!("Storage not ready; deferring load of resume {id}");
            return PageSnapshot::loading(id, generation);
        }

        let result = load_review(storage, object_urls, self.owner.as_deref(), id).await;
        if let Err(e) = &result {
            warn!("Loading resume {id} failed: {e} ({e:?})");
        }
        self.commit(id, generation, result)
    }

    /// Releases everything the page holds. Later navigations start from scratch.
    pub fn unmount(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let released = std::mem::take(&mut *self.lock());
        debug!(
            "Unmounted page for resume {:?} at generation {generation}",
            released.id
        );
    }

    fn begin(&self, id: &str) -> u64 {
        let mut state = self.lock();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        // Replacing the state drops the previous load's object URLs.
        *state = PageState {
            id: id.to_string(),
            generation,
            ..PageState::default()
        };
        generation
    }

    fn commit(
        &self,
        id: &str,
        generation: u64,
        result: Result<LoadedReview, LoadError>,
    ) -> PageSnapshot {
        let mut state = self.lock();
        if self.generation.load(Ordering::Acquire) != generation {
            debug!("Discarding superseded load of resume {id} (generation {generation})");
            return PageSnapshot::loading(id, generation);
        }
        match result {
            Ok(loaded) => {
                state.loaded = Some(loaded);
                state.loaded_at = Some(Utc::now());
            }
            Err(e) => state.error = Some(e),
        }
        state.snapshot()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ReviewPage {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if state.loaded.is_some() {
            debug!("Dropping page for resume {:?}; releasing assets", state.id);
        }
    }
}

struct MountedPage {
    page: Arc<ReviewPage>,
    last_used: Instant,
}

/// One mounted page per signed-in viewer. Pages nobody has touched for the
/// idle window are unmounted by [`PageRegistry::sweep_idle`].
#[derive(Default)]
pub struct PageRegistry {
    pages: Mutex<HashMap<String, MountedPage>>,
}

impl PageRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns the viewer's page, mounting a fresh one on first use.
    pub fn page_for(&self, viewer: &str) -> Arc<ReviewPage> {
        let mut pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
        let mounted = pages
            .entry(viewer.to_string())
            .or_insert_with(|| MountedPage {
                page: Arc::new(ReviewPage::new(Some(viewer.to_string()))),
                last_used: Instant::now(),
            });
        mounted.last_used = Instant::now();
        Arc::clone(&mounted.page)
    }

    /// Unmounts the viewer's page. Returns whether one was mounted.
    pub fn unmount(&self, viewer: &str) -> bool {
        let removed = self
            .pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(viewer);
        match removed {
            Some(mounted) => {
                mounted.page.unmount();
                true
            }
            None => false,
        }
    }

    /// Unmounts every page idle for longer than `max_idle`. Returns how many went.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let evicted: Vec<MountedPage> = {
            let mut pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
            let idle: Vec<String> = pages
                .iter()
                .filter(|(_, m)| now.duration_since(m.last_used) > max_idle)
                .map(|(viewer, _)| viewer.clone())
                .collect();
            idle.iter().filter_map(|viewer| pages.remove(viewer)).collect()
        };
        for mounted in &evicted {
            mounted.page.unmount();
        }
        evicted.len()
    }

    /// Evicts idle pages every `interval`, forever.
    pub async fn sweep_idle(self: Arc<Self>, max_idle: Duration, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let evicted = self.evict_idle(max_idle);
            if evicted > 0 {
                info!("Evicted {evicted} idle review page(s)");
            }
        }
    }

    pub fn mounted_count(&self) -> usize {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
