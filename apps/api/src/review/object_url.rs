//! Service-local object URLs.
//!
//! A loaded blob is parked in the registry and exposed under `/blob/<token>`
//! for as long as its [`ObjectUrl`] handle lives. Dropping the handle revokes
//! the URL, so a page releases its assets simply by letting go of them.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

pub const BLOB_ROUTE_PREFIX: &str = "/blob/";

struct StoredObject {
    bytes: Bytes,
    content_type: String,
    owner: Option<String>,
}

/// A blob served back to the viewer who created it.
#[derive(Debug, Clone)]
pub struct ServedObject {
    pub bytes: Bytes,
    pub content_type: String,
}

#[derive(Default)]
pub struct ObjectUrlRegistry {
    objects: RwLock<HashMap<Uuid, StoredObject>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Parks `bytes` and returns the handle that keeps them reachable.
    /// `owner` restricts reads to one viewer; `None` means anyone holding the token.
    pub fn create(
        self: &Arc<Self>,
        bytes: Bytes,
        content_type: &str,
        owner: Option<&str>,
    ) -> ObjectUrl {
        let token = Uuid::new_v4();
        let size = bytes.len();
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                token,
                StoredObject {
                    bytes,
                    content_type: content_type.to_string(),
                    owner: owner.map(str::to_string),
                },
            );
        debug!("Created object URL {token} ({content_type}, {size} bytes)");
        ObjectUrl {
            token,
            registry: Arc::clone(self),
        }
    }

    /// Looks up a live object on behalf of `requester`.
    pub fn fetch(&self, token: Uuid, requester: Option<&str>) -> Option<ServedObject> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let object = objects.get(&token)?;
        if let Some(owner) = object.owner.as_deref() {
            if requester != Some(owner) {
                return None;
            }
        }
        Some(ServedObject {
            bytes: object.bytes.clone(),
            content_type: object.content_type.clone(),
        })
    }

    pub fn live_count(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn revoke(&self, token: Uuid) {
        let removed = self
            .objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&token);
        if removed.is_some() {
            debug!("Revoked object URL {token}");
        }
    }
}

/// Handle to a live object URL. Revokes the URL on drop.
pub struct ObjectUrl {
    token: Uuid,
    registry: Arc<ObjectUrlRegistry>,
}

impl ObjectUrl {
    pub fn token(&self) -> Uuid {
        self.token
    }

    pub fn href(&self) -> String {
        format!("{BLOB_ROUTE_PREFIX}{}", self.token)
    }
}

impl std::fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObjectUrl").field(&self.token).finish()
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.registry.revoke(self.token);
    }
}
