use std::sync::Arc;

use axum::http::StatusCode;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{resume_key, Feedback, ResumeRecord};
use crate::review::object_url::{ObjectUrl, ObjectUrlRegistry};
use crate::storage::{Blob, Storage, StorageError};

const PDF_CONTENT_TYPE: &str = "application/pdf";
const FALLBACK_IMAGE_TYPE: &str = "image/png";

/// Why a load ended without content. The `Display` text is shown to the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Resume not found")]
    NotFound,

    #[error("Failed to load resume file")]
    ResumeFileUnavailable,

    #[error("Failed to load resume image")]
    ImageUnavailable,

    #[error("Resume record is corrupt")]
    CorruptRecord(String),

    #[error("Storage is unavailable")]
    StorageUnavailable(String),
}

impl LoadError {
    pub fn status(&self) -> StatusCode {
        match self {
            LoadError::NotFound
            | LoadError::ResumeFileUnavailable
            | LoadError::ImageUnavailable => StatusCode::NOT_FOUND,
            LoadError::CorruptRecord(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LoadError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<StorageError> for LoadError {
    fn from(e: StorageError) -> Self {
        LoadError::StorageUnavailable(e.to_string())
    }
}

/// Everything a successful load produces. Dropping it revokes both URLs.
#[derive(Debug)]
pub struct LoadedReview {
    pub resume_url: ObjectUrl,
    pub image_url: ObjectUrl,
    pub feedback: Option<Feedback>,
}

/// Resolves a resume id into its two object URLs and its feedback.
///
/// Steps run strictly in order: record → resume PDF → preview image.
/// The first failure wins; a URL created before it is released when the
/// partial result goes out of scope.
pub async fn load_review(
    storage: &Storage,
    object_urls: &Arc<ObjectUrlRegistry>,
    owner: Option<&str>,
    id: &str,
) -> Result<LoadedReview, LoadError> {
    let key = resume_key(id);
    let raw = storage.kv().get(&key).await?.ok_or(LoadError::NotFound)?;

    let record: ResumeRecord =
        serde_json::from_str(&raw).map_err(|e| LoadError::CorruptRecord(e.to_string()))?;

    let resume = read_blob(storage, record.resume_path.as_deref())
        .await?
        .ok_or(LoadError::ResumeFileUnavailable)?;
    let resume_url = object_urls.create(resume.bytes, PDF_CONTENT_TYPE, owner);

    let image_path = record.image_path.as_deref();
    let image = read_blob(storage, image_path)
        .await?
        .ok_or(LoadError::ImageUnavailable)?;
    let image_type = image_content_type(&image, image_path.unwrap_or_default());
    let image_url = object_urls.create(image.bytes, &image_type, owner);

    info!(
        "Loaded resume {id}: pdf={} image={} feedback={}",
        resume_url.token(),
        image_url.token(),
        record.feedback.is_some()
    );

    Ok(LoadedReview {
        resume_url,
        image_url,
        feedback: record.feedback,
    })
}

/// A record without a path behaves like a path that resolves to nothing.
async fn read_blob(storage: &Storage, path: Option<&str>) -> Result<Option<Blob>, LoadError> {
    let Some(path) = path else {
        debug!("Record has no blob path");
        return Ok(None);
    };
    match storage.blobs().read(path).await {
        Ok(blob) => Ok(blob),
        Err(StorageError::InvalidPath(p)) => {
            debug!("Record points at an invalid blob path {p:?}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn image_content_type(image: &Blob, path: &str) -> String {
    image
        .content_type
        .clone()
        .filter(|ct| ct.starts_with("image/"))
        .or_else(|| {
            mime_guess::from_path(path)
                .first()
                .filter(|m| m.type_() == mime_guess::mime::IMAGE)
                .map(|m| m.essence_str().to_string())
        })
        .unwrap_or_else(|| FALLBACK_IMAGE_TYPE.to_string())
}
