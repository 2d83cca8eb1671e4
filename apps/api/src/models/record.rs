use serde::{Deserialize, Serialize};

use crate::models::feedback::Feedback;

/// Key under which the analysis flow stores a resume record.
pub fn resume_key(id: &str) -> String {
    format!("resume:{id}")
}

/// Stored JSON linking a resume to its PDF, its preview image and its review.
/// Written once by the upload/analysis flow; this service only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    #[serde(default)]
    pub resume_path: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    /// Absent while the analysis is still pending.
    #[serde(default)]
    pub feedback: Option<Feedback>,
}
