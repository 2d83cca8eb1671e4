use axum::http::StatusCode;
use serde::Serialize;

use crate::models::Feedback;
use crate::review::page::PageSnapshot;
use crate::session::SessionContext;

pub const HOME_HREF: &str = "/";

/// The single view a page shows. Chosen by [`select_view`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PageView {
    Error {
        message: String,
        #[serde(skip)]
        status: StatusCode,
    },
    Unauthenticated {
        login_href: String,
    },
    Content {
        preview: Option<Preview>,
        /// `None` renders the loading placeholder.
        feedback: Option<Feedback>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub image_url: String,
    pub resume_url: String,
}

impl PageView {
    pub fn status(&self) -> StatusCode {
        match self {
            PageView::Error { status, .. } => *status,
            PageView::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            PageView::Content { .. } => StatusCode::OK,
        }
    }

    /// Content with nothing to show yet.
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            PageView::Content {
                preview: None,
                feedback: None
            }
        )
    }
}

/// Login target that brings the viewer back to this resume afterwards.
pub fn login_href(id: &str) -> String {
    format!("/auth?next=/resume/{}", urlencoding::encode(id))
}

/// Error beats unauthenticated, which beats content.
pub fn select_view(snapshot: &PageSnapshot, session: &SessionContext) -> PageView {
    if let Some(error) = &snapshot.error {
        return PageView::Error {
            message: error.to_string(),
            status: error.status(),
        };
    }

    if !session.is_loading() && !session.is_authenticated() {
        return PageView::Unauthenticated {
            login_href: login_href(&snapshot.id),
        };
    }

    let preview = match (&snapshot.image_url, &snapshot.resume_url) {
        (Some(image_url), Some(resume_url)) => Some(Preview {
            image_url: image_url.clone(),
            resume_url: resume_url.clone(),
        }),
        _ => None,
    };

    PageView::Content {
        preview,
        feedback: snapshot.feedback.clone(),
    }
}
