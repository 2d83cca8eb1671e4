//! HTML rendering for the review page.
//!
//! The page templates pick layout only; the three feedback sections are
//! rendered by their own delegates and spliced in as finished markup.

pub mod ats;
pub mod details;
pub mod summary;

use askama::Template;

use crate::models::Feedback;
use crate::review::view::{PageView, HOME_HREF};

/// Seconds between automatic reloads while the page has nothing to show.
const LOADING_REFRESH_SECS: u32 = 2;

/// Tailwind-ish colour band shared by the score widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Fair,
    Poor,
}

impl Tone {
    pub fn css(self) -> &'static str {
        match self {
            Tone::Good => "green",
            Tone::Fair => "yellow",
            Tone::Poor => "red",
        }
    }
}

/// Category badges: above 70 is strong, above 49 is a start.
pub fn badge(score: u32) -> (Tone, &'static str) {
    if score > 70 {
        (Tone::Good, "Strong")
    } else if score > 49 {
        (Tone::Fair, "Good Start")
    } else {
        (Tone::Poor, "Needs Work")
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPage<'a> {
    home_href: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginPage<'a> {
    home_href: &'a str,
    login_href: &'a str,
}

#[derive(Template)]
#[template(path = "review.html")]
struct ReviewPageTemplate<'a> {
    home_href: &'a str,
    refresh_secs: u32,
    loading: bool,
    has_preview: bool,
    image_url: &'a str,
    resume_url: &'a str,
    has_feedback: bool,
    sections: String,
}

pub fn render_page(view: &PageView) -> Result<String, askama::Error> {
    match view {
        PageView::Error { message, .. } => ErrorPage {
            home_href: HOME_HREF,
            message,
        }
        .render(),
        PageView::Unauthenticated { login_href } => LoginPage {
            home_href: HOME_HREF,
            login_href,
        }
        .render(),
        PageView::Content { preview, feedback } => {
            let sections = match feedback {
                Some(feedback) => render_sections(feedback)?,
                None => String::new(),
            };
            ReviewPageTemplate {
                home_href: HOME_HREF,
                refresh_secs: LOADING_REFRESH_SECS,
                loading: view.is_loading(),
                has_preview: preview.is_some(),
                image_url: preview.as_ref().map(|p| p.image_url.as_str()).unwrap_or(""),
                resume_url: preview.as_ref().map(|p| p.resume_url.as_str()).unwrap_or(""),
                has_feedback: feedback.is_some(),
                sections,
            }
            .render()
        }
    }
}

/// Summary, ATS and details, in that order.
fn render_sections(feedback: &Feedback) -> Result<String, askama::Error> {
    let summary = summary::SummaryCard::from_feedback(feedback).render()?;
    let ats = ats::AtsCard::new(feedback.ats_score(), feedback.ats_tips()).render()?;
    let details = details::DetailsCard::from_feedback(feedback).render()?;
    Ok(format!("{summary}\n{ats}\n{details}"))
}
