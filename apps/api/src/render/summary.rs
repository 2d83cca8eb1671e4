use askama::Template;

use crate::models::{Category, Feedback};
use crate::render::badge;

pub struct SummaryRow {
    pub title: &'static str,
    pub score: u32,
    pub tone: &'static str,
    pub badge: &'static str,
}

/// Overall score plus one badge per category. Missing categories score 0.
#[derive(Template)]
#[template(path = "summary.html")]
pub struct SummaryCard {
    pub overall: u32,
    pub rows: Vec<SummaryRow>,
}

impl SummaryCard {
    pub fn from_feedback(feedback: &Feedback) -> Self {
        let rows = Category::ALL
            .into_iter()
            .map(|category| {
                let score = feedback
                    .category(category)
                    .map(|section| section.score())
                    .unwrap_or(0);
                let (tone, label) = badge(score);
                SummaryRow {
                    title: category.title(),
                    score,
                    tone: tone.css(),
                    badge: label,
                }
            })
            .collect();

        Self {
            overall: feedback.overall_score(),
            rows,
        }
    }
}
