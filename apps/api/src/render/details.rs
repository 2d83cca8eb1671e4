use askama::Template;

use crate::models::{Category, Feedback, TipKind};
use crate::render::badge;

pub struct DetailTip {
    pub good: bool,
    pub text: String,
    pub has_explanation: bool,
    pub explanation: String,
}

pub struct DetailSection {
    pub anchor: &'static str,
    pub title: &'static str,
    pub score: u32,
    pub tone: &'static str,
    pub tips: Vec<DetailTip>,
}

/// Per-category breakdown with every tip and its explanation.
#[derive(Template)]
#[template(path = "details.html")]
pub struct DetailsCard {
    pub sections: Vec<DetailSection>,
}

impl DetailsCard {
    pub fn from_feedback(feedback: &Feedback) -> Self {
        let sections = Category::ALL
            .into_iter()
            .map(|category| {
                let section = feedback.category(category);
                let score = section.map(|s| s.score()).unwrap_or(0);
                let tips = section
                    .map(|s| s.tips())
                    .unwrap_or_default()
                    .iter()
                    .map(|tip| DetailTip {
                        good: tip.kind == TipKind::Good,
                        text: tip.tip.clone(),
                        has_explanation: tip.explanation.is_some(),
                        explanation: tip.explanation.clone().unwrap_or_default(),
                    })
                    .collect();
                DetailSection {
                    anchor: anchor(category),
                    title: category.title(),
                    score,
                    tone: badge(score).0.css(),
                    tips,
                }
            })
            .collect();

        Self { sections }
    }
}

fn anchor(category: Category) -> &'static str {
    match category {
        Category::ToneAndStyle => "tone-and-style",
        Category::Content => "content",
        Category::Structure => "structure",
        Category::Skills => "skills",
    }
}
