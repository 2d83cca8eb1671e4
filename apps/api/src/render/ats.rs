use askama::Template;

use crate::models::{Tip, TipKind};
use crate::render::Tone;

pub struct Suggestion {
    pub good: bool,
    pub text: String,
}

/// ATS score card. Takes the score and suggestions already defaulted
/// (0 and empty) by the caller.
#[derive(Template)]
#[template(path = "ats.html")]
pub struct AtsCard {
    pub score: u32,
    pub suggestions: Vec<Suggestion>,
    tone: &'static str,
    icon: &'static str,
    headline: &'static str,
}

impl AtsCard {
    pub fn new(score: u32, suggestions: &[Tip]) -> Self {
        let (tone, icon, headline) = if score > 69 {
            (Tone::Good, "/icons/ats-good.svg", "Great Job!")
        } else if score > 49 {
            (Tone::Fair, "/icons/ats-warning.svg", "Good Start")
        } else {
            (Tone::Poor, "/icons/ats-bad.svg", "Needs Improvement")
        };

        Self {
            score,
            suggestions: suggestions
                .iter()
                .map(|tip| Suggestion {
                    good: tip.kind == TipKind::Good,
                    text: tip.tip.clone(),
                })
                .collect(),
            tone: tone.css(),
            icon,
            headline,
        }
    }
}
