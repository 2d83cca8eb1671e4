use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// AI-generated review attached to a resume record.
///
/// Every section is optional: the analysis pipeline that writes these has
/// changed shape over time, and the page must still render older records.
/// Sections this service does not know about are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(rename = "ATS", default)]
    pub ats: Option<ScoredSection>,
    #[serde(default)]
    pub tone_and_style: Option<ScoredSection>,
    #[serde(default)]
    pub content: Option<ScoredSection>,
    #[serde(default)]
    pub structure: Option<ScoredSection>,
    #[serde(default)]
    pub skills: Option<ScoredSection>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredSection {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub tips: Option<Vec<Tip>>,
}

impl ScoredSection {
    pub fn score(&self) -> u32 {
        clamp_score(self.score)
    }

    pub fn tips(&self) -> &[Tip] {
        self.tips.as_deref().unwrap_or_default()
    }
}

/// The four categories shown in the summary and the detailed breakdown, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    ToneAndStyle,
    Content,
    Structure,
    Skills,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::ToneAndStyle,
        Category::Content,
        Category::Structure,
        Category::Skills,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Category::ToneAndStyle => "Tone & Style",
            Category::Content => "Content",
            Category::Structure => "Structure",
            Category::Skills => "Skills",
        }
    }
}

impl Feedback {
    /// ATS score, 0 when the section or its score is missing.
    pub fn ats_score(&self) -> u32 {
        self.ats.as_ref().map(ScoredSection::score).unwrap_or(0)
    }

    /// ATS suggestions in stored order, empty when missing.
    pub fn ats_tips(&self) -> &[Tip] {
        self.ats.as_ref().map(ScoredSection::tips).unwrap_or_default()
    }

    pub fn overall_score(&self) -> u32 {
        clamp_score(self.overall_score)
    }

    pub fn category(&self, category: Category) -> Option<&ScoredSection> {
        match category {
            Category::ToneAndStyle => self.tone_and_style.as_ref(),
            Category::Content => self.content.as_ref(),
            Category::Structure => self.structure.as_ref(),
            Category::Skills => self.skills.as_ref(),
        }
    }
}

/// Scores are 0..=100; anything missing or non-finite reads as 0.
fn clamp_score(score: Option<f64>) -> u32 {
    match score {
        Some(s) if s.is_finite() => s.round().clamp(0.0, 100.0) as u32,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TipKind {
    Good,
    #[default]
    Improve,
}

/// A single suggestion. Stored either as a bare string or as
/// `{ "type": "good" | "improve", "tip": ..., "explanation": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTip")]
pub struct Tip {
    #[serde(rename = "type")]
    pub kind: TipKind,
    pub tip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Tip {
    pub fn improve(text: impl Into<String>) -> Self {
        Self {
            kind: TipKind::Improve,
            tip: text.into(),
            explanation: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTip {
    Text(String),
    Detailed {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        tip: String,
        #[serde(default)]
        explanation: Option<String>,
    },
}

impl From<RawTip> for Tip {
    fn from(raw: RawTip) -> Self {
        match raw {
            RawTip::Text(tip) => Tip::improve(tip),
            RawTip::Detailed {
                kind,
                tip,
                explanation,
            } => Tip {
                kind: match kind.as_deref() {
                    Some("good") => TipKind::Good,
                    _ => TipKind::Improve,
                },
                tip,
                explanation,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_tips_become_improve_tips() {
        let feedback: Feedback =
            serde_json::from_value(json!({"ATS": {"score": 77, "tips": ["Add metrics"]}}))
                .unwrap();
        assert_eq!(feedback.ats_score(), 77);
        assert_eq!(feedback.ats_tips(), &[Tip::improve("Add metrics")]);
    }

    #[test]
    fn test_missing_ats_defaults_to_zero_and_empty() {
        let feedback: Feedback = serde_json::from_value(json!({"overallScore": 80})).unwrap();
        assert_eq!(feedback.ats_score(), 0);
        assert!(feedback.ats_tips().is_empty());
    }

    #[test]
    fn test_null_score_and_tips_default() {
        let feedback: Feedback =
            serde_json::from_value(json!({"ATS": {"score": null, "tips": null}})).unwrap();
        assert_eq!(feedback.ats_score(), 0);
        assert!(feedback.ats_tips().is_empty());
    }

    #[test]
    fn test_detailed_tips_keep_kind_and_explanation() {
        let feedback: Feedback = serde_json::from_value(json!({
            "toneAndStyle": {
                "score": 64,
                "tips": [
                    {"type": "good", "tip": "Confident voice", "explanation": "Active verbs throughout."},
                    {"type": "warning", "tip": "Too long"}
                ]
            }
        }))
        .unwrap();

        let tips = feedback.category(Category::ToneAndStyle).unwrap().tips();
        assert_eq!(tips[0].kind, TipKind::Good);
        assert_eq!(
            tips[0].explanation.as_deref(),
            Some("Active verbs throughout.")
        );
        assert_eq!(tips[1].kind, TipKind::Improve);
    }

    #[test]
    fn test_scores_are_clamped_and_rounded() {
        let feedback: Feedback =
            serde_json::from_value(json!({"overallScore": 142.4, "ATS": {"score": 68.6}}))
                .unwrap();
        assert_eq!(feedback.overall_score(), 100);
        assert_eq!(feedback.ats_score(), 69);
    }

    #[test]
    fn test_unknown_sections_are_preserved() {
        let feedback: Feedback =
            serde_json::from_value(json!({"coverLetter": {"score": 5}})).unwrap();
        assert_eq!(feedback.extra["coverLetter"], json!({"score": 5}));
    }
}
