//! Request and result types for a synthesis analysis.

use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /api/v1/synthesize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
    /// Analysis lenses; accepted for compatibility, not used by the pipeline.
    #[serde(default)]
    pub lenses: Vec<String>,
}

impl AnalysisRequest {
    /// The text to analyze, or `None` when it is empty or whitespace.
    pub fn text(&self) -> Option<&str> {
        if self.text.trim().is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }
}

/// A rhetorical device attributed to a phrase of a sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticMention {
    /// Literal substring of the owning sentence
    pub phrase: String,
    /// Tactic name, e.g. "Loaded Language"
    pub tactic: String,
    pub explanation: String,
    /// Tactic category, e.g. "framing"
    #[serde(rename = "type")]
    pub kind: String,
}

/// Bias score, justification and tactics for one sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceAnalysis {
    pub sentence: String,
    /// Signed slant in [-1.0, 1.0]
    pub bias_score: f64,
    pub justification: String,
    #[serde(default)]
    pub tactics: Vec<TacticMention>,
}

impl SentenceAnalysis {
    /// Whether the score lies in [-1.0, 1.0].
    pub fn score_in_range(&self) -> bool {
        (-1.0..=1.0).contains(&self.bias_score)
    }
}

/// A perspective the text leaves out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Omission {
    pub omitted_perspective: String,
    pub potential_impact: String,
}

/// Complete analysis of a submitted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub foundational_assumptions: Vec<String>,
    /// One entry per sentence, in source order
    pub synthesized_text: Vec<SentenceAnalysis>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub omissions: Vec<Omission>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
