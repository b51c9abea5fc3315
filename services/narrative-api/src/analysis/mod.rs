//! Narrative deconstruction.
//!
//! A submitted text goes through three model calls, each producing one part
//! of the [`SynthesisResult`]:
//!
//! ```text
//! text → foundational assumptions
//!      → per-sentence bias score + tactics
//!      → omitted perspectives
//! ```

pub mod demo;
pub mod model;
pub mod parse;
mod pipeline;
pub mod prompts;

pub use model::{AnalysisRequest, Omission, SentenceAnalysis, SynthesisResult, TacticMention};
pub use pipeline::{normalize_sentences, Analyzer, MAX_TOKENS, TEMPERATURE};
pub use prompts::Stage;

use crate::provider::ProviderError;

/// Why an analysis could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("no model provider is configured")]
    NotConfigured,

    #[error("{stage} request failed: {source}")]
    Provider {
        stage: Stage,
        #[source]
        source: ProviderError,
    },

    #[error("{stage} response was malformed: {reason}")]
    Malformed { stage: Stage, reason: String },

    #[error("{stage} entry {index} has bias score {score} outside [-1, 1]")]
    OutOfRange {
        stage: Stage,
        index: usize,
        score: f64,
    },
}

impl AnalysisError {
    /// The stage that failed, if the failure happened inside one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            AnalysisError::NotConfigured => None,
            AnalysisError::Provider { stage, .. }
            | AnalysisError::Malformed { stage, .. }
            | AnalysisError::OutOfRange { stage, .. } => Some(*stage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_stage() {
        let err = AnalysisError::Malformed {
            stage: Stage::Omissions,
            reason: "not valid JSON".into(),
        };
        assert_eq!(err.to_string(), "omissions response was malformed: not valid JSON");
        assert_eq!(err.stage(), Some(Stage::Omissions));

        let err = AnalysisError::OutOfRange {
            stage: Stage::Sentences,
            index: 2,
            score: 1.5,
        };
        assert_eq!(
            err.to_string(),
            "sentence_analysis entry 2 has bias score 1.5 outside [-1, 1]"
        );

        assert_eq!(AnalysisError::NotConfigured.stage(), None);
    }
}
