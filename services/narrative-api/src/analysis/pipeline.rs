//! The three-stage synthesis pipeline.
//!
//! ```text
//! text → assumptions → sentence analysis → omissions → SynthesisResult
//! ```
//!
//! Stages run one after another and any failure aborts the whole analysis.

use std::ops::Range;
use std::sync::Arc;

use narrative_common::config::Config;

use super::demo::canned_result;
use super::model::{Omission, SentenceAnalysis, SynthesisResult};
use super::parse::parse_stage_list;
use super::prompts::Stage;
use super::AnalysisError;
use crate::provider::{AzureOpenAIProvider, ChatRequest, Message, Provider, ProviderError};

/// Completion budget for each stage.
pub const MAX_TOKENS: i64 = 4096;

/// Sampling temperature for each stage.
pub const TEMPERATURE: f64 = 0.0;

/// Runs analyses against a provider, or serves canned data in demo mode.
#[derive(Clone)]
pub struct Analyzer {
    provider: Option<Arc<dyn Provider>>,
    demo_mode: bool,
}

impl Analyzer {
    /// Analyzer backed by a live provider.
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider: Some(provider),
            demo_mode: false,
        }
    }

    /// Analyzer that always returns the canned demo result.
    pub fn demo() -> Self {
        Self {
            provider: None,
            demo_mode: true,
        }
    }

    /// Build from configuration.
    ///
    /// Demo mode never constructs a provider. Outside demo mode, missing
    /// provider settings yield an analyzer whose calls fail with
    /// [`AnalysisError::NotConfigured`].
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        if config.demo_mode() {
            return Ok(Self::demo());
        }

        if !config.provider.is_complete() {
            tracing::warn!("Model provider settings are incomplete, analysis requests will fail");
        }

        let provider = AzureOpenAIProvider::from_config(&config.provider)?
            .map(|p| Arc::new(p) as Arc<dyn Provider>);

        Ok(Self {
            provider,
            demo_mode: false,
        })
    }

    /// Whether canned results are served.
    pub fn is_demo(&self) -> bool {
        self.demo_mode
    }

    /// Analyze `text`.
    ///
    /// The caller is responsible for rejecting empty text.
    pub async fn synthesize(&self, text: &str) -> Result<SynthesisResult, AnalysisError> {
        if self.demo_mode {
            tracing::info!("Demo mode active, returning canned analysis");
            return Ok(canned_result());
        }

        let provider = self.provider.as_deref().ok_or(AnalysisError::NotConfigured)?;

        tracing::info!(
            provider = provider.name(),
            model = provider.model(),
            text_chars = text.chars().count(),
            "Starting synthesis analysis"
        );

        let foundational_assumptions = foundational_assumptions(provider, text).await?;
        let synthesized_text = sentence_analysis(provider, text).await?;
        let omissions = omissions(provider, text).await?;

        tracing::info!(
            assumptions = foundational_assumptions.len(),
            sentences = synthesized_text.len(),
            omissions = omissions.len(),
            "Synthesis analysis complete"
        );

        Ok(SynthesisResult {
            foundational_assumptions,
            synthesized_text,
            omissions,
        })
    }
}

/// Stage 1: unstated beliefs behind the whole text.
async fn foundational_assumptions(
    provider: &dyn Provider,
    text: &str,
) -> Result<Vec<String>, AnalysisError> {
    let raw = call_stage(provider, Stage::Assumptions, text).await?;
    let assumptions: Vec<String> = parse_stage_list(Stage::Assumptions, &raw)?;

    Ok(assumptions
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect())
}

/// Stage 2: bias score and tactics per sentence.
async fn sentence_analysis(
    provider: &dyn Provider,
    text: &str,
) -> Result<Vec<SentenceAnalysis>, AnalysisError> {
    let raw = call_stage(provider, Stage::Sentences, text).await?;
    let sentences: Vec<SentenceAnalysis> = parse_stage_list(Stage::Sentences, &raw)?;
    normalize_sentences(text, sentences)
}

/// Stage 3: perspectives the text leaves out.
async fn omissions(provider: &dyn Provider, text: &str) -> Result<Vec<Omission>, AnalysisError> {
    let raw = call_stage(provider, Stage::Omissions, text).await?;
    parse_stage_list(Stage::Omissions, &raw)
}

async fn call_stage(
    provider: &dyn Provider,
    stage: Stage,
    text: &str,
) -> Result<String, AnalysisError> {
    let request = ChatRequest {
        model: provider.model().to_string(),
        messages: vec![Message::user(text)],
        max_tokens: Some(MAX_TOKENS),
        temperature: Some(TEMPERATURE),
        system: Some(stage.system_prompt().to_string()),
        json_mode: true,
    };

    let response = provider
        .chat(request)
        .await
        .map_err(|source| AnalysisError::Provider { stage, source })?;

    tracing::debug!(
        stage = %stage,
        latency_ms = response.latency_ms,
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
        "Stage completed"
    );

    Ok(response.content)
}

/// Enforce the sentence invariants on model output.
///
/// - every `bias_score` must lie in [-1, 1], otherwise the stage fails
/// - tactics whose phrase is not a literal substring of the sentence are dropped
/// - when every sentence can be located in `text`, entries are put in source order
pub fn normalize_sentences(
    text: &str,
    sentences: Vec<SentenceAnalysis>,
) -> Result<Vec<SentenceAnalysis>, AnalysisError> {
    let mut checked = Vec::with_capacity(sentences.len());

    for (index, mut entry) in sentences.into_iter().enumerate() {
        if !entry.score_in_range() {
            return Err(AnalysisError::OutOfRange {
                stage: Stage::Sentences,
                index,
                score: entry.bias_score,
            });
        }

        let before = entry.tactics.len();
        entry
            .tactics
            .retain(|t| !t.phrase.is_empty() && entry.sentence.contains(&t.phrase));
        let dropped = before - entry.tactics.len();
        if dropped > 0 {
            tracing::warn!(
                sentence_index = index,
                dropped,
                "Dropped tactics whose phrase does not occur in the sentence"
            );
        }

        checked.push(entry);
    }

    match source_positions(text, &checked) {
        Some(positions) => {
            let mut ordered: Vec<(usize, SentenceAnalysis)> =
                positions.into_iter().zip(checked).collect();
            ordered.sort_by_key(|(position, _)| *position);
            Ok(ordered.into_iter().map(|(_, entry)| entry).collect())
        }
        None => {
            tracing::debug!("Some sentences not found verbatim in text, keeping model order");
            Ok(checked)
        }
    }
}

/// Byte offset of each sentence in `text`, or `None` if any cannot be found.
///
/// Longer sentences are placed first, and a sentence only takes an occurrence
/// that does not overlap one already placed. A short sentence quoted inside a
/// longer one therefore resolves to its own occurrence, and repeated sentences
/// claim successive occurrences.
fn source_positions(text: &str, sentences: &[SentenceAnalysis]) -> Option<Vec<usize>> {
    let needles: Vec<&str> = sentences.iter().map(|e| e.sentence.trim()).collect();
    if needles.iter().any(|n| n.is_empty()) {
        return None;
    }

    let mut order: Vec<usize> = (0..needles.len()).collect();
    order.sort_by(|&a, &b| needles[b].len().cmp(&needles[a].len()));

    let mut placed: Vec<Range<usize>> = Vec::with_capacity(needles.len());
    let mut positions = vec![0; needles.len()];

    for index in order {
        let needle = needles[index];
        let range = text
            .match_indices(needle)
            .map(|(start, _)| start..start + needle.len())
            .find(|candidate| {
                !placed
                    .iter()
                    .any(|p| p.start < candidate.end && candidate.start < p.end)
            })?;
        positions[index] = range.start;
        placed.push(range);
    }

    Some(positions)
}
