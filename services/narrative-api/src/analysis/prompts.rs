//! Prompt and response-shape definitions for the three analysis stages.

use std::fmt;

/// One model call in the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Unstated beliefs the text relies on
    Assumptions,
    /// Per-sentence bias score and tactics
    Sentences,
    /// Missing perspectives
    Omissions,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 3] = [Stage::Assumptions, Stage::Sentences, Stage::Omissions];

    /// Short name used in logs and errors.
    pub const fn name(self) -> &'static str {
        match self {
            Stage::Assumptions => "assumptions",
            Stage::Sentences => "sentence_analysis",
            Stage::Omissions => "omissions",
        }
    }

    /// Top-level key the model is asked to wrap its list in.
    pub const fn envelope_key(self) -> &'static str {
        match self {
            Stage::Assumptions => "foundational_assumptions",
            Stage::Sentences => "sentence_analysis",
            Stage::Omissions => "omissions",
        }
    }

    /// System prompt for this stage. The submitted text is sent as the user message.
    pub const fn system_prompt(self) -> &'static str {
        match self {
            Stage::Assumptions => ASSUMPTIONS_PROMPT,
            Stage::Sentences => SENTENCE_ANALYSIS_PROMPT,
            Stage::Omissions => OMISSIONS_PROMPT,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const ASSUMPTIONS_PROMPT: &str = r#"You are an expert in critical thinking and epistemology.

The user message is a text to analyze. Identify the 3-5 most significant foundational assumptions in it: core beliefs the author takes for granted and expects the reader to accept without question. Consider beliefs about reality, knowledge, ethics, society, human nature, and the topic itself.

Respond with a single JSON object and nothing else, using exactly this structure:
{
    "foundational_assumptions": [
        "assumption 1",
        "assumption 2",
        "assumption 3"
    ]
}"#;

const SENTENCE_ANALYSIS_PROMPT: &str = r#"You are an expert in rhetoric and bias detection.

The user message is a text to analyze. Split it into sentences and analyze every sentence, keeping the order in which they appear.

For each sentence provide:
1. "sentence": the sentence copied exactly as it appears in the text.
2. "bias_score": a number from -1.0 (highly negative or critical) to 1.0 (highly positive or promotional); 0.0 is neutral.
3. "justification": a brief explanation of the score (under 200 characters).
4. "tactics": every rhetorical or persuasive tactic in the sentence, such as loaded language, appeals to authority, ad hominem or credibility attacks, false urgency, social proof, or rhetorical questions. For each tactic give:
   - "phrase": the exact words from the sentence, copied verbatim so they can be found in it
   - "tactic": the name of the tactic
   - "explanation": how it works here (under 150 characters)
   - "type": a short category such as "framing", "emotional", "credibility attack", "urgency"
   Use an empty list when the sentence has no tactics.

Respond with a single JSON object and nothing else, using exactly this structure:
{
    "sentence_analysis": [
        {
            "sentence": "exact sentence text",
            "bias_score": 0.0,
            "justification": "brief explanation",
            "tactics": [
                {
                    "phrase": "exact phrase",
                    "tactic": "Loaded Language",
                    "explanation": "how this works",
                    "type": "framing"
                }
            ]
        }
    ]
}"#;

const OMISSIONS_PROMPT: &str = r#"You are an expert in critical analysis and perspective-taking.

The user message is a text to analyze. Identify the 3-5 most important things it leaves out, drawing on these categories:
- stakeholder perspectives that are missing
- data, evidence, or sources that would be needed to support its claims
- reasonable counterarguments it does not address
- context or consequences it ignores

Respond with a single JSON object and nothing else, using exactly this structure:
{
    "omissions": [
        {
            "omitted_perspective": "description of the missing viewpoint",
            "potential_impact": "how this omission affects understanding"
        }
    ]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert_eq!(
            Stage::ALL,
            [Stage::Assumptions, Stage::Sentences, Stage::Omissions]
        );
    }

    #[test]
    fn test_prompts_name_their_envelope_key() {
        for stage in Stage::ALL {
            let key = format!("\"{}\"", stage.envelope_key());
            assert!(
                stage.system_prompt().contains(&key),
                "{} prompt does not mention {}",
                stage,
                key
            );
        }
    }

    #[test]
    fn test_sentence_prompt_demands_verbatim_phrases() {
        let prompt = Stage::Sentences.system_prompt();
        assert!(prompt.contains("verbatim"));
        assert!(prompt.contains("-1.0"));
    }
}
