//! Structural parsing of model output.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::prompts::Stage;
use super::AnalysisError;

/// Remove a surrounding markdown code fence, if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    trimmed
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse a stage response into its list of items.
///
/// Accepts `{"<envelope_key>": [...]}` or a bare `[...]`.
pub fn parse_stage_list<T: DeserializeOwned>(
    stage: Stage,
    raw: &str,
) -> Result<Vec<T>, AnalysisError> {
    let malformed = |reason: String| AnalysisError::Malformed { stage, reason };

    let value: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| malformed(format!("not valid JSON: {}", e)))?;

    let list = match value {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map
            .remove(stage.envelope_key())
            .ok_or_else(|| malformed(format!("missing \"{}\" key", stage.envelope_key())))?,
        other => {
            return Err(malformed(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };

    if !list.is_array() {
        return Err(malformed(format!(
            "\"{}\" must be a list, got {}",
            stage.envelope_key(),
            json_kind(&list)
        )));
    }

    serde_json::from_value(list).map_err(|e| malformed(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::model::{Omission, SentenceAnalysis};

    #[test]
    fn test_strip_code_fence() {
        let cases = vec![
            ("{\"a\": 1}", "{\"a\": 1}"),
            ("```json\n{\"a\": 1}\n```", "{\"a\": 1}"),
            ("```\n[1]\n```", "[1]"),
            ("  \n```JSON\n[]```  ", "[]"),
        ];

        for (input, expected) in cases {
            assert_eq!(strip_code_fence(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_parse_envelope() {
        let raw = r#"{"foundational_assumptions": ["Markets are rational", "Growth is good"]}"#;
        let items: Vec<String> = parse_stage_list(Stage::Assumptions, raw).unwrap();
        assert_eq!(items, vec!["Markets are rational", "Growth is good"]);
    }

    #[test]
    fn test_parse_bare_array() {
        let raw = r#"```json
[{"omitted_perspective": "Workers", "potential_impact": "Labour costs are hidden"}]
```"#;
        let items: Vec<Omission> = parse_stage_list(Stage::Omissions, raw).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].omitted_perspective, "Workers");
    }

    #[test]
    fn test_missing_key_is_malformed() {
        let err = parse_stage_list::<String>(Stage::Assumptions, r#"{"assumptions": []}"#)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Malformed { stage: Stage::Assumptions, .. }));
        assert!(err.to_string().contains("foundational_assumptions"));
    }

    #[test]
    fn test_non_json_is_malformed() {
        let err = parse_stage_list::<String>(Stage::Assumptions, "Sure! Here are some").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_wrong_item_shape_is_malformed() {
        let raw = r#"{"sentence_analysis": [{"sentence": "Hi.", "bias_score": "high"}]}"#;
        let err = parse_stage_list::<SentenceAnalysis>(Stage::Sentences, raw).unwrap_err();
        assert!(matches!(err, AnalysisError::Malformed { stage: Stage::Sentences, .. }));
    }

    #[test]
    fn test_envelope_value_must_be_list() {
        let err = parse_stage_list::<Omission>(Stage::Omissions, r#"{"omissions": null}"#)
            .unwrap_err();
        assert!(err.to_string().contains("must be a list, got null"));
    }
}
