//! HTML rendering of a synthesis result.
//!
//! Produces a self-contained fragment with three sections:
//! - foundational assumptions as a list
//! - the text as a running paragraph, one tinted `span.sentence` per entry,
//!   tactic phrases wrapped in `span.tactic` and a hover tooltip per sentence
//! - omissions as a list
//!
//! All model-provided text is escaped before it is written.

use std::fmt::Write;
use std::ops::Range;

use crate::analysis::{SentenceAnalysis, SynthesisResult, TacticMention};

/// Scores with magnitude at or below this are rendered untinted.
pub const TINT_DEADBAND: f64 = 0.1;

/// Background opacity at |score| = 1.
const MAX_TINT_ALPHA: f64 = 0.6;

const NEGATIVE_RGB: (u8, u8, u8) = (220, 38, 38);
const POSITIVE_RGB: (u8, u8, u8) = (22, 163, 74);

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// CSS background color for a bias score, or `None` inside the deadband.
///
/// Negative scores are red, positive green, with opacity proportional to
/// the magnitude.
pub fn tint(score: f64) -> Option<String> {
    if !score.is_finite() || score.abs() <= TINT_DEADBAND {
        return None;
    }

    let (r, g, b) = if score < 0.0 { NEGATIVE_RGB } else { POSITIVE_RGB };
    let alpha = score.abs().min(1.0) * MAX_TINT_ALPHA;
    Some(format!("rgba({r}, {g}, {b}, {alpha:.2})"))
}

/// A highlighted region of a sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    /// Byte range within the sentence
    pub range: Range<usize>,
    /// Index of the tactic in the sentence's tactic list
    pub tactic: usize,
}

/// Choose which tactic phrases to highlight.
///
/// Longer phrases are placed first. Each phrase takes its first occurrence
/// that does not overlap a region already taken; a phrase with no such
/// occurrence is not highlighted. The result is ordered by position.
pub fn highlight_spans(sentence: &str, tactics: &[TacticMention]) -> Vec<Highlight> {
    let mut order: Vec<usize> = (0..tactics.len()).collect();
    order.sort_by(|&a, &b| tactics[b].phrase.len().cmp(&tactics[a].phrase.len()));

    let mut claimed: Vec<Highlight> = Vec::new();
    for index in order {
        let phrase = tactics[index].phrase.as_str();
        if phrase.is_empty() {
            continue;
        }

        let free = sentence
            .match_indices(phrase)
            .map(|(start, _)| start..start + phrase.len())
            .find(|candidate| !claimed.iter().any(|h| overlaps(&h.range, candidate)));

        if let Some(range) = free {
            claimed.push(Highlight {
                range,
                tactic: index,
            });
        }
    }

    claimed.sort_by_key(|h| h.range.start);
    claimed
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Tooltip lines for a sentence: score, justification, then one per tactic.
pub fn tooltip_lines(entry: &SentenceAnalysis) -> Vec<String> {
    let mut lines = vec![format!("Bias score: {:+.2}", entry.bias_score)];
    if !entry.justification.trim().is_empty() {
        lines.push(entry.justification.clone());
    }
    for t in &entry.tactics {
        lines.push(format!("{} ({}): {}", t.tactic, t.kind, t.explanation));
    }
    lines
}

/// Render one sentence with its tint, highlights and tooltip.
pub fn render_sentence(entry: &SentenceAnalysis) -> String {
    let mut html = String::new();

    let _ = write!(
        html,
        r#"<span class="sentence" data-score="{:.2}""#,
        entry.bias_score
    );
    if let Some(color) = tint(entry.bias_score) {
        let _ = write!(html, r#" style="background-color: {color}""#);
    }
    html.push_str(" tabindex=\"0\">");

    let sentence = entry.sentence.as_str();
    let mut cursor = 0;
    for h in highlight_spans(sentence, &entry.tactics) {
        html.push_str(&escape_html(&sentence[cursor..h.range.start]));
        let tactic = &entry.tactics[h.tactic];
        let _ = write!(
            html,
            r#"<span class="tactic" data-tactic="{}" data-type="{}">{}</span>"#,
            escape_html(&tactic.tactic),
            escape_html(&tactic.kind),
            escape_html(&sentence[h.range.clone()])
        );
        cursor = h.range.end;
    }
    html.push_str(&escape_html(&sentence[cursor..]));

    html.push_str(r#"<span class="tooltip" role="tooltip">"#);
    for line in tooltip_lines(entry) {
        let _ = write!(
            html,
            r#"<span class="tooltip-line">{}</span>"#,
            escape_html(&line)
        );
    }
    html.push_str("</span></span>");

    html
}

/// Render the full result as an HTML fragment.
pub fn render_result(result: &SynthesisResult) -> String {
    let mut html = String::new();

    html.push_str(r#"<section class="assumptions"><h2>Foundational Assumptions</h2>"#);
    push_list(&mut html, &result.foundational_assumptions, |a| escape_html(a));
    html.push_str("</section>");

    html.push_str(r#"<section class="synthesis"><h2>Synthesized Text</h2>"#);
    if result.synthesized_text.is_empty() {
        html.push_str(r#"<p class="empty">No sentences were analyzed.</p>"#);
    } else {
        html.push_str(r#"<p class="synthesized-text">"#);
        let sentences: Vec<String> = result.synthesized_text.iter().map(render_sentence).collect();
        html.push_str(&sentences.join(" "));
        html.push_str("</p>");
    }
    html.push_str("</section>");

    html.push_str(r#"<section class="omissions"><h2>Omissions</h2>"#);
    push_list(&mut html, &result.omissions, |o| {
        format!(
            "<strong>{}</strong>: {}",
            escape_html(&o.omitted_perspective),
            escape_html(&o.potential_impact)
        )
    });
    html.push_str("</section>");

    html
}

fn push_list<T>(html: &mut String, items: &[T], item_html: impl Fn(&T) -> String) {
    if items.is_empty() {
        html.push_str(r#"<p class="empty">None identified.</p>"#);
        return;
    }

    html.push_str("<ul>");
    for item in items {
        let _ = write!(html, "<li>{}</li>", item_html(item));
    }
    html.push_str("</ul>");
}
