//! Canned analysis served in demo mode.
//!
//! The same result is returned for every input, so the interface can be
//! explored without provider credentials or model cost.

use super::model::{Omission, SentenceAnalysis, SynthesisResult, TacticMention};

fn tactic(phrase: &str, tactic: &str, explanation: &str, kind: &str) -> TacticMention {
    TacticMention {
        phrase: phrase.into(),
        tactic: tactic.into(),
        explanation: explanation.into(),
        kind: kind.into(),
    }
}

fn sentence(
    text: &str,
    bias_score: f64,
    justification: &str,
    tactics: Vec<TacticMention>,
) -> SentenceAnalysis {
    SentenceAnalysis {
        sentence: text.into(),
        bias_score,
        justification: justification.into(),
        tactics,
    }
}

fn omission(perspective: &str, impact: &str) -> Omission {
    Omission {
        omitted_perspective: perspective.into(),
        potential_impact: impact.into(),
    }
}

/// The fixed demo result.
pub fn canned_result() -> SynthesisResult {
    let foundational_assumptions = vec![
        "Nation-states are the primary legitimate political units for organizing society",
        "External resource extraction is inherently exploitative rather than potentially beneficial",
        "There exists an objective measure of how well nations 'use their resources'",
        "Political ideologies are primarily systems of control rather than genuine belief systems",
        "Progress is a questionable concept that may not exist in any meaningful sense",
        "All aspirations created by ideological systems are artificially manufactured rather than authentic",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    let synthesized_text = vec![
        sentence(
            "Every country, every piece of land, has the raw potential for a happy, satisfied life.",
            0.3,
            "Presents an idealistic view that oversimplifies complex geopolitical realities and assumes universal definitions of 'happiness' and 'satisfaction'",
            vec![],
        ),
        sentence(
            "But the moment external hands start extracting resources without contributing to local development.. boom, the whole balance shatters.",
            -0.7,
            "Uses loaded language and dramatic framing to portray all external resource extraction as inherently destructive, ignoring potential benefits or collaborative arrangements",
            vec![
                tactic(
                    "external hands start extracting",
                    "Loaded Language",
                    "Uses emotionally charged language to frame resource extraction as inherently exploitative",
                    "framing",
                ),
                tactic(
                    "boom, the whole balance shatters",
                    "Dramatic Escalation",
                    "Uses dramatic language to amplify the perceived consequences",
                    "emotional manipulation",
                ),
            ],
        ),
        sentence(
            "Now let's play fair.",
            -0.4,
            "Frames the following argument as inherently fair while actually introducing contested political premises",
            vec![tactic(
                "Now let's play fair",
                "False Fairness Appeal",
                "Presents a biased premise as if it's the fair or reasonable position",
                "false premise",
            )],
        ),
        sentence(
            "Assume nation-states are real.",
            0.1,
            "While seemingly neutral, this assumption privileges the Westphalian state system over other forms of political organization",
            vec![],
        ),
        sentence(
            "Tangible.",
            0.2,
            "Emphasizes the material reality of borders while ignoring their constructed and contested nature",
            vec![],
        ),
        sentence(
            "The rightful owners of the land within their borders.",
            -0.6,
            "Presents a highly contested claim about territorial sovereignty as fact, ignoring indigenous rights and historical complexities",
            vec![],
        ),
        sentence(
            "That's the common-sense view, right?",
            -0.5,
            "Uses rhetorical validation to make a contested political position seem like obvious common sense",
            vec![tactic(
                "That's the common-sense view, right?",
                "Rhetorical Validation",
                "Uses rhetorical questions to make contested claims seem obvious",
                "consensus manipulation",
            )],
        ),
        sentence(
            "So if \"progress\" exists, it's only valid under the assumption that nations are using their resources well and running their ideologies efficiently.",
            0.4,
            "Makes progress conditional on national efficiency while putting 'progress' in scare quotes, suggesting skepticism about the concept itself",
            vec![],
        ),
        sentence(
            "But that's where things get spicy because not everyone wants the same life.",
            -0.3,
            "Uses casual language to minimize serious ideological conflicts and cultural differences",
            vec![tactic(
                "things get spicy",
                "Casual Metaphor",
                "Uses informal language to normalize complex political-economic conflicts",
                "minimization",
            )],
        ),
        sentence(
            "Cue the arrival of economic and political ideology.",
            0.2,
            "Presents ideology as something external that 'arrives' rather than something inherent to all political systems",
            vec![],
        ),
        sentence(
            "And when ideals start mass-producing aspirations, you've got yourself a system of control.",
            -0.8,
            "Uses industrial metaphors to frame all ideological influence as manipulative control, ignoring legitimate political mobilization",
            vec![tactic(
                "mass-producing aspirations",
                "Industrial Metaphor",
                "Frames human desires and goals as manufactured products to suggest manipulation",
                "mechanistic framing",
            )],
        ),
    ];

    let omissions = vec![
        omission(
            "Indigenous sovereignty and land rights",
            "Fails to acknowledge that many current nation-state borders were established through colonization, ignoring indigenous claims and alternative concepts of territorial sovereignty",
        ),
        omission(
            "Benefits of international trade and cooperation",
            "The framing of all external involvement as extractive ignores mutual benefits, technology transfer, and collaborative development that can result from international engagement",
        ),
        omission(
            "Historical context of resource extraction",
            "Lacks discussion of how colonial histories shape current resource relationships, missing important context for understanding contemporary dynamics",
        ),
        omission(
            "Alternative political organization models",
            "By assuming nation-states as the natural unit, it ignores federal systems, supranational governance, and other forms of political organization",
        ),
        omission(
            "Positive aspects of ideological mobilization",
            "Framing all ideology as control mechanisms ignores how shared values and ideals can enable positive social movements and democratic participation",
        ),
    ];

    SynthesisResult {
        foundational_assumptions,
        synthesized_text,
        omissions,
    }
}
