// src/interview/followup.rs
//! Follow-up questions that probe a previous answer instead of moving on.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::contains_any;
use super::types::{GeneratedQuestion, QuestionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpKind {
    Clarification,
    Example,
    Metrics,
    Constraints,
    Alternatives,
    Scale,
    Risks,
}

impl FollowUpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowUpKind::Clarification => "clarification",
            FollowUpKind::Example => "example",
            FollowUpKind::Metrics => "metrics",
            FollowUpKind::Constraints => "constraints",
            FollowUpKind::Alternatives => "alternatives",
            FollowUpKind::Scale => "scale",
            FollowUpKind::Risks => "risks",
        }
    }

    pub fn prompts(&self) -> &'static [&'static str] {
        match self {
            FollowUpKind::Clarification => &[
                "Can you clarify what you meant by that specific point?",
                "I'd like to understand your thinking process better on this.",
                "Could you elaborate on that particular aspect?",
            ],
            FollowUpKind::Example => &[
                "Can you walk me through a specific example where you implemented this approach?",
                "Tell me about a real situation where you used this solution.",
                "Give me a concrete example from your experience with this.",
            ],
            FollowUpKind::Metrics => &[
                "What metrics would you use to measure success in this scenario?",
                "How would you quantify the impact of this solution?",
                "What KPIs would you track to ensure this approach is working?",
            ],
            FollowUpKind::Constraints => &[
                "How would you handle this situation if you had half the resources?",
                "What if you had a much tighter deadline for this?",
                "How would this change if you had budget constraints?",
            ],
            FollowUpKind::Alternatives => &[
                "What alternative approaches did you consider and why did you choose this one?",
                "What are the trade-offs of your chosen approach?",
                "How would you modify this solution for a different context?",
            ],
            FollowUpKind::Scale => &[
                "How does this scale when dealing with 10x the volume/complexity?",
                "What challenges would arise if this system grew significantly?",
                "How would you architect this for global scale?",
            ],
            FollowUpKind::Risks => &[
                "What are the potential risks or downsides of this approach?",
                "What could go wrong with this solution?",
                "How would you mitigate the main risks?",
            ],
        }
    }
}

impl fmt::Display for FollowUpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered follow-up types for the last score and the question being probed.
pub fn sequence_for(score: u8, original_question: &str) -> &'static [FollowUpKind] {
    use FollowUpKind::*;

    if score < 60 {
        return &[Clarification, Example];
    }
    if score < 75 {
        return &[Example, Metrics];
    }

    let lower = original_question.to_lowercase();
    if contains_any(&lower, &["design", "system"]) {
        &[Scale, Risks, Alternatives]
    } else if contains_any(&lower, &["time", "challenge"]) {
        &[Metrics, Alternatives, Constraints]
    } else {
        &[Example, Scale, Risks]
    }
}

/// Per-session follow-up state. The position only moves forward.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FollowUpSequencer {
    position: usize,
    asked: Vec<FollowUpKind>,
}

impl FollowUpSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asked(&self) -> &[FollowUpKind] {
        &self.asked
    }

    /// Type for this call, then advance.
    pub fn next_kind(&mut self, score: u8, original_question: &str) -> FollowUpKind {
        let kind = sequence_for(score, original_question)
            .get(self.position)
            .copied()
            .unwrap_or(FollowUpKind::Clarification);
        self.position += 1;
        self.asked.push(kind);
        kind
    }

    pub fn next_question<R: Rng + ?Sized>(
        &mut self,
        score: u8,
        original_question: &str,
        difficulty: &str,
        rng: &mut R,
    ) -> GeneratedQuestion {
        let kind = self.next_kind(score, original_question);
        let text = kind
            .prompts()
            .choose(rng)
            .copied()
            .unwrap_or("Could you elaborate on that particular aspect?");

        GeneratedQuestion {
            question: text.to_string(),
            question_type: QuestionKind::Followup,
            category: "Deep-dive".to_string(),
            expected_duration: 2,
            difficulty: difficulty.to_string(),
            actual_difficulty: format!("Follow-up: {}", kind),
            context: format!("Structured follow-up to assess {} understanding", kind),
            bank_id: None,
        }
    }
}
