// src/interview/difficulty.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seniority band a question bank cell is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "Entry Level")]
    Entry,
    #[serde(rename = "Mid Level")]
    Mid,
    #[serde(rename = "Senior Level")]
    Senior,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Entry, Difficulty::Mid, Difficulty::Senior];

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Entry => "Entry Level",
            Difficulty::Mid => "Mid Level",
            Difficulty::Senior => "Senior Level",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label.trim())
    }

    /// One level above this one, saturating at senior.
    pub fn next_level(&self) -> Self {
        match self {
            Difficulty::Entry => Difficulty::Mid,
            Difficulty::Mid | Difficulty::Senior => Difficulty::Senior,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Level questions are actually served at for a user-selected difficulty.
/// Unknown labels land on mid level.
pub fn escalate(selected: &str) -> Difficulty {
    Difficulty::from_label(selected)
        .map(|d| d.next_level())
        .unwrap_or(Difficulty::Mid)
}
