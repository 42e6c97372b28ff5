// src/interview/mod.rs
pub mod ai;
pub mod analytics;
pub mod difficulty;
pub mod followup;
pub mod question_bank;
pub mod scorer;
pub mod selector;
pub mod session;
pub mod summary;
pub mod types;

pub use difficulty::{escalate, Difficulty};
pub use question_bank::{BankError, QuestionBank, QuestionBankEntry};
pub use session::{InterviewSession, InterviewSettings, SessionError, SessionState, TurnOutcome};
pub use types::*;

pub(crate) fn contains_any(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|w| haystack.contains(w))
}
