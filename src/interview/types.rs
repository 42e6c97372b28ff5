// src/interview/types.rs
//! Canonical data contract shared by the engine, the API and the history store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStyle {
    Technical,
    Behavioral,
    #[default]
    Mixed,
}

/// Everything a session knows about the interview so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewContext {
    pub session_id: Uuid,
    pub job_role: String,
    pub difficulty: String,
    pub current_question_number: u32,
    pub previous_questions: Vec<String>,
    pub previous_answers: Vec<String>,
    pub previous_scores: Vec<u8>,
    pub interview_style: InterviewStyle,
    pub company_type: Option<String>,
    pub question_category: Option<String>,
    #[serde(skip)]
    pub used_question_ids: HashSet<String>,
}

impl InterviewContext {
    pub fn new(job_role: String, difficulty: String) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            job_role,
            difficulty,
            current_question_number: 1,
            previous_questions: Vec::new(),
            previous_answers: Vec::new(),
            previous_scores: Vec::new(),
            interview_style: InterviewStyle::default(),
            company_type: None,
            question_category: None,
            used_question_ids: HashSet::new(),
        }
    }

    pub fn with_company_type(mut self, company_type: Option<String>) -> Self {
        self.company_type = company_type.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.question_category = category.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_style(mut self, style: InterviewStyle) -> Self {
        self.interview_style = style;
        self
    }

    pub fn average_score(&self) -> Option<f64> {
        if self.previous_scores.is_empty() {
            return None;
        }
        let total: u32 = self.previous_scores.iter().map(|s| *s as u32).sum();
        Some(total as f64 / self.previous_scores.len() as f64)
    }

    /// Append one answered question and move the counter forward.
    pub fn record_turn(&mut self, question: &str, answer: &str, score: u8) {
        self.previous_questions.push(question.to_string());
        self.previous_answers.push(answer.to_string());
        self.previous_scores.push(score);
        self.current_question_number += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    #[default]
    Main,
    Followup,
    Clarification,
    DeepDive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    pub question: String,
    #[serde(default)]
    pub question_type: QuestionKind,
    #[serde(default)]
    pub category: String,
    /// Minutes the candidate is expected to spend.
    #[serde(default = "default_duration")]
    pub expected_duration: u32,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub actual_difficulty: String,
    #[serde(default)]
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_id: Option<String>,
}

fn default_duration() -> u32 {
    3
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NextDirection {
    Easier,
    Harder,
    #[default]
    Same,
    DifferentTopic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Ai,
    #[default]
    Heuristic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerAnalysis {
    pub score: u8,
    #[serde(default)]
    pub detailed_feedback: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub improvement_suggestions: Vec<String>,
    #[serde(default)]
    pub ideal_answer: String,
    #[serde(default)]
    pub next_question_direction: NextDirection,
    #[serde(default)]
    pub follow_up_needed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality_check: Option<String>,
    #[serde(default)]
    pub industry_standard: String,
    #[serde(default)]
    pub source: AnalysisSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSummary {
    #[serde(default)]
    pub overall_feedback: String,
    #[serde(default)]
    pub key_strengths: Vec<String>,
    #[serde(default)]
    pub critical_improvements: Vec<String>,
    #[serde(default)]
    pub readiness_score: u8,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality_check: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_comparison: Option<String>,
}

/// A finished interview as kept in history. Older or simplified records may
/// lack any of the optional parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRecord {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub job_role: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub questions: Vec<GeneratedQuestion>,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub analyses: Vec<AnswerAnalysis>,
    #[serde(default)]
    pub time_elapsed: u64,
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub overall_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_summary: Option<InterviewSummary>,
}

impl InterviewRecord {
    /// Reduced form kept when the full record cannot be stored.
    pub fn simplified(&self) -> SimplifiedRecord {
        SimplifiedRecord {
            id: self.id,
            user_id: self.user_id.clone(),
            job_role: self.job_role.clone(),
            difficulty: self.difficulty.clone(),
            questions: self
                .questions
                .iter()
                .map(|q| SimplifiedQuestion {
                    question: q.question.clone(),
                    category: q.category.clone(),
                    difficulty: q.difficulty.clone(),
                })
                .collect(),
            answers: self.answers.clone(),
            analyses: self
                .analyses
                .iter()
                .map(|a| SimplifiedAnalysis {
                    score: a.score,
                    strengths: a.strengths.clone(),
                    weaknesses: a.weaknesses.clone(),
                })
                .collect(),
            time_elapsed: self.time_elapsed,
            completed_at: self.completed_at,
            overall_score: self.overall_score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedRecord {
    pub id: Uuid,
    pub user_id: String,
    pub job_role: String,
    pub difficulty: String,
    pub questions: Vec<SimplifiedQuestion>,
    pub answers: Vec<String>,
    pub analyses: Vec<SimplifiedAnalysis>,
    pub time_elapsed: u64,
    pub completed_at: DateTime<Utc>,
    pub overall_score: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimplifiedQuestion {
    pub question: String,
    pub category: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimplifiedAnalysis {
    pub score: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_score() {
        let mut ctx = InterviewContext::new("Software Engineer".into(), "Entry Level".into());
        assert_eq!(ctx.average_score(), None);
        ctx.record_turn("q1", "a1", 60);
        ctx.record_turn("q2", "a2", 71);
        assert_eq!(ctx.average_score(), Some(65.5));
        assert_eq!(ctx.current_question_number, 3);
    }

    #[test]
    fn test_simplified_record_reads_back_as_full_record() {
        let json = r#"{
            "id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
            "jobRole": "Data Scientist",
            "difficulty": "Mid Level",
            "questions": [{"question": "Explain regularization.", "category": "Technical", "difficulty": "Mid Level"}],
            "answers": ["L1 and L2 penalties."],
            "analyses": [{"score": 62, "strengths": [], "weaknesses": ["Too brief"]}],
            "timeElapsed": 420,
            "completedAt": "2024-05-01T10:00:00Z",
            "overallScore": 62
        }"#;

        let record: InterviewRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.questions[0].question_type, QuestionKind::Main);
        assert_eq!(record.analyses[0].weaknesses, vec!["Too brief".to_string()]);
        assert!(record.interview_summary.is_none());
        assert!(record.user_id.is_empty());
    }

    #[test]
    fn test_record_missing_optional_fields() {
        let json = r#"{"id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427", "completedAt": "2024-05-01T10:00:00Z"}"#;
        let record: InterviewRecord = serde_json::from_str(json).unwrap();
        assert!(record.answers.is_empty());
        assert_eq!(record.overall_score, 0);
    }
}
