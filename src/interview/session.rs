// src/interview/session.rs
//! One interview attempt: question, answer, analysis, then a follow-up, the
//! next question, or the summary.
//!
//! The language model is tried first for every step while it is configured.
//! Any failure falls back to the question bank, the heuristic scorer or the
//! canned summary, so a session always reaches `Completed`.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ai;
use super::difficulty::{escalate, Difficulty};
use super::followup::FollowUpSequencer;
use super::question_bank::QuestionBank;
use super::scorer;
use super::selector::{self, QuestionSelector, SelectionRequest};
use super::summary;
use super::types::{
    AnswerAnalysis, GeneratedQuestion, InterviewContext, InterviewRecord, InterviewStyle,
    InterviewSummary, QuestionKind,
};
use crate::core::llm_client::TextGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewSettings {
    /// Answered questions before the session completes. Follow-ups count.
    pub max_turns: u32,
    /// Chance of probing with a follow-up when the analysis asks for one.
    pub followup_probability: f64,
}

impl Default for InterviewSettings {
    fn default() -> Self {
        Self {
            max_turns: 5,
            followup_probability: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SessionState {
    NotStarted,
    InProgress { turn: u32 },
    Completed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("interview has not been started")]
    NotStarted,
    #[error("interview has already been started")]
    AlreadyStarted,
    #[error("interview is already completed")]
    AlreadyCompleted,
    #[error("answer must not be empty")]
    EmptyAnswer,
    #[error("no question available for {role} / {difficulty}")]
    NoQuestionAvailable { role: String, difficulty: String },
}

/// Result of one submitted answer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum TurnOutcome {
    #[serde(rename_all = "camelCase")]
    Continue {
        analysis: AnswerAnalysis,
        interviewer_comment: String,
        next_question: GeneratedQuestion,
        turn: u32,
    },
    #[serde(rename_all = "camelCase")]
    Completed {
        analysis: AnswerAnalysis,
        summary: InterviewSummary,
        record: InterviewRecord,
    },
}

/// Read-only snapshot for callers that display progress.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub state: SessionState,
    pub job_role: String,
    pub difficulty: String,
    pub actual_difficulty: Difficulty,
    pub max_turns: u32,
    pub current_question: Option<GeneratedQuestion>,
    pub scores: Vec<u8>,
    pub started_at: DateTime<Utc>,
}

pub struct InterviewSession {
    user_id: String,
    context: InterviewContext,
    state: SessionState,
    settings: InterviewSettings,
    escalated: Difficulty,
    bank: Arc<QuestionBank>,
    generator: Arc<dyn TextGenerator>,
    use_llm_questions: bool,
    followups: FollowUpSequencer,
    current: Option<GeneratedQuestion>,
    last_main_question: String,
    questions: Vec<GeneratedQuestion>,
    analyses: Vec<AnswerAnalysis>,
    summary: Option<InterviewSummary>,
    started_at: DateTime<Utc>,
    rng: StdRng,
}

impl InterviewSession {
    pub fn new(
        user_id: impl Into<String>,
        context: InterviewContext,
        settings: InterviewSettings,
        bank: Arc<QuestionBank>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let escalated = escalate(&context.difficulty);
        Self {
            user_id: user_id.into(),
            context,
            state: SessionState::NotStarted,
            settings,
            escalated,
            bank,
            use_llm_questions: generator.is_enabled(),
            generator,
            followups: FollowUpSequencer::new(),
            current: None,
            last_main_question: String::new(),
            questions: Vec::new(),
            analyses: Vec::new(),
            summary: None,
            started_at: Utc::now(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the entropy-seeded generator, for reproducible runs.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn id(&self) -> Uuid {
        self.context.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn context(&self) -> &InterviewContext {
        &self.context
    }

    pub fn current_question(&self) -> Option<&GeneratedQuestion> {
        self.current.as_ref()
    }

    pub fn escalated_difficulty(&self) -> Difficulty {
        self.escalated
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id(),
            state: self.state,
            job_role: self.context.job_role.clone(),
            difficulty: self.context.difficulty.clone(),
            actual_difficulty: self.escalated,
            max_turns: self.settings.max_turns,
            current_question: self.current.clone(),
            scores: self.context.previous_scores.clone(),
            started_at: self.started_at,
        }
    }

    /// Ask the first question.
    pub async fn start(&mut self) -> Result<GeneratedQuestion, SessionError> {
        match self.state {
            SessionState::NotStarted => {}
            SessionState::InProgress { .. } => return Err(SessionError::AlreadyStarted),
            SessionState::Completed => return Err(SessionError::AlreadyCompleted),
        }

        info!(
            "Starting interview {} for {} at {} (questions at {})",
            self.id(),
            self.context.job_role,
            self.context.difficulty,
            self.escalated
        );
        self.started_at = Utc::now();

        let question = self.next_main_question().await?;
        self.state = SessionState::InProgress { turn: 1 };
        self.current = Some(question.clone());
        Ok(question)
    }

    pub async fn submit_answer(&mut self, answer: &str) -> Result<TurnOutcome, SessionError> {
        let turn = match self.state {
            SessionState::InProgress { turn } => turn,
            SessionState::NotStarted => return Err(SessionError::NotStarted),
            SessionState::Completed => return Err(SessionError::AlreadyCompleted),
        };
        if answer.trim().is_empty() {
            return Err(SessionError::EmptyAnswer);
        }
        let question = self.current.take().ok_or(SessionError::NotStarted)?;

        let analysis = self.analyze(&question.question, answer).await;
        debug!(
            "Turn {} of interview {} scored {} ({:?})",
            turn,
            self.id(),
            analysis.score,
            analysis.source
        );

        self.context
            .record_turn(&question.question, answer, analysis.score);
        self.questions.push(question);
        self.analyses.push(analysis.clone());

        if turn >= self.settings.max_turns {
            let summary = self.summarize().await;
            self.state = SessionState::Completed;
            self.summary = Some(summary.clone());
            info!(
                "Interview {} completed with overall score {}",
                self.id(),
                summary::overall_score(&self.analyses)
            );
            let record = self.build_record(summary.clone());
            return Ok(TurnOutcome::Completed {
                analysis,
                summary,
                record,
            });
        }

        let wants_follow_up = analysis.follow_up_needed
            && self.rng.gen::<f64>() < self.settings.followup_probability;

        let next_question = if wants_follow_up {
            self.followups.next_question(
                analysis.score,
                &self.last_main_question,
                &self.context.difficulty,
                &mut self.rng,
            )
        } else {
            self.next_main_question().await?
        };

        let next_turn = turn + 1;
        self.state = SessionState::InProgress { turn: next_turn };
        self.current = Some(next_question.clone());

        Ok(TurnOutcome::Continue {
            analysis,
            interviewer_comment: ai::interviewer_comment(&mut self.rng).to_string(),
            next_question,
            turn: next_turn,
        })
    }

    /// Finished record, once the session is completed.
    pub fn to_record(&self) -> Option<InterviewRecord> {
        match (self.state, &self.summary) {
            (SessionState::Completed, Some(summary)) => Some(self.build_record(summary.clone())),
            _ => None,
        }
    }

    fn build_record(&self, summary: InterviewSummary) -> InterviewRecord {
        let elapsed = (Utc::now() - self.started_at).num_seconds().max(0) as u64;
        InterviewRecord {
            id: self.id(),
            user_id: self.user_id.clone(),
            job_role: self.context.job_role.clone(),
            difficulty: self.context.difficulty.clone(),
            questions: self.questions.clone(),
            answers: self.context.previous_answers.clone(),
            analyses: self.analyses.clone(),
            time_elapsed: elapsed,
            completed_at: Utc::now(),
            overall_score: summary::overall_score(&self.analyses),
            interview_summary: Some(summary),
        }
    }

    fn category_filter(&self) -> Option<String> {
        self.context
            .question_category
            .clone()
            .or_else(|| match self.context.interview_style {
                InterviewStyle::Technical => Some("Technical".to_string()),
                InterviewStyle::Behavioral => Some("Behavioral".to_string()),
                InterviewStyle::Mixed => None,
            })
    }

    async fn next_main_question(&mut self) -> Result<GeneratedQuestion, SessionError> {
        if self.use_llm_questions {
            match ai::generate_question(self.generator.as_ref(), &self.context, self.escalated)
                .await
            {
                Ok(question) => {
                    self.last_main_question = question.question.clone();
                    return Ok(question);
                }
                Err(e) => {
                    warn!(
                        "Question generation failed for interview {}, using question bank from now on: {}",
                        self.id(),
                        e
                    );
                    self.use_llm_questions = false;
                }
            }
        }

        let category = self.category_filter();
        let request = SelectionRequest {
            role: &self.context.job_role,
            requested: &self.context.difficulty,
            escalated: self.escalated,
            category: category.as_deref(),
        };

        let selector = QuestionSelector::new(&self.bank);
        let entry = selector
            .select(&request, &mut self.context.used_question_ids, &mut self.rng)
            .ok_or_else(|| SessionError::NoQuestionAvailable {
                role: self.context.job_role.clone(),
                difficulty: self.escalated.to_string(),
            })?;

        let question = selector::to_generated(entry, &self.context.difficulty, self.escalated);
        self.last_main_question = question.question.clone();
        Ok(question)
    }

    async fn analyze(&self, question: &str, answer: &str) -> AnswerAnalysis {
        if self.generator.is_enabled() {
            match ai::analyze_answer(self.generator.as_ref(), &self.context, question, answer).await
            {
                Ok(analysis) => return analysis,
                Err(e) => warn!("Answer analysis failed, using heuristic scoring: {}", e),
            }
        }
        scorer::analyze(answer, &self.context.job_role, &self.context.difficulty)
    }

    async fn summarize(&self) -> InterviewSummary {
        if self.generator.is_enabled() {
            match ai::summarize(
                self.generator.as_ref(),
                &self.context.job_role,
                self.questions.len(),
                &self.analyses,
            )
            .await
            {
                Ok(summary) => return summary,
                Err(e) => warn!("Summary generation failed, using fallback summary: {}", e),
            }
        }
        summary::fallback_summary(&self.context.job_role, &self.analyses)
    }

    /// Number of answered follow-up questions.
    pub fn follow_up_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.question_type == QuestionKind::Followup)
            .count()
    }
}
