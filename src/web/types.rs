// src/web/types.rs

use crate::interview::analytics::HistoryAnalytics;
use crate::interview::difficulty::Difficulty;
use crate::interview::question_bank::CellCoverage;
use crate::interview::types::{GeneratedQuestion, InterviewStyle};
use rocket::serde::{Deserialize, Serialize};
use uuid::Uuid;

// Request types

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StartInterviewRequest {
    pub job_role: String,
    pub difficulty: String,
    #[serde(default)]
    pub company_type: Option<String>,
    #[serde(default)]
    pub question_category: Option<String>,
    #[serde(default)]
    pub interview_style: Option<InterviewStyle>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct SubmitAnswerRequest {
    pub answer: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

// Response data

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StartInterviewData {
    pub session_id: Uuid,
    pub question: GeneratedQuestion,
    pub actual_difficulty: Difficulty,
    pub max_turns: u32,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct OptionsData {
    pub job_roles: Vec<String>,
    pub difficulties: Vec<&'static str>,
    pub company_types: Vec<&'static str>,
    pub question_categories: Vec<String>,
    pub interview_styles: Vec<InterviewStyle>,
    pub bank_coverage: Vec<CellCoverage>,
    /// Name of the language model backend, "disabled" when none is set up.
    pub generator: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AnalyticsData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<i64>,
    #[serde(flatten)]
    pub analytics: HistoryAnalytics,
}

// Standard response envelope

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_actions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Action,
    Error,
}

// Request types with conversation_id support
#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardRequest<T> {
    #[serde(flatten)]
    pub data: T,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

// Helper trait for extracting conversation_id
pub trait WithConversationId {
    fn conversation_id(&self) -> Option<String>;
}

impl<T> WithConversationId for StandardRequest<T> {
    fn conversation_id(&self) -> Option<String> {
        self.conversation_id.clone()
    }
}

// Helper functions to create standard responses
impl TextResponse {
    pub fn success(message: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
            conversation_id,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
            conversation_id,
        }
    }
}

impl ActionResponse {
    pub fn success(message: String, action: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message,
            action,
            next_actions: None,
            conversation_id,
        }
    }

    pub fn with_next_actions(mut self, next_actions: Vec<String>) -> Self {
        self.next_actions = Some(next_actions);
        self
    }
}

impl StandardErrorResponse {
    pub fn new(
        error: String,
        error_code: String,
        suggestions: Vec<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
            conversation_id,
        }
    }
}
