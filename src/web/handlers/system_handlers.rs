// src/web/handlers/system_handlers.rs
use super::{api_error, ApiError};
use crate::auth::OptionalAuth;
use crate::core::database::Database;
use crate::interview::{Difficulty, InterviewStyle};
use crate::web::types::*;
use crate::web::Engine;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

/// Roles offered in the setup form, in display order.
pub const JOB_ROLES: [&str; 13] = [
    "Software Engineer",
    "Senior Software Engineer",
    "Product Manager",
    "Senior Product Manager",
    "Data Scientist",
    "Senior Data Scientist",
    "Marketing Manager",
    "Sales Representative",
    "Business Analyst",
    "UX Designer",
    "DevOps Engineer",
    "Financial Analyst",
    "HR Manager",
];

pub const COMPANY_TYPES: [&str; 6] = [
    "Startup",
    "Big Tech",
    "Enterprise",
    "Consulting",
    "Finance",
    "Healthcare",
];

pub async fn health_handler(
    auth: OptionalAuth,
    db: &State<Database>,
) -> Result<Json<TextResponse>, ApiError> {
    if let Some(user) = &auth.user {
        info!("Health check from {}", user.uid());
    }

    db.health_check().await.map_err(|e| {
        error!("Database health check failed: {:#}", e);
        api_error(
            Status::ServiceUnavailable,
            "Database unavailable",
            "DATABASE_UNAVAILABLE",
            &["Check the database path and permissions"],
            None,
        )
    })?;

    Ok(Json(TextResponse::success("OK".to_string(), None)))
}

pub async fn options_handler(engine: &State<Engine>) -> Json<DataResponse<OptionsData>> {
    let mut job_roles: Vec<String> = JOB_ROLES.iter().map(|r| r.to_string()).collect();
    for role in engine.bank.roles() {
        if !job_roles.contains(&role) {
            job_roles.push(role);
        }
    }

    Json(DataResponse::success(
        "Interview options".to_string(),
        OptionsData {
            job_roles,
            difficulties: Difficulty::ALL.iter().map(|d| d.label()).collect(),
            company_types: COMPANY_TYPES.to_vec(),
            question_categories: engine.bank.categories(),
            interview_styles: vec![
                InterviewStyle::Mixed,
                InterviewStyle::Technical,
                InterviewStyle::Behavioral,
            ],
            bank_coverage: engine.bank.coverage(),
            generator: engine.generator.name().to_string(),
        },
        None,
    ))
}
