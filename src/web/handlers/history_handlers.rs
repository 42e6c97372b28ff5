// src/web/handlers/history_handlers.rs
use super::{api_error, ApiError};
use crate::auth::AuthenticatedUser;
use crate::core::database::{Database, InterviewRepository};
use crate::interview::analytics;
use crate::interview::InterviewRecord;
use crate::web::types::*;

use chrono::{DateTime, Utc};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::error;

fn since(days: Option<i64>) -> Result<Option<DateTime<Utc>>, ApiError> {
    let Some(d) = days else {
        return Ok(None);
    };
    match analytics::window_start(d, Utc::now()) {
        Some(start) => Ok(Some(start)),
        None => Err(api_error(
            Status::BadRequest,
            format!("days must be a positive number of days, got {}", d),
            "INVALID_RANGE",
            &["Use days=7, days=30 or omit it for all history"],
            None,
        )),
    }
}

fn storage_error(e: anyhow::Error) -> ApiError {
    error!("History query failed: {:#}", e);
    api_error(
        Status::InternalServerError,
        "Failed to load interview history",
        "HISTORY_UNAVAILABLE",
        &["Try again in a moment"],
        None,
    )
}

async fn load(
    db: &Database,
    user: &AuthenticatedUser,
    days: Option<i64>,
) -> Result<Vec<InterviewRecord>, ApiError> {
    let since = since(days)?;
    InterviewRepository::new(db.pool())
        .history_for_user(user.uid(), since)
        .await
        .map_err(storage_error)
}

pub async fn history_handler(
    days: Option<i64>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<Vec<InterviewRecord>>>, ApiError> {
    let records = load(db, &auth, days).await?;

    Ok(Json(DataResponse::success(
        format!("{} completed interviews", records.len()),
        records,
        None,
    )))
}

pub async fn last_interview_handler(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<InterviewRecord>>, ApiError> {
    let last = InterviewRepository::new(db.pool())
        .last_for_user(auth.uid())
        .await
        .map_err(storage_error)?;

    match last {
        Some(record) => Ok(Json(DataResponse::success(
            "Most recent interview".to_string(),
            record,
            None,
        ))),
        None => Err(api_error(
            Status::NotFound,
            "No completed interviews yet",
            "NO_INTERVIEWS",
            &["Complete an interview to see its results here"],
            None,
        )),
    }
}

pub async fn analytics_handler(
    days: Option<i64>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<AnalyticsData>>, ApiError> {
    let records = load(db, &auth, days).await?;
    let analytics = analytics::compute(&records);

    Ok(Json(DataResponse::success(
        "Interview analytics".to_string(),
        AnalyticsData { days, analytics },
        None,
    )))
}
