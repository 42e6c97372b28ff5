pub mod history_handlers;
pub mod interview_handlers;
pub mod profile_handlers;
pub mod system_handlers;

pub use history_handlers::*;
pub use interview_handlers::*;
pub use profile_handlers::*;
pub use system_handlers::*;

use crate::web::types::StandardErrorResponse;
use rocket::http::Status;
use rocket::serde::json::Json;

/// Error half of every handler result.
pub type ApiError = (Status, Json<StandardErrorResponse>);

pub(crate) fn api_error(
    status: Status,
    error: impl Into<String>,
    code: &str,
    suggestions: &[&str],
    conversation_id: Option<String>,
) -> ApiError {
    (
        status,
        Json(StandardErrorResponse::new(
            error.into(),
            code.to_string(),
            suggestions.iter().map(|s| s.to_string()).collect(),
            conversation_id,
        )),
    )
}
