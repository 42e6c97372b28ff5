// src/web/handlers/profile_handlers.rs
use super::{api_error, ApiError};
use crate::auth::AuthenticatedUser;
use crate::core::database::{Database, ProfileRepository, UserProfile};
use crate::web::types::*;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::error;

const MAX_NAME_LENGTH: usize = 100;

pub async fn get_profile_handler(auth: AuthenticatedUser) -> Json<DataResponse<UserProfile>> {
    Json(DataResponse::success(
        "Profile retrieved".to_string(),
        auth.profile,
        None,
    ))
}

pub async fn update_profile_handler(
    request: Json<StandardRequest<UpdateProfileRequest>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<UserProfile>>, ApiError> {
    let conversation_id = request.conversation_id();
    let first_name = request.data.first_name.as_deref();
    let last_name = request.data.last_name.as_deref();

    let too_long = [first_name, last_name]
        .into_iter()
        .flatten()
        .any(|n| n.trim().chars().count() > MAX_NAME_LENGTH);
    if too_long {
        return Err(api_error(
            Status::BadRequest,
            format!("Names are limited to {} characters", MAX_NAME_LENGTH),
            "NAME_TOO_LONG",
            &["Shorten the name and try again"],
            conversation_id,
        ));
    }

    let updated = ProfileRepository::new(db.pool())
        .update_names(auth.uid(), first_name, last_name)
        .await
        .map_err(|e| {
            error!("Failed to update profile {}: {:#}", auth.uid(), e);
            api_error(
                Status::InternalServerError,
                "Failed to update profile",
                "PROFILE_UPDATE_FAILED",
                &["Try again in a moment"],
                conversation_id.clone(),
            )
        })?;

    match updated {
        Some(profile) => Ok(Json(DataResponse::success(
            "Profile updated".to_string(),
            profile,
            conversation_id,
        ))),
        None => Err(api_error(
            Status::NotFound,
            "Profile not found",
            "PROFILE_NOT_FOUND",
            &["Sign in again to recreate your profile"],
            conversation_id,
        )),
    }
}
