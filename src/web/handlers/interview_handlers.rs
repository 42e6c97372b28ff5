// src/web/handlers/interview_handlers.rs
use super::{api_error, ApiError};
use crate::auth::AuthenticatedUser;
use crate::core::database::{Database, InterviewRepository, SaveOutcome};
use crate::interview::session::SessionView;
use crate::interview::{InterviewContext, InterviewSession, SessionError, TurnOutcome};
use crate::web::sessions::{SessionLookupError, SessionStore};
use crate::web::types::*;
use crate::web::Engine;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

fn parse_session_id(id: &str, conversation_id: Option<String>) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| {
        api_error(
            Status::BadRequest,
            format!("Invalid interview id: {}", id),
            "INVALID_INTERVIEW_ID",
            &["Use the session_id returned when the interview was started"],
            conversation_id,
        )
    })
}

async fn lookup(
    store: &SessionStore,
    id: Uuid,
    auth: &AuthenticatedUser,
    conversation_id: Option<String>,
) -> Result<Arc<Mutex<InterviewSession>>, ApiError> {
    store.get(id, auth.uid()).await.map_err(|e| lookup_error(e, conversation_id))
}

fn lookup_error(e: SessionLookupError, conversation_id: Option<String>) -> ApiError {
    match e {
        SessionLookupError::NotFound => api_error(
            Status::NotFound,
            "Interview not found or already finished",
            "INTERVIEW_NOT_FOUND",
            &["Start a new interview", "Completed interviews are listed in /api/history"],
            conversation_id,
        ),
        SessionLookupError::NotOwner => api_error(
            Status::Forbidden,
            "This interview belongs to another user",
            "INTERVIEW_FORBIDDEN",
            &["Start your own interview"],
            conversation_id,
        ),
    }
}

fn session_error(e: SessionError, conversation_id: Option<String>) -> ApiError {
    match e {
        SessionError::EmptyAnswer => api_error(
            Status::BadRequest,
            e.to_string(),
            "EMPTY_ANSWER",
            &["Type an answer before submitting"],
            conversation_id,
        ),
        SessionError::NotStarted | SessionError::AlreadyStarted | SessionError::AlreadyCompleted => {
            api_error(
                Status::Conflict,
                e.to_string(),
                "INVALID_INTERVIEW_STATE",
                &["Check the interview state with GET /api/interviews/<id>"],
                conversation_id,
            )
        }
        SessionError::NoQuestionAvailable { .. } => {
            error!("{}", e);
            api_error(
                Status::InternalServerError,
                e.to_string(),
                "NO_QUESTION_AVAILABLE",
                &["Try another role or difficulty", "Contact support if the problem persists"],
                conversation_id,
            )
        }
    }
}

pub async fn start_interview_handler(
    request: Json<StandardRequest<StartInterviewRequest>>,
    auth: AuthenticatedUser,
    engine: &State<Engine>,
    store: &State<SessionStore>,
) -> Result<Json<DataResponse<StartInterviewData>>, ApiError> {
    let conversation_id = request.conversation_id();
    let StandardRequest { data, .. } = request.into_inner();

    let job_role = data.job_role.trim().to_string();
    let difficulty = data.difficulty.trim().to_string();
    if job_role.is_empty() || difficulty.is_empty() {
        return Err(api_error(
            Status::BadRequest,
            "Job role and difficulty are required",
            "MISSING_SETUP",
            &["Pick a job role and a difficulty from /api/options"],
            conversation_id,
        ));
    }

    let context = InterviewContext::new(job_role, difficulty)
        .with_company_type(data.company_type)
        .with_category(data.question_category)
        .with_style(data.interview_style.unwrap_or_default());

    let mut session = InterviewSession::new(
        auth.uid(),
        context,
        engine.settings,
        engine.bank.clone(),
        engine.generator.clone(),
    );

    let question = session
        .start()
        .await
        .map_err(|e| session_error(e, conversation_id.clone()))?;

    let session_id = session.id();
    let actual_difficulty = session.escalated_difficulty();
    store.insert(session).await;

    info!(
        "User {} started interview {} ({})",
        auth.uid(),
        session_id,
        actual_difficulty
    );

    Ok(Json(DataResponse::success(
        "Interview started".to_string(),
        StartInterviewData {
            session_id,
            question,
            actual_difficulty,
            max_turns: engine.settings.max_turns,
        },
        conversation_id,
    )))
}

pub async fn submit_answer_handler(
    id: &str,
    request: Json<StandardRequest<SubmitAnswerRequest>>,
    auth: AuthenticatedUser,
    store: &State<SessionStore>,
    db: &State<Database>,
) -> Result<Json<DataResponse<TurnOutcome>>, ApiError> {
    let conversation_id = request.conversation_id();
    let session_id = parse_session_id(id, conversation_id.clone())?;
    let shared = lookup(store, session_id, &auth, conversation_id.clone()).await?;

    let outcome = {
        let mut session = shared.lock().await;
        session
            .submit_answer(&request.data.answer)
            .await
            .map_err(|e| session_error(e, conversation_id.clone()))?
    };

    let message = match &outcome {
        TurnOutcome::Continue { turn, .. } => format!("Answer analysed, question {} is next", turn),
        TurnOutcome::Completed { record, .. } => {
            match InterviewRepository::new(db.pool()).save_completed(record).await {
                SaveOutcome::Full => {}
                SaveOutcome::Simplified => {
                    warn!("Interview {} stored in simplified form", record.id)
                }
                SaveOutcome::Failed => error!("Interview {} was not stored", record.id),
            }
            if let Err(e) = store.remove(session_id, auth.uid()).await {
                warn!("Completed interview {} already gone: {:?}", session_id, e);
            }
            format!("Interview completed with overall score {}", record.overall_score)
        }
    };

    Ok(Json(DataResponse::success(message, outcome, conversation_id)))
}

pub async fn get_interview_handler(
    id: &str,
    auth: AuthenticatedUser,
    store: &State<SessionStore>,
) -> Result<Json<DataResponse<SessionView>>, ApiError> {
    let session_id = parse_session_id(id, None)?;
    let shared = lookup(store, session_id, &auth, None).await?;
    let view = shared.lock().await.view();

    Ok(Json(DataResponse::success(
        "Interview in progress".to_string(),
        view,
        None,
    )))
}

pub async fn abandon_interview_handler(
    id: &str,
    auth: AuthenticatedUser,
    store: &State<SessionStore>,
) -> Result<Json<ActionResponse>, ApiError> {
    let session_id = parse_session_id(id, None)?;
    store
        .remove(session_id, auth.uid())
        .await
        .map_err(|e| lookup_error(e, None))?;

    info!("User {} abandoned interview {}", auth.uid(), session_id);

    Ok(Json(
        ActionResponse::success(
            "Interview abandoned".to_string(),
            "abandoned".to_string(),
            None,
        )
        .with_next_actions(vec!["start_interview".to_string()]),
    ))
}
