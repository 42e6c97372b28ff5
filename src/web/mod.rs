// src/web/mod.rs

pub mod handlers;
pub mod sessions;
pub mod types;

pub use handlers::*;
pub use sessions::SessionStore;
pub use types::*;

use crate::auth::{AuthFailure, AuthenticatedUser, OptionalAuth, TokenVerifier};
use crate::core::database::{Database, UserProfile};
use crate::core::llm_client::{self, TextGenerator};
use crate::core::ConfigManager;
use crate::interview::session::SessionView;
use crate::interview::{InterviewRecord, InterviewSettings, QuestionBank, TurnOutcome};
use anyhow::{Context, Result};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{
    catchers, delete, get, options, patch, post, routes, Build, Request, Response, Rocket, State,
};
use std::sync::Arc;
use tracing::info;

/// Engine pieces shared by every interview session.
pub struct Engine {
    pub bank: Arc<QuestionBank>,
    pub generator: Arc<dyn TextGenerator>,
    pub settings: InterviewSettings,
}

impl Engine {
    pub async fn from_config(config: &ConfigManager) -> Result<Self> {
        let bank = match &config.question_bank_path {
            Some(path) => QuestionBank::load(path).await?,
            None => QuestionBank::builtin().context("Built-in question bank is invalid")?,
        };
        info!("Question bank ready with {} questions", bank.len());

        Ok(Self {
            bank: Arc::new(bank),
            generator: Arc::from(llm_client::from_config(&config.llm)?),
            settings: config.interview,
        })
    }
}

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PATCH, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Interviews

#[post("/interviews", data = "<request>")]
pub async fn start_interview(
    request: Json<StandardRequest<StartInterviewRequest>>,
    auth: AuthenticatedUser,
    engine: &State<Engine>,
    store: &State<SessionStore>,
) -> Result<Json<DataResponse<StartInterviewData>>, ApiError> {
    handlers::start_interview_handler(request, auth, engine, store).await
}

#[post("/interviews/<id>/answers", data = "<request>")]
pub async fn submit_answer(
    id: &str,
    request: Json<StandardRequest<SubmitAnswerRequest>>,
    auth: AuthenticatedUser,
    store: &State<SessionStore>,
    db: &State<Database>,
) -> Result<Json<DataResponse<TurnOutcome>>, ApiError> {
    handlers::submit_answer_handler(id, request, auth, store, db).await
}

#[get("/interviews/<id>")]
pub async fn get_interview(
    id: &str,
    auth: AuthenticatedUser,
    store: &State<SessionStore>,
) -> Result<Json<DataResponse<SessionView>>, ApiError> {
    handlers::get_interview_handler(id, auth, store).await
}

#[delete("/interviews/<id>")]
pub async fn abandon_interview(
    id: &str,
    auth: AuthenticatedUser,
    store: &State<SessionStore>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::abandon_interview_handler(id, auth, store).await
}

// History

#[get("/history?<days>")]
pub async fn history(
    days: Option<i64>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<Vec<InterviewRecord>>>, ApiError> {
    handlers::history_handler(days, auth, db).await
}

#[get("/history/last")]
pub async fn last_interview(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<InterviewRecord>>, ApiError> {
    handlers::last_interview_handler(auth, db).await
}

#[get("/analytics?<days>")]
pub async fn analytics(
    days: Option<i64>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<AnalyticsData>>, ApiError> {
    handlers::analytics_handler(days, auth, db).await
}

// Profile

#[get("/me")]
pub async fn get_current_user(auth: AuthenticatedUser) -> Json<DataResponse<UserProfile>> {
    handlers::get_profile_handler(auth).await
}

#[patch("/me", data = "<request>")]
pub async fn update_current_user(
    request: Json<StandardRequest<UpdateProfileRequest>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<UserProfile>>, ApiError> {
    handlers::update_profile_handler(request, auth, db).await
}

// System

#[get("/health")]
pub async fn health(
    auth: OptionalAuth,
    db: &State<Database>,
) -> Result<Json<TextResponse>, ApiError> {
    handlers::health_handler(auth, db).await
}

#[get("/options")]
pub async fn interview_options(engine: &State<Engine>) -> Json<DataResponse<OptionsData>> {
    handlers::options_handler(engine).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(401)]
pub fn unauthorized(req: &Request) -> Json<StandardErrorResponse> {
    let failure = req.local_cache(|| AuthFailure(None));
    let (error, code) = match failure.0 {
        Some(e) => (e.message(), e.code()),
        None => ("Authentication required", "UNAUTHORIZED"),
    };
    Json(StandardErrorResponse::new(
        error.to_string(),
        code.to_string(),
        vec!["Send a valid token in the Authorization: Bearer header".to_string()],
        None,
    ))
}

#[rocket::catch(404)]
pub fn not_found(req: &Request) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        format!("No route for {} {}", req.method(), req.uri()),
        "NOT_FOUND".to_string(),
        vec!["Check the endpoint path".to_string()],
        None,
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body does not match the expected fields".to_string(),
        "UNPROCESSABLE_ENTITY".to_string(),
        vec!["Verify all required fields are present and correctly typed".to_string()],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
        None,
    ))
}

/// Assemble the API on top of `figment`. Separate from launch so tests can
/// drive it with a local client.
pub fn build_rocket(
    figment: Figment,
    database: Database,
    verifier: TokenVerifier,
    engine: Engine,
) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(Cors)
        .manage(database)
        .manage(verifier)
        .manage(engine)
        .manage(SessionStore::new())
        .register(
            "/api",
            catchers![bad_request, unauthorized, not_found, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![
                start_interview,
                submit_answer,
                get_interview,
                abandon_interview,
                history,
                last_interview,
                analytics,
                get_current_user,
                update_current_user,
                health,
                interview_options,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    config.ensure_directories().await?;

    let database = Database::new(&config.database_path).await?;
    let verifier = TokenVerifier::from_config(&config.auth)?;
    let engine = Engine::from_config(&config).await?;

    info!("Starting Interview Coach API server");
    info!("Environment: {}", config.environment);
    info!("Database: {}", config.database_path.display());
    info!("Server: http://0.0.0.0:{}", config.port);

    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", config.port));

    let _rocket = build_rocket(figment, database, verifier, engine)
        .launch()
        .await
        .context("Rocket server failed")?;

    Ok(())
}
