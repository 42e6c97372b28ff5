use interview_coach::auth::TokenVerifier;
use interview_coach::core::config_manager::AuthConfig;
use interview_coach::core::llm_client::DisabledGenerator;
use interview_coach::core::Database;
use interview_coach::interview::{InterviewSettings, QuestionBank};
use interview_coach::web::{build_rocket, Engine};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header as JwtHeader};
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

const SECRET: &str = "test-secret";

fn token(uid: &str) -> Header<'static> {
    let exp = (chrono::Utc::now().timestamp() + 3600) as usize;
    let jwt = encode(
        &JwtHeader::new(Algorithm::HS256),
        &json!({"sub": uid, "email": format!("{}@example.com", uid), "exp": exp}),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    Header::new("Authorization", format!("Bearer {}", jwt))
}

async fn client() -> (Client, std::path::PathBuf) {
    let path = std::env::temp_dir().join(format!("interview-api-{}.db", Uuid::new_v4()));
    let database = Database::new(&path).await.unwrap();
    let verifier = TokenVerifier::from_config(&AuthConfig {
        jwt_secret: Some(SECRET.into()),
        ..AuthConfig::default()
    })
    .unwrap();
    let engine = Engine {
        bank: Arc::new(QuestionBank::builtin().unwrap()),
        generator: Arc::new(DisabledGenerator),
        settings: InterviewSettings::default(),
    };
    let figment = rocket::Config::figment().merge(("log_level", "off"));
    let client = Client::tracked(build_rocket(figment, database, verifier, engine))
        .await
        .unwrap();
    (client, path)
}

#[rocket::async_test]
async fn test_full_interview_lands_in_history() {
    let (client, path) = client().await;

    let response = client
        .post("/api/interviews")
        .header(ContentType::JSON)
        .header(token("alice"))
        .body(json!({"job_role": "Software Engineer", "difficulty": "Entry Level"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let started: Value = response.into_json().await.unwrap();
    assert_eq!(started["data"]["actual_difficulty"], "Mid Level");
    let id = started["data"]["session_id"].as_str().unwrap().to_string();

    let answer = "For example, in my last project I used a structured approach because \
                  latency mattered. We measured a 30% improvement after the migration.";
    let mut last = Value::Null;
    for _ in 0..5 {
        let response = client
            .post(format!("/api/interviews/{}/answers", id))
            .header(ContentType::JSON)
            .header(token("alice"))
            .body(json!({"answer": answer, "conversation_id": "c-1"}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        last = response.into_json().await.unwrap();
        assert_eq!(last["conversation_id"], "c-1");
    }
    assert_eq!(last["data"]["outcome"], "completed");
    let score = last["data"]["record"]["overallScore"].as_u64().unwrap();

    // Finished sessions leave the store
    let response = client
        .get(format!("/api/interviews/{}", id))
        .header(token("alice"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);

    let response = client
        .get("/api/history/last")
        .header(token("alice"))
        .dispatch()
        .await;
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["data"]["overallScore"].as_u64(), Some(score));

    let response = client
        .get("/api/analytics?days=30")
        .header(token("alice"))
        .dispatch()
        .await;
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["data"]["totalInterviews"], 1);
    assert_eq!(body["data"]["days"], 30);

    let _ = std::fs::remove_file(path);
}

#[rocket::async_test]
async fn test_auth_and_ownership() {
    let (client, path) = client().await;

    let response = client.get("/api/history").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error_code"], "MISSING_TOKEN");

    let response = client
        .post("/api/interviews")
        .header(ContentType::JSON)
        .header(token("alice"))
        .body(json!({"job_role": "Product Manager", "difficulty": "Senior Level"}).to_string())
        .dispatch()
        .await;
    let started: Value = response.into_json().await.unwrap();
    let id = started["data"]["session_id"].as_str().unwrap().to_string();

    let response = client
        .post(format!("/api/interviews/{}/answers", id))
        .header(ContentType::JSON)
        .header(token("bob"))
        .body(json!({"answer": "Not my interview"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .post(format!("/api/interviews/{}/answers", id))
        .header(ContentType::JSON)
        .header(token("alice"))
        .body(json!({"answer": "   "}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error_code"], "EMPTY_ANSWER");

    let response = client
        .delete(format!("/api/interviews/{}", id))
        .header(token("alice"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .get("/api/analytics?days=0")
        .header(token("alice"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);

    let _ = std::fs::remove_file(path);
}

#[rocket::async_test]
async fn test_out_of_range_days_rejected() {
    let (client, path) = client().await;

    for uri in [
        "/api/history?days=200000000",
        "/api/analytics?days=200000000",
        "/api/history?days=9223372036854775807",
        "/api/history?days=-1",
    ] {
        let response = client.get(uri).header(token("dave")).dispatch().await;
        assert_eq!(response.status(), Status::BadRequest, "{}", uri);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "INVALID_RANGE");
    }

    let response = client
        .get("/api/history?days=36500")
        .header(token("dave"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let _ = std::fs::remove_file(path);
}

#[rocket::async_test]
async fn test_profile_and_options() {
    let (client, path) = client().await;

    let response = client
        .patch("/api/me")
        .header(ContentType::JSON)
        .header(token("carol"))
        .body(json!({"first_name": "Carol"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["data"]["firstName"], "Carol");
    assert_eq!(body["data"]["email"], "carol@example.com");

    let response = client.get("/api/options").dispatch().await;
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["data"]["job_roles"][0], "Software Engineer");
    assert_eq!(body["data"]["difficulties"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["generator"], "disabled");

    let response = client.get("/api/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let _ = std::fs::remove_file(path);
}
