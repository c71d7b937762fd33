use anyhow::Result;
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use mindspark_questions::{
    api::{create_router, AppState},
    QuestionHistory, QuestionService, ServiceSettings, TextGenerator,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

struct FixedGenerator(&'static str);

#[async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate(&self, _system_message: Option<&str>, _prompt: &str) -> Result<String> {
        Ok(self.0.to_string())
    }

    fn provider_name(&self) -> &'static str {
        "Fixed"
    }

    fn model_name(&self) -> &str {
        "fixed-1"
    }
}

const GOOD: &str = r#"{
  "question": "A 2 kg book rests on a table. Which force balances the pull of gravity on it?",
  "options": ["The normal force pushing up from the table surface", "Air pressure pressing down on the cover", "Friction between the book and the table", "The book's own inertia"],
  "correctAnswer": 0,
  "explanation": "The table pushes up with a normal force equal to the book's weight, so the net force is zero."
}"#;

fn server_with(generator: Option<Arc<dyn TextGenerator>>) -> TestServer {
    let settings = ServiceSettings {
        default_topic: "General Knowledge".to_string(),
        call_timeout: Duration::from_millis(200),
        max_batch_size: 3,
    };
    let question_service = QuestionService::new(generator, QuestionHistory::new(10, 64), settings);
    TestServer::new(create_router(AppState { question_service })).unwrap()
}

fn assert_valid_question(data: &Value) {
    let options = data["options"].as_array().expect("options must be a list");
    assert_eq!(options.len(), 4);
    let answer = data["correctAnswer"].as_u64().expect("correctAnswer must be a number");
    assert!(answer <= 3);
    assert!(!data["question"].as_str().unwrap().is_empty());
    assert!(!data["explanation"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_generated_question_response_shape() {
    let server = server_with(Some(Arc::new(FixedGenerator(GOOD))));

    let response = server
        .post("/api/generate-question")
        .json(&json!({ "topic": "what is physics", "difficulty": "hard" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_valid_question(&body["data"]);
    assert!(body.get("note").is_none());
    assert_eq!(body["meta"]["source"], "generated");
    assert_eq!(body["meta"]["reason"], Value::Null);
    assert_eq!(body["meta"]["topic"], "Physics");
    assert_eq!(body["meta"]["difficulty"], "hard");
}

#[tokio::test]
async fn test_missing_credential_still_returns_200_with_note() {
    let server = server_with(None);

    let response = server
        .post("/api/generate-question")
        .json(&json!({ "topic": "astronomy" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_valid_question(&body["data"]);
    assert!(body["note"].as_str().unwrap().contains("configuration_missing"));
    assert_eq!(body["meta"]["source"], "fallback");
    assert_eq!(body["meta"]["reason"], "configuration_missing");
    assert_eq!(body["meta"]["difficulty"], "medium");
}

#[tokio::test]
async fn test_unparsable_generation_falls_back() {
    let server = server_with(Some(Arc::new(FixedGenerator("I'm not able to write quizzes today."))));

    let response = server
        .post("/api/generate-question")
        .json(&json!({ "topic": "chemistry", "difficulty": "easy" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["meta"]["reason"], "parse_failure");
    assert!(body["data"]["question"].as_str().unwrap().contains("Chemistry"));
}

#[tokio::test]
async fn test_unreadable_body_uses_defaults() {
    let server = server_with(None);

    let response = server.post("/api/generate-question").text("topic=astronomy").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["meta"]["topic"], "General Knowledge");
    assert_valid_question(&body["data"]);
}

#[tokio::test]
async fn test_legacy_function_path_is_served() {
    let server = server_with(None);

    let response = server
        .post("/.netlify/functions/generate-question")
        .json(&json!({ "topic": "ml" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["meta"]["topic"], "Machine Learning");
}

#[tokio::test]
async fn test_get_on_generate_endpoint_is_not_allowed() {
    let server = server_with(None);

    let response = server.get("/api/generate-question").await;

    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_batch_generation() {
    let server = server_with(None);

    let response = server
        .post("/api/generate-questions")
        .json(&json!({ "topic": "geology", "count": 3 }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    for item in items {
        assert_valid_question(&item["data"]);
        assert_eq!(item["meta"]["source"], "fallback");
    }
}

#[tokio::test]
async fn test_batch_count_out_of_range_is_rejected() {
    let server = server_with(None);

    for count in [0, 4] {
        let response = server
            .post("/api/generate-questions")
            .json(&json!({ "topic": "geology", "count": count }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("between 1 and 3"));
    }
}

#[tokio::test]
async fn test_batch_rejects_malformed_body() {
    let server = server_with(None);

    let response = server.post("/api/generate-questions").text("not json").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_history_endpoint_lists_served_questions() {
    let server = server_with(None);

    let served: Value = server
        .post("/api/generate-question")
        .json(&json!({ "topic": "astronomy" }))
        .await
        .json();

    let response = server.get("/api/history").add_query_param("topic", "ASTRONOMY").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["topic"], "Astronomy");
    let questions = body["data"]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0], served["data"]["question"]);
}

#[tokio::test]
async fn test_health_reports_provider() {
    let server = server_with(Some(Arc::new(FixedGenerator(GOOD))));

    let response = server.get("/api/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["provider"], "Fixed");
    assert_eq!(body["data"]["model"], "fixed-1");
    assert_eq!(body["data"]["credential_configured"], true);

    let offline = server_with(None);
    let body: Value = offline.get("/api/health").await.json();
    assert_eq!(body["data"]["credential_configured"], false);
    assert_eq!(body["data"]["provider"], Value::Null);
}
