use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{ApiError, ErrorContext},
    models::{Difficulty, GeneratedQuestion, QuestionSource},
    question_history::HistoryStats,
    question_service::{GenerationResult, QuestionService},
};

// Import logging macros
use crate::{log_api_start, log_api_success, log_api_warn};

#[derive(Clone)]
pub struct AppState {
    pub question_service: QuestionService,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuestionRequest {
    pub topic: Option<String>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuestionsRequest {
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub topic: Option<String>,
}

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerationMeta {
    pub source: QuestionSource,
    pub reason: Option<&'static str>,
    pub topic: String,
    pub difficulty: Difficulty,
}

/// Response body for a single generated question.
#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub success: bool,
    pub data: GeneratedQuestion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub meta: GenerationMeta,
}

impl From<GenerationResult> for QuestionResponse {
    fn from(result: GenerationResult) -> Self {
        let note = result.note();
        let meta = GenerationMeta {
            source: result.outcome.source(),
            reason: result.outcome.fallback_reason().map(|reason| reason.code()),
            topic: result.topic.normalized().to_string(),
            difficulty: result.difficulty,
        };
        Self {
            success: true,
            data: result.outcome.into_question(),
            note,
            meta,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub topic: String,
    pub questions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider: Option<&'static str>,
    pub model: Option<String>,
    pub credential_configured: bool,
    pub history: HistoryStats,
}

/// Generate one question. Always answers 200: a broken body is treated as an
/// empty request and every generation failure is served from the fallback bank.
pub async fn generate_question(
    State(state): State<AppState>,
    payload: Result<Json<GenerateQuestionRequest>, JsonRejection>,
) -> Json<QuestionResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            log_api_warn!("generate_question", error = rejection.body_text(), "unreadable request body, using defaults");
            GenerateQuestionRequest::default()
        }
    };

    let topic = request.topic.as_deref();
    log_api_start!("generate_question", topic = topic.unwrap_or("<none>"));

    let difficulty = Difficulty::parse_lenient(request.difficulty.as_deref());
    let result = state.question_service.generate(topic, difficulty).await;

    log_api_success!(
        "generate_question",
        topic = result.topic.normalized(),
        source = result.outcome.source(),
        "question served"
    );

    Json(QuestionResponse::from(result))
}

pub async fn generate_questions(
    State(state): State<AppState>,
    payload: Result<Json<GenerateQuestionsRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<QuestionResponse>>>, (StatusCode, Json<ApiResponse<()>>)> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::BadRequest(rejection.body_text()).to_response_with_context(ErrorContext::new("generate_questions"))
    })?;

    let max = state.question_service.settings().max_batch_size;
    let count = request.count.unwrap_or(1);
    if count == 0 || count > max {
        let context = ErrorContext::new("generate_questions").with_topic(request.topic.as_deref().unwrap_or_default());
        return Err(ApiError::ValidationError(format!("count must be between 1 and {}", max))
            .to_response_with_context(context));
    }

    let difficulty = Difficulty::parse_lenient(request.difficulty.as_deref());
    let results = state
        .question_service
        .generate_batch(request.topic.as_deref(), difficulty, count)
        .await;

    log_api_success!("generate_questions", count = results.len(), "questions served");

    Ok(Json(ApiResponse::success(
        results.into_iter().map(QuestionResponse::from).collect(),
    )))
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Json<ApiResponse<HistoryResponse>> {
    let topic = state.question_service.topic_query(params.topic.as_deref());
    let history = state.question_service.history();
    let questions = history
        .recent(topic.normalized(), history.per_topic_cap())
        .await;

    Json(ApiResponse::success(HistoryResponse {
        topic: topic.normalized().to_string(),
        questions,
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    log_api_start!("health");
    let service = &state.question_service;

    Json(ApiResponse::success(HealthResponse {
        status: "ok",
        provider: service.provider_name(),
        model: service.model_name().map(str::to_string),
        credential_configured: service.provider_name().is_some(),
        history: service.history().stats().await,
    }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-question", post(generate_question))
        // Path used by the existing web client
        .route("/.netlify/functions/generate-question", post(generate_question))
        .route("/api/generate-questions", post(generate_questions))
        .route("/api/history", get(get_history))
        .route("/api/health", get(health))
        .with_state(state)
}
