use crate::api::ApiResponse;
use crate::quality::QualityIssue;
use axum::{http::StatusCode, response::Json};
use tracing::warn;

/// Reasons a generation attempt falls back to the curated question bank.
/// None of these reach the caller as an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationFailure {
    #[error("text generation is not configured: {0}")]
    ConfigurationMissing(String),

    #[error("text generation request failed: {0}")]
    TransportFailure(String),

    #[error("generated text is not a valid question: {0}")]
    ParseFailure(String),

    #[error("generated question matched a generic pattern: {}", describe_issues(.0))]
    PatternViolation(Vec<QualityIssue>),
}

impl GenerationFailure {
    /// Stable identifier used in response metadata and logs.
    pub fn code(&self) -> &'static str {
        match self {
            GenerationFailure::ConfigurationMissing(_) => "configuration_missing",
            GenerationFailure::TransportFailure(_) => "transport_failure",
            GenerationFailure::ParseFailure(_) => "parse_failure",
            GenerationFailure::PatternViolation(_) => "pattern_violation",
        }
    }
}

fn describe_issues(issues: &[QualityIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// HTTP-level errors for endpoints that can reject a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Error context for structured logging
#[derive(Debug)]
pub struct ErrorContext {
    pub operation: String,
    pub topic: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            topic: None,
        }
    }

    pub fn with_topic(mut self, topic: &str) -> Self {
        self.topic = Some(topic.to_string());
        self
    }
}

impl ApiError {
    /// Convert API error to HTTP response with consistent structure and logging
    pub fn to_response_with_context(
        self,
        context: ErrorContext,
    ) -> (StatusCode, Json<ApiResponse<()>>) {
        match &self {
            ApiError::ValidationError(_) => {
                warn!(
                    operation = %context.operation,
                    topic = ?context.topic,
                    error = %self,
                    "Validation error"
                );
            }
            ApiError::BadRequest(_) => {
                warn!(
                    operation = %context.operation,
                    topic = ?context.topic,
                    error = %self,
                    "Bad request"
                );
            }
        }

        (StatusCode::BAD_REQUEST, Json(ApiResponse::error(self.to_string())))
    }
}
