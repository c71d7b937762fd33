pub mod api;
pub mod config;
pub mod errors;
pub mod fallback;
pub mod llm_providers;
pub mod logging;
pub mod models;
pub mod prompt;
pub mod quality;
pub mod question_history;
pub mod question_parser;
pub mod question_service;
pub mod topic;

pub use config::Config;
pub use errors::{ApiError, GenerationFailure};
pub use llm_providers::{LLMProvider, LLMProviderFactory, LLMProviderType, TextGenerator};
pub use models::*;
pub use question_history::QuestionHistory;
pub use question_service::{GenerationOutcome, GenerationResult, QuestionService, ServiceSettings};
