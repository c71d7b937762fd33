use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::GenerationFailure;
use crate::fallback::select_fallback;
use crate::llm_providers::TextGenerator;
use crate::models::{Difficulty, GeneratedQuestion, QuestionSource, TopicQuery};
use crate::prompt::{build_prompt, PROMPT_HISTORY_LIMIT, SYSTEM_MESSAGE};
use crate::quality::validate_question;
use crate::question_history::QuestionHistory;
use crate::question_parser::parse_question;

// Import logging macros
use crate::log_generation;

/// Tunables for [`QuestionService`].
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub default_topic: String,
    pub call_timeout: Duration,
    pub max_batch_size: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            default_topic: "General Knowledge".to_string(),
            call_timeout: Duration::from_secs(8),
            max_batch_size: 10,
        }
    }
}

impl ServiceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_topic: config.generation.default_topic.clone(),
            call_timeout: Duration::from_secs(config.llm.timeout_secs),
            max_batch_size: config.generation.max_batch_size,
        }
    }
}

/// How a request was satisfied.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Generated(GeneratedQuestion),
    Fallback {
        question: GeneratedQuestion,
        reason: GenerationFailure,
    },
}

impl GenerationOutcome {
    pub fn question(&self) -> &GeneratedQuestion {
        match self {
            GenerationOutcome::Generated(question) => question,
            GenerationOutcome::Fallback { question, .. } => question,
        }
    }

    pub fn into_question(self) -> GeneratedQuestion {
        match self {
            GenerationOutcome::Generated(question) => question,
            GenerationOutcome::Fallback { question, .. } => question,
        }
    }

    pub fn source(&self) -> QuestionSource {
        match self {
            GenerationOutcome::Generated(_) => QuestionSource::Generated,
            GenerationOutcome::Fallback { .. } => QuestionSource::Fallback,
        }
    }

    pub fn fallback_reason(&self) -> Option<&GenerationFailure> {
        match self {
            GenerationOutcome::Generated(_) => None,
            GenerationOutcome::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Everything the caller gets back from one generation.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub request_id: Uuid,
    pub topic: TopicQuery,
    pub difficulty: Difficulty,
    pub outcome: GenerationOutcome,
}

impl GenerationResult {
    /// Human-readable note, present only when the fallback bank was used.
    pub fn note(&self) -> Option<String> {
        self.outcome.fallback_reason().map(|reason| {
            let cause = match reason {
                GenerationFailure::ConfigurationMissing(_) | GenerationFailure::TransportFailure(_) => {
                    "AI generation unavailable"
                }
                GenerationFailure::ParseFailure(_) => "AI response could not be read",
                GenerationFailure::PatternViolation(_) => "AI question was rejected as too generic",
            };
            format!("{} ({}); served a curated question instead.", cause, reason.code())
        })
    }
}

/// Normalize, prompt, call, parse, validate; fall back on any failure.
#[derive(Clone)]
pub struct QuestionService {
    generator: Option<Arc<dyn TextGenerator>>,
    history: QuestionHistory,
    settings: ServiceSettings,
}

impl QuestionService {
    /// `generator` is `None` when no usable credential is configured; every
    /// request then takes the fallback path.
    pub fn new(
        generator: Option<Arc<dyn TextGenerator>>,
        history: QuestionHistory,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            generator,
            history,
            settings,
        }
    }

    pub fn history(&self) -> &QuestionHistory {
        &self.history
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn provider_name(&self) -> Option<&'static str> {
        self.generator.as_ref().map(|generator| generator.provider_name())
    }

    pub fn model_name(&self) -> Option<&str> {
        self.generator.as_ref().map(|generator| generator.model_name())
    }

    pub fn topic_query(&self, raw_topic: Option<&str>) -> TopicQuery {
        TopicQuery::new(raw_topic, &self.settings.default_topic)
    }

    /// Produce one question. Never fails.
    pub async fn generate(&self, raw_topic: Option<&str>, difficulty: Difficulty) -> GenerationResult {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        let topic = self.topic_query(raw_topic);

        log_generation!(start, request_id = request_id, topic = topic.normalized(), difficulty = difficulty);

        let recent = self.history.recent(topic.normalized(), usize::MAX).await;

        let outcome = match self.attempt_generation(topic.normalized(), difficulty, &recent).await {
            Ok(question) => {
                log_generation!(
                    accepted,
                    request_id = request_id,
                    provider = self.provider_name().unwrap_or("unknown"),
                    duration_ms = started.elapsed().as_millis() as u64
                );
                GenerationOutcome::Generated(question)
            }
            Err(reason) => {
                log_generation!(
                    fallback,
                    request_id = request_id,
                    reason = reason,
                    duration_ms = started.elapsed().as_millis() as u64
                );
                GenerationOutcome::Fallback {
                    question: select_fallback(topic.normalized(), &recent),
                    reason,
                }
            }
        };

        self.history
            .record(topic.normalized(), &outcome.question().question)
            .await;

        GenerationResult {
            request_id,
            topic,
            difficulty,
            outcome,
        }
    }

    /// Produce `count` questions for one topic, one after another so each
    /// generation sees the ones before it in history.
    pub async fn generate_batch(
        &self,
        raw_topic: Option<&str>,
        difficulty: Difficulty,
        count: usize,
    ) -> Vec<GenerationResult> {
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            results.push(self.generate(raw_topic, difficulty).await);
        }
        results
    }

    async fn attempt_generation(
        &self,
        topic: &str,
        difficulty: Difficulty,
        recent: &[String],
    ) -> Result<GeneratedQuestion, GenerationFailure> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            GenerationFailure::ConfigurationMissing("no usable API credential configured".to_string())
        })?;

        let start = recent.len().saturating_sub(PROMPT_HISTORY_LIMIT);
        let prompt = build_prompt(topic, difficulty, &recent[start..]);

        let raw = match tokio::time::timeout(
            self.settings.call_timeout,
            generator.generate(Some(SYSTEM_MESSAGE), &prompt),
        )
        .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(GenerationFailure::TransportFailure(e.to_string())),
            Err(_) => {
                return Err(GenerationFailure::TransportFailure(format!(
                    "timed out after {} ms",
                    self.settings.call_timeout.as_millis()
                )));
            }
        };

        tracing::debug!(
            topic = %topic,
            response_length = raw.len(),
            response_content = %raw,
            "Raw LLM response for question generation"
        );

        let question = parse_question(&raw)?;
        validate_question(&question, topic)?;
        Ok(question)
    }
}
