use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

use crate::topic::normalize_topic;

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

/// A single multiple-choice question as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

impl GeneratedQuestion {
    pub fn correct_option(&self) -> &str {
        self.options
            .get(self.correct_answer)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Structural invariant: non-empty text, exactly four distinct options
    /// (case-insensitive) and an in-range answer index.
    pub fn is_well_formed(&self) -> bool {
        if self.question.trim().is_empty() || self.explanation.trim().is_empty() {
            return false;
        }
        if self.options.len() != OPTION_COUNT || self.correct_answer >= OPTION_COUNT {
            return false;
        }
        let mut seen = HashSet::new();
        self.options
            .iter()
            .all(|option| !option.trim().is_empty() && seen.insert(option.trim().to_lowercase()))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Case-insensitive parse; absent or unknown values become `Medium`.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Difficulty::default();
        };

        match raw.to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => {
                warn!(difficulty = %raw, "Unknown difficulty, defaulting to medium");
                Difficulty::default()
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a returned question came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSource {
    Generated,
    Fallback,
}

/// The caller's topic together with its normalized form. Built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicQuery {
    raw_input: String,
    normalized_topic: String,
}

impl TopicQuery {
    pub fn new(raw_input: Option<&str>, default_topic: &str) -> Self {
        let raw_input = raw_input.unwrap_or_default().to_string();
        let normalized_topic = normalize_topic(&raw_input, default_topic);
        Self {
            raw_input,
            normalized_topic,
        }
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn normalized(&self) -> &str {
        &self.normalized_topic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> GeneratedQuestion {
        GeneratedQuestion {
            question: "Which structure answers membership queries in constant time?".to_string(),
            options: vec![
                "A hash set".to_string(),
                "A linked list".to_string(),
                "A sorted array".to_string(),
                "A binary heap".to_string(),
            ],
            correct_answer: 0,
            explanation: "Hash sets hash the key straight to a bucket.".to_string(),
        }
    }

    #[test]
    fn test_well_formed_question() {
        let question = sample_question();
        assert!(question.is_well_formed());
        assert_eq!(question.correct_option(), "A hash set");
    }

    #[test]
    fn test_duplicate_options_are_not_well_formed() {
        let mut question = sample_question();
        question.options[3] = "a HASH set".to_string();
        assert!(!question.is_well_formed());
    }

    #[test]
    fn test_out_of_range_answer_is_not_well_formed() {
        let mut question = sample_question();
        question.correct_answer = 4;
        assert!(!question.is_well_formed());
        assert_eq!(question.correct_option(), "");
    }

    #[test]
    fn test_serializes_with_camel_case_answer_field() {
        let json = serde_json::to_value(sample_question()).unwrap();
        assert_eq!(json["correctAnswer"], 0);
        assert!(json.get("correct_answer").is_none());
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!(Difficulty::parse_lenient(Some("EASY")), Difficulty::Easy);
        assert_eq!(Difficulty::parse_lenient(Some(" hard ")), Difficulty::Hard);
        assert_eq!(Difficulty::parse_lenient(Some("impossible")), Difficulty::Medium);
        assert_eq!(Difficulty::parse_lenient(None), Difficulty::Medium);
        assert_eq!(Difficulty::Hard.to_string(), "hard");
    }

    #[test]
    fn test_topic_query_keeps_raw_input() {
        let query = TopicQuery::new(Some("what is dsa"), "General Knowledge");
        assert_eq!(query.raw_input(), "what is dsa");
        assert_eq!(query.normalized(), "Data Structures and Algorithms");

        let empty = TopicQuery::new(None, "General Knowledge");
        assert_eq!(empty.raw_input(), "");
        assert_eq!(empty.normalized(), "General Knowledge");
    }
}
