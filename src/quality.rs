//! Heuristic quality gate for generated questions.
//!
//! The phrase tables here are shared with the prompt builder so the list of
//! banned phrasings lives in exactly one place.

use std::fmt;

use crate::errors::GenerationFailure;
use crate::models::GeneratedQuestion;

/// Phrases that mark a question as a generic template.
pub const BANNED_QUESTION_PHRASES: &[&str] = &[
    "fundamental process",
    "core mechanism",
    "historical development",
    "practical applications",
    "theoretical framework",
    "main purpose",
    "primary goal",
    "basic concept",
];

/// Definitional openings that a question must not start with.
pub const BANNED_LEADING_PHRASES: &[&str] = &["what is the", "what are the"];

/// Meta-category phrases that must not appear in any option.
pub const META_OPTION_PHRASES: &[&str] = &[
    "core mechanism",
    "historical development",
    "practical applications",
    "theoretical framework",
];

/// An option is substantive when it has at least this many characters...
pub const MIN_OPTION_CHARS: usize = 20;
/// ...and at least this many words.
pub const MIN_OPTION_WORDS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityIssue {
    BannedPhrase(String),
    BannedLeadingPhrase(String),
    MetaOption { index: usize, phrase: String },
    TopicPossessiveOption { index: usize },
    AllOptionsGeneric,
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityIssue::BannedPhrase(phrase) => write!(f, "question contains \"{}\"", phrase),
            QualityIssue::BannedLeadingPhrase(phrase) => write!(f, "question starts with \"{}\"", phrase),
            QualityIssue::MetaOption { index, phrase } => {
                write!(f, "option {} contains \"{}\"", index + 1, phrase)
            }
            QualityIssue::TopicPossessiveOption { index } => {
                write!(f, "option {} is phrased as \"... of <topic>\"", index + 1)
            }
            QualityIssue::AllOptionsGeneric => write!(f, "every option is too short to be specific"),
        }
    }
}

/// Every issue found in `question` for `topic`. Empty means the question passes.
pub fn find_issues(question: &GeneratedQuestion, topic: &str) -> Vec<QualityIssue> {
    let mut issues = Vec::new();
    let text = question.question.trim().to_lowercase();

    for phrase in BANNED_QUESTION_PHRASES {
        if text.contains(phrase) {
            issues.push(QualityIssue::BannedPhrase((*phrase).to_string()));
        }
    }
    for phrase in BANNED_LEADING_PHRASES {
        if text.starts_with(phrase) {
            issues.push(QualityIssue::BannedLeadingPhrase((*phrase).to_string()));
        }
    }

    let topic_possessive = format!("of {}", topic.trim().to_lowercase());
    for (index, option) in question.options.iter().enumerate() {
        let option = option.to_lowercase();
        if let Some(phrase) = META_OPTION_PHRASES.iter().find(|phrase| option.contains(*phrase)) {
            issues.push(QualityIssue::MetaOption {
                index,
                phrase: (*phrase).to_string(),
            });
        } else if !topic.trim().is_empty() && option.contains(&topic_possessive) {
            issues.push(QualityIssue::TopicPossessiveOption { index });
        }
    }

    if question.options.iter().all(|option| is_generic_option(option)) {
        issues.push(QualityIssue::AllOptionsGeneric);
    }

    issues
}

/// Accept or reject a parsed question. Rejection always means "use the fallback".
pub fn validate_question(question: &GeneratedQuestion, topic: &str) -> Result<(), GenerationFailure> {
    let issues = find_issues(question, topic);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(GenerationFailure::PatternViolation(issues))
    }
}

fn is_generic_option(option: &str) -> bool {
    let option = option.trim();
    option.chars().count() < MIN_OPTION_CHARS || option.split_whitespace().count() < MIN_OPTION_WORDS
}
