//! Turns free-text topic input into a canonical subject string.

/// Interrogative lead-ins removed from the start of a topic. Checked in order;
/// only the first match is stripped.
pub const QUESTION_PREFIXES: &[&str] = &[
    "what is",
    "what are",
    "explain",
    "define",
    "describe",
    "tell me about",
    "can you explain",
];

/// Acronyms expanded verbatim when they are the whole remaining topic.
pub const ACRONYMS: &[(&str, &str)] = &[
    ("dsa", "Data Structures and Algorithms"),
    ("ds", "Data Structures"),
    ("ai", "Artificial Intelligence"),
    ("ml", "Machine Learning"),
    ("oop", "Object Oriented Programming"),
    ("dbms", "Database Management Systems"),
    ("os", "Operating Systems"),
    ("cn", "Computer Networks"),
    ("cs", "Computer Science"),
    ("js", "JavaScript"),
];

/// Normalize `raw` into a display-ready topic. Total: empty or punctuation-only
/// input yields `default_topic`.
pub fn normalize_topic(raw: &str, default_topic: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped = strip_question_prefix(&lowered)
        .trim()
        .trim_end_matches(['?', '.', '!'])
        .trim();

    if stripped.is_empty() {
        return fallback_default(default_topic);
    }

    if let Some((_, expansion)) = ACRONYMS.iter().find(|(key, _)| *key == stripped) {
        return (*expansion).to_string();
    }

    title_case(stripped)
}

fn strip_question_prefix(topic: &str) -> &str {
    for prefix in QUESTION_PREFIXES {
        if let Some(rest) = topic.strip_prefix(prefix) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return rest;
            }
        }
    }
    topic
}

fn title_case(topic: &str) -> String {
    topic
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn fallback_default(default_topic: &str) -> String {
    let default_topic = default_topic.trim();
    if default_topic.is_empty() {
        "General Knowledge".to_string()
    } else {
        default_topic.to_string()
    }
}
