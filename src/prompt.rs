use crate::models::Difficulty;
use crate::quality::{BANNED_LEADING_PHRASES, BANNED_QUESTION_PHRASES};

/// Maximum number of earlier questions quoted back to the model.
pub const PROMPT_HISTORY_LIMIT: usize = 5;

pub const SYSTEM_MESSAGE: &str = "You are an experienced teacher who writes concrete, scenario-based multiple-choice questions. Always respond with a single valid JSON object and nothing else.";

/// Build the instruction text for one question about `topic`.
///
/// `recent` lists questions already asked for this topic, most recent last;
/// only the last [`PROMPT_HISTORY_LIMIT`] entries are used.
pub fn build_prompt(topic: &str, difficulty: Difficulty, recent: &[String]) -> String {
    let banned = BANNED_QUESTION_PHRASES
        .iter()
        .map(|phrase| format!("\"{}\"", phrase))
        .collect::<Vec<_>>()
        .join(", ");
    let banned_openings = BANNED_LEADING_PHRASES
        .iter()
        .map(|phrase| format!("\"{}...\"", capitalize(phrase)))
        .collect::<Vec<_>>()
        .join(" or ");

    let mut prompt = format!(
        r#"Create exactly one multiple-choice question about "{topic}" at {difficulty} difficulty level.

Requirements:
- Provide exactly four distinct answer options.
- Exactly one option is correct; the other three must be plausible but wrong.
- Ground the question in a concrete scenario, example, calculation or observation about {topic}. Do not ask for abstract definitions.
- Never use these phrasings anywhere in the question: {banned}.
- Do not start the question with {banned_openings}.
- Each option must be a specific statement, not a category such as "applications of {topic}".
- Write option texts without letter prefixes (A., B., etc.).
- The explanation must say why the correct option is right.
"#,
    );

    let start = recent.len().saturating_sub(PROMPT_HISTORY_LIMIT);
    let recent = &recent[start..];
    if !recent.is_empty() {
        prompt.push_str("\nAvoid repeating these recently asked questions:\n");
        for question in recent {
            prompt.push_str("- ");
            prompt.push_str(question);
            prompt.push('\n');
        }
    }

    prompt.push_str(
        r#"
Respond with ONLY valid JSON in this exact structure, with no markdown and no commentary:
{
  "question": "The question text?",
  "options": ["Option text", "Option text", "Option text", "Option text"],
  "correctAnswer": 0,
  "explanation": "Why the correct option is right"
}
correctAnswer is the zero-based index (0, 1, 2 or 3) of the correct option."#,
    );

    prompt
}

fn capitalize(phrase: &str) -> String {
    let mut chars = phrase.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
