use rand::Rng;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::errors::GenerationFailure;
use crate::models::{GeneratedQuestion, OPTION_COUNT};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json|JSON)?").expect("code fence pattern is valid"));

static OPTION_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<open>\(?)(?P<letter>[A-Da-d])(?P<delim>[.):])\s+").expect("option label pattern is valid")
});

/// Parse raw model output into a question, repairing what can be repaired.
pub fn parse_question(raw: &str) -> Result<GeneratedQuestion, GenerationFailure> {
    parse_question_with_rng(raw, &mut rand::thread_rng())
}

/// Same as [`parse_question`] with an explicit source of randomness for the
/// `correctAnswer` repair.
pub fn parse_question_with_rng<R: Rng + ?Sized>(
    raw: &str,
    rng: &mut R,
) -> Result<GeneratedQuestion, GenerationFailure> {
    let cleaned = strip_code_fences(raw);
    let object = parse_object(&cleaned)?;
    question_from_object(&object, rng)
}

/// Remove markdown code fences wherever the model put them.
pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw, "").trim().to_string()
}

fn parse_object(text: &str) -> Result<Map<String, Value>, GenerationFailure> {
    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(text) {
        return Ok(object);
    }

    let span = first_balanced_object(text)
        .ok_or_else(|| GenerationFailure::ParseFailure("no JSON object found in response".to_string()))?;
    debug!(span_length = span.len(), "Retrying parse on embedded JSON object");

    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(GenerationFailure::ParseFailure("embedded JSON is not an object".to_string())),
        Err(e) => Err(GenerationFailure::ParseFailure(format!("embedded JSON object is invalid: {}", e))),
    }
}

/// The first `{ ... }` span whose braces balance, ignoring braces inside
/// string literals.
pub fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text[start..].bytes().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

fn question_from_object<R: Rng + ?Sized>(
    object: &Map<String, Value>,
    rng: &mut R,
) -> Result<GeneratedQuestion, GenerationFailure> {
    let question = object
        .get("question")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| GenerationFailure::ParseFailure("missing question text".to_string()))?
        .to_string();

    let options = parse_options(object.get("options"))?;

    let raw_answer = object.get("correctAnswer").or_else(|| object.get("correct_answer"));
    let correct_answer = match raw_answer.and_then(answer_index) {
        Some(index) => index,
        None => {
            let repaired = rng.gen_range(0..OPTION_COUNT);
            warn!(
                correct_answer = ?raw_answer,
                repaired_to = repaired,
                "correctAnswer missing or out of range, picking a random index"
            );
            repaired
        }
    };

    let explanation = object
        .get("explanation")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("The correct answer is \"{}\".", options[correct_answer]));

    Ok(GeneratedQuestion {
        question,
        options,
        correct_answer,
        explanation,
    })
}

fn parse_options(value: Option<&Value>) -> Result<Vec<String>, GenerationFailure> {
    let entries = value
        .and_then(Value::as_array)
        .ok_or_else(|| GenerationFailure::ParseFailure("options is missing or not a list".to_string()))?;

    if entries.len() != OPTION_COUNT {
        return Err(GenerationFailure::ParseFailure(format!(
            "expected {} options, got {}",
            OPTION_COUNT,
            entries.len()
        )));
    }

    let mut texts = Vec::with_capacity(OPTION_COUNT);
    for (index, entry) in entries.iter().enumerate() {
        let text = match entry {
            Value::String(text) => text.trim().to_string(),
            Value::Number(number) => number.to_string(),
            _ => {
                return Err(GenerationFailure::ParseFailure(format!(
                    "option {} is not text",
                    index + 1
                )));
            }
        };
        texts.push(text);
    }

    if has_sequential_labels(&texts) {
        debug!("Stripping letter labels from options");
        texts = texts
            .iter()
            .map(|text| OPTION_LABEL.replace(text, "").trim().to_string())
            .collect();
    }

    let mut seen = HashSet::new();
    let mut options = Vec::with_capacity(OPTION_COUNT);
    for (index, text) in texts.into_iter().enumerate() {
        if text.is_empty() {
            return Err(GenerationFailure::ParseFailure(format!("option {} is empty", index + 1)));
        }
        if !seen.insert(text.to_lowercase()) {
            return Err(GenerationFailure::ParseFailure(format!(
                "option {} duplicates an earlier option",
                index + 1
            )));
        }
        options.push(text);
    }

    Ok(options)
}

/// True when the options read "A. ..", "B. ..", "C. ..", "D. .." in order, with
/// one letter case, one delimiter and consistent parentheses throughout.
fn has_sequential_labels(texts: &[String]) -> bool {
    let mut style: Option<(bool, bool, char)> = None;

    for (index, text) in texts.iter().enumerate() {
        let Some(captures) = OPTION_LABEL.captures(text) else {
            return false;
        };
        let Some(letter) = captures["letter"].chars().next() else {
            return false;
        };
        let Some(delim) = captures["delim"].chars().next() else {
            return false;
        };
        let open = !captures["open"].is_empty();

        let expected = (b'a' + index as u8) as char;
        if letter.to_ascii_lowercase() != expected || (open && delim != ')') {
            return false;
        }

        let current = (open, letter.is_ascii_uppercase(), delim);
        match style {
            None => style = Some(current),
            Some(first) if first != current => return false,
            Some(_) => {}
        }
    }

    style.is_some()
}

fn answer_index(value: &Value) -> Option<usize> {
    let index = match value {
        Value::Number(number) => match number.as_u64() {
            Some(index) => index,
            None => {
                let float = number.as_f64()?;
                if float.fract() != 0.0 || float < 0.0 {
                    return None;
                }
                float as u64
            }
        },
        Value::String(text) => text.trim().parse::<u64>().ok()?,
        _ => return None,
    };

    usize::try_from(index).ok().filter(|index| *index < OPTION_COUNT)
}
