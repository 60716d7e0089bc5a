use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::{errors::GenerationError, models::domain::QuizItem};

static LEADING_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*(\r?\n)?").expect("LEADING_FENCE is a valid regex pattern")
});

static TRAILING_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\r?\n)?[ \t]*```$").expect("TRAILING_FENCE is a valid regex pattern")
});

/// Wrapper object every quiz response must use.
#[derive(Debug, Deserialize)]
struct QuizEnvelope<T> {
    #[serde(default)]
    book_title: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    quizzes: Vec<T>,
}

/// Removes surrounding whitespace and a markdown code fence, if the model
/// added one anyway.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();

    let body = match LEADING_FENCE.find(trimmed) {
        Some(fence) => &trimmed[fence.end()..],
        None => trimmed,
    };
    let body = match TRAILING_FENCE.find(body) {
        Some(fence) => &body[..fence.start()],
        None => body,
    };

    body.trim()
}

/// Decodes a quiz batch of exactly `expected_count` items. All or nothing:
/// one bad item fails the whole batch.
pub fn decode<T: QuizItem>(raw: &str, expected_count: u32) -> Result<Vec<T>, GenerationError> {
    if raw.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let body = strip_code_fences(raw);
    if body.is_empty() {
        return Err(GenerationError::SchemaViolation(
            "response holds an empty code block".to_string(),
        ));
    }

    let envelope: QuizEnvelope<T> = serde_json::from_str(body).map_err(|e| {
        GenerationError::SchemaViolation(format!("invalid {} response: {e}", T::KIND))
    })?;

    if envelope.quizzes.is_empty() {
        return Err(GenerationError::SchemaViolation(
            "response contains no quiz items".to_string(),
        ));
    }

    let expected = expected_count as usize;
    if envelope.quizzes.len() != expected {
        return Err(GenerationError::SchemaViolation(format!(
            "expected {} quiz items, got {}",
            expected,
            envelope.quizzes.len()
        )));
    }

    for item in &envelope.quizzes {
        item.validate().map_err(GenerationError::SchemaViolation)?;
    }

    log::debug!(
        "Decoded {} {} items (book_title={:?}, difficulty={:?})",
        envelope.quizzes.len(),
        T::KIND,
        envelope.book_title,
        envelope.difficulty
    );

    Ok(envelope.quizzes)
}

/// Chat replies are plain text; only emptiness is checked.
pub fn decode_chat(raw: &str) -> Result<String, GenerationError> {
    let message = raw.trim();
    if message.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(message.to_string())
}
