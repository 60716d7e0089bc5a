use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

pub const DEFAULT_QUESTION_COUNT: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    FreeChat,
}

impl ContentKind {
    pub fn is_quiz(self) -> bool {
        !matches!(self, ContentKind::FreeChat)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::MultipleChoice => write!(f, "multiple_choice"),
            ContentKind::TrueFalse => write!(f, "true_false"),
            ContentKind::ShortAnswer => write!(f, "short_answer"),
            ContentKind::FreeChat => write!(f, "free_chat"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// Optional knobs of a quiz request. Unset fields fall back to the defaults
/// of [`GenerationRequest::quiz`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuizParams {
    pub author: Option<String>,
    pub question_count: Option<u32>,
    pub difficulty: Option<Difficulty>,
}

/// Everything the prompt builder needs for one generation call.
///
/// Built per request and dropped once the result is returned. Construct it
/// through [`GenerationRequest::quiz`] or [`GenerationRequest::free_chat`] so
/// the invariants below always hold:
///
/// * `book_title` is not blank
/// * `question_count` is positive
/// * free chat always carries a non-blank `user_prompt`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    content_kind: ContentKind,
    book_title: String,
    book_author: Option<String>,
    question_count: u32,
    difficulty: Difficulty,
    user_prompt: Option<String>,
}

impl GenerationRequest {
    pub fn quiz(content_kind: ContentKind, book_title: impl Into<String>) -> AppResult<Self> {
        if !content_kind.is_quiz() {
            return Err(AppError::ValidationError(
                "free chat requests need a user prompt".to_string(),
            ));
        }

        Ok(Self {
            content_kind,
            book_title: required_title(book_title.into())?,
            book_author: None,
            question_count: DEFAULT_QUESTION_COUNT,
            difficulty: Difficulty::default(),
            user_prompt: None,
        })
    }

    pub fn free_chat(book_title: impl Into<String>, user_prompt: impl Into<String>) -> AppResult<Self> {
        let user_prompt = user_prompt.into();
        if user_prompt.trim().is_empty() {
            return Err(AppError::ValidationError(
                "chat prompt must not be empty".to_string(),
            ));
        }

        Ok(Self {
            content_kind: ContentKind::FreeChat,
            book_title: required_title(book_title.into())?,
            book_author: None,
            question_count: DEFAULT_QUESTION_COUNT,
            difficulty: Difficulty::default(),
            user_prompt: Some(user_prompt),
        })
    }

    pub fn quiz_with_params(
        content_kind: ContentKind,
        book_title: impl Into<String>,
        params: QuizParams,
    ) -> AppResult<Self> {
        let mut request = Self::quiz(content_kind, book_title)?
            .with_author(params.author)
            .with_difficulty(params.difficulty.unwrap_or_default());

        if let Some(count) = params.question_count {
            request = request.with_question_count(count)?;
        }

        Ok(request)
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.book_author = author
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        self
    }

    pub fn with_question_count(mut self, count: u32) -> AppResult<Self> {
        if count == 0 {
            return Err(AppError::ValidationError(
                "question count must be greater than zero".to_string(),
            ));
        }
        self.question_count = count;
        Ok(self)
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn content_kind(&self) -> ContentKind {
        self.content_kind
    }

    pub fn book_title(&self) -> &str {
        &self.book_title
    }

    pub fn book_author(&self) -> Option<&str> {
        self.book_author.as_deref()
    }

    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn user_prompt(&self) -> Option<&str> {
        self.user_prompt.as_deref()
    }
}

fn required_title(title: String) -> AppResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(
            "book title must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
