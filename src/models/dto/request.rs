use serde::Deserialize;
use validator::Validate;

use crate::models::domain::{Difficulty, QuizParams};

/// Query string of the three quiz endpoints.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuizQuery {
    #[validate(length(min = 1, max = 200))]
    pub book_name: String,

    #[validate(length(min = 1, max = 200))]
    pub author: Option<String>,

    #[validate(range(min = 1, max = 20))]
    pub question_count: Option<u32>,

    pub difficulty: Option<Difficulty>,
}

impl QuizQuery {
    /// Splits the query into the book name and the optional quiz knobs.
    pub fn into_parts(self) -> (String, QuizParams) {
        let params = QuizParams {
            author: self.author,
            question_count: self.question_count,
            difficulty: self.difficulty,
        };
        (self.book_name, params)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatQuery {
    #[validate(length(min = 1, max = 4000))]
    pub prompt: String,

    #[validate(length(min = 1, max = 200))]
    pub book_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StreamQuery {
    #[validate(length(min = 1, max = 4000))]
    pub prompt: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateNoteRequest {
    #[validate(length(min = 1, max = 100))]
    pub book_id: String,

    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateAiNoteRequest {
    #[validate(length(min = 1, max = 100))]
    pub book_id: String,

    #[validate(length(min = 1, max = 10000))]
    pub text: String,
}
