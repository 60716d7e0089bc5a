use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's note on a book, written by hand or generated from selected text.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Note {
    pub id: String,
    pub user_id: i64,
    pub book_id: String,
    pub content: String,
    pub is_ai_generated: bool,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(user_id: i64, book_id: &str, content: &str, is_ai_generated: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            book_id: book_id.to_string(),
            content: content.to_string(),
            is_ai_generated,
            created_at: Utc::now(),
        }
    }
}
