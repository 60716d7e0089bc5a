use std::sync::Arc;

use crate::{
    errors::{AppResult, GenerationError},
    models::domain::Note,
    repositories::NoteRepository,
    services::{
        generation_client::{GenerationClient, GenerationOptions},
        prompt_builder,
    },
};

const NOTE_TEMPERATURE: f32 = 0.3;

pub struct NoteService {
    repository: Arc<dyn NoteRepository>,
    client: Arc<dyn GenerationClient>,
    max_output_tokens: u32,
}

impl NoteService {
    pub fn new(
        repository: Arc<dyn NoteRepository>,
        client: Arc<dyn GenerationClient>,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            repository,
            client,
            max_output_tokens,
        }
    }

    pub async fn create_note(&self, user_id: i64, book_id: &str, content: &str) -> AppResult<Note> {
        let note = Note::new(user_id, book_id, content, false);
        self.repository.create(note).await
    }

    pub async fn get_notes(&self, user_id: i64, book_id: &str) -> AppResult<Vec<Note>> {
        self.repository.find_by_book(book_id, user_id).await
    }

    pub async fn delete_note(&self, user_id: i64, note_id: &str) -> AppResult<()> {
        self.repository.delete(note_id, user_id).await
    }

    /// Asks the model for an insight on `selected_text` and saves it as an
    /// AI-generated note. Nothing is stored when generation fails.
    pub async fn generate_ai_note(
        &self,
        user_id: i64,
        book_id: &str,
        selected_text: &str,
    ) -> AppResult<Note> {
        let prompt = prompt_builder::build_note_insight(selected_text);
        let options = GenerationOptions::plain_text(self.max_output_tokens, NOTE_TEMPERATURE);

        log::info!("Generating AI note for book_id={}", book_id);

        let raw = self.client.generate(&prompt, options).await?;
        let content = raw.trim();
        if content.is_empty() {
            return Err(GenerationError::EmptyResponse.into());
        }

        let note = Note::new(user_id, book_id, content, true);
        self.repository.create(note).await
    }
}
