#[cfg(test)]
pub mod fixtures {
    /// A well-formed multiple-choice body with `count` items.
    pub fn multiple_choice_body(title: &str, count: u32) -> String {
        let items: Vec<String> = (1..=count)
            .map(|id| {
                format!(
                    r#"{{"id": {id}, "question": "Question {id} about {title}?", "options": ["A", "B", "C", "D"], "correct_answer_index": {index}, "explanation": "Because of chapter {id}."}}"#,
                    index = (id % 4)
                )
            })
            .collect();
        wrap(title, &items)
    }

    pub fn true_false_body(title: &str, count: u32) -> String {
        let items: Vec<String> = (1..=count)
            .map(|id| {
                format!(
                    r#"{{"id": {id}, "question": "Statement {id} about {title}.", "answer": {answer}, "explanation": "See chapter {id}."}}"#,
                    answer = id % 2 == 0
                )
            })
            .collect();
        wrap(title, &items)
    }

    pub fn short_answer_body(title: &str, count: u32) -> String {
        let items: Vec<String> = (1..=count)
            .map(|id| {
                format!(
                    r#"{{"id": {id}, "question": "What happens in chapter {id} of {title}?", "answer": "Event {id}", "explanation": "It is described in chapter {id}."}}"#
                )
            })
            .collect();
        wrap(title, &items)
    }

    fn wrap(title: &str, items: &[String]) -> String {
        format!(
            r#"{{"book_title": "{title}", "difficulty": "medium", "quizzes": [{}]}}"#,
            items.join(",")
        )
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::sync::{Arc, Mutex};

    use actix_web::http::StatusCode;
    use async_trait::async_trait;
    use tokio::sync::{mpsc, Notify, RwLock};

    use crate::{
        app_state::AppState,
        config::Config,
        errors::{AppError, AppResult, GenerationError},
        models::domain::Note,
        repositories::NoteRepository,
        services::generation_client::{FragmentSender, GenerationClient, GenerationOptions},
    };

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }

    #[derive(Default)]
    pub struct InMemoryNoteRepository {
        notes: RwLock<Vec<Note>>,
    }

    impl InMemoryNoteRepository {
        pub async fn len(&self) -> usize {
            self.notes.read().await.len()
        }
    }

    #[async_trait]
    impl NoteRepository for InMemoryNoteRepository {
        async fn create(&self, note: Note) -> AppResult<Note> {
            self.notes.write().await.push(note.clone());
            Ok(note)
        }

        async fn find_by_book(&self, book_id: &str, user_id: i64) -> AppResult<Vec<Note>> {
            let mut notes: Vec<Note> = self
                .notes
                .read()
                .await
                .iter()
                .filter(|note| note.book_id == book_id && note.user_id == user_id)
                .cloned()
                .collect();
            notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(notes)
        }

        async fn delete(&self, note_id: &str, user_id: i64) -> AppResult<()> {
            let mut notes = self.notes.write().await;
            let before = notes.len();
            notes.retain(|note| !(note.id == note_id && note.user_id == user_id));

            if notes.len() == before {
                return Err(AppError::NotFound(format!(
                    "Note with id '{}' not found",
                    note_id
                )));
            }
            Ok(())
        }
    }

    /// Answers every call with the same canned result.
    pub struct StubGenerationClient {
        reply: Result<String, GenerationError>,
        fragments: Vec<String>,
    }

    impl StubGenerationClient {
        pub fn replying(reply: impl Into<String>) -> Self {
            Self {
                reply: Ok(reply.into()),
                fragments: Vec::new(),
            }
        }

        pub fn failing(err: GenerationError) -> Self {
            Self {
                reply: Err(err),
                fragments: Vec::new(),
            }
        }

        pub fn streaming(fragments: &[&str]) -> Self {
            Self {
                reply: Ok(fragments.concat()),
                fragments: fragments.iter().map(|f| f.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl GenerationClient for StubGenerationClient {
        async fn generate(
            &self,
            _prompt: &str,
            _options: GenerationOptions,
        ) -> Result<String, GenerationError> {
            self.reply.clone()
        }

        async fn generate_stream(
            &self,
            _prompt: &str,
            _options: GenerationOptions,
            fragments: FragmentSender,
        ) -> Result<(), GenerationError> {
            self.reply.clone()?;
            for fragment in &self.fragments {
                if fragments.send(Ok(fragment.clone())).await.is_err() {
                    return Ok(());
                }
            }
            Ok(())
        }
    }

    /// Streams nothing and never finishes. The probe sender is dropped
    /// together with the producer future, which lets tests observe
    /// cancellation.
    pub struct PendingStreamClient {
        probe: Mutex<Option<mpsc::Sender<()>>>,
        started: Arc<Notify>,
    }

    impl PendingStreamClient {
        pub fn new(probe: mpsc::Sender<()>) -> Self {
            Self {
                probe: Mutex::new(Some(probe)),
                started: Arc::new(Notify::new()),
            }
        }

        /// Notified once the producer future holds the probe.
        pub fn started(&self) -> Arc<Notify> {
            Arc::clone(&self.started)
        }
    }

    #[async_trait]
    impl GenerationClient for PendingStreamClient {
        async fn generate(
            &self,
            _prompt: &str,
            _options: GenerationOptions,
        ) -> Result<String, GenerationError> {
            Err(GenerationError::EmptyResponse)
        }

        async fn generate_stream(
            &self,
            _prompt: &str,
            _options: GenerationOptions,
            _fragments: FragmentSender,
        ) -> Result<(), GenerationError> {
            let probe = self.probe.lock().ok().and_then(|mut slot| slot.take());
            let _probe = probe;
            self.started.notify_one();
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    pub fn test_state(client: impl GenerationClient + 'static) -> AppState {
        AppState::from_parts(
            Config::test_config(),
            Arc::new(client),
            Arc::new(InMemoryNoteRepository::default()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::{
        models::domain::{MultipleChoiceItem, ShortAnswerItem, TrueFalseItem},
        services::response_decoder::decode,
    };

    #[test]
    fn test_fixture_bodies_decode() {
        assert_eq!(
            decode::<MultipleChoiceItem>(&multiple_choice_body("Dune", 4), 4)
                .expect("multiple choice")
                .len(),
            4
        );
        assert_eq!(
            decode::<TrueFalseItem>(&true_false_body("Dune", 2), 2)
                .expect("true/false")
                .len(),
            2
        );
        assert_eq!(
            decode::<ShortAnswerItem>(&short_answer_body("Dune", 1), 1)
                .expect("short answer")
                .len(),
            1
        );
    }
}
