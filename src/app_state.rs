use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{MongoNoteRepository, NoteRepository},
    services::{
        chat_service::ChatService,
        generation_client::{GeminiClient, GenerationClient},
        note_service::NoteService,
        quiz_service::QuizService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub chat_service: Arc<ChatService>,
    pub note_service: Arc<NoteService>,
    pub db: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let client: Arc<dyn GenerationClient> = Arc::new(GeminiClient::from_config(&config)?);

        let db = Database::connect(&config).await?;
        let note_repository = Arc::new(MongoNoteRepository::new(&db, &config.notes_collection));
        note_repository.ensure_indexes().await?;

        let mut state = Self::from_parts(config, client, note_repository);
        state.db = Some(db);
        Ok(state)
    }

    /// Wires the services around an existing client and note store.
    pub fn from_parts(
        config: Config,
        client: Arc<dyn GenerationClient>,
        note_repository: Arc<dyn NoteRepository>,
    ) -> Self {
        let budgets = config.budgets;

        let quiz_service = Arc::new(QuizService::new(Arc::clone(&client), budgets));
        let chat_service = Arc::new(ChatService::new(Arc::clone(&client), budgets));
        let note_service = Arc::new(NoteService::new(note_repository, client, budgets.note));

        Self {
            quiz_service,
            chat_service,
            note_service,
            db: None,
            config: Arc::new(config),
        }
    }
}
