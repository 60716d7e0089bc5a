use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Note,
};

#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn create(&self, note: Note) -> AppResult<Note>;
    /// Notes of one user on one book, newest first.
    async fn find_by_book(&self, book_id: &str, user_id: i64) -> AppResult<Vec<Note>>;
    /// Deletes a note owned by `user_id`; `NotFound` when nothing matched.
    async fn delete(&self, note_id: &str, user_id: i64) -> AppResult<()>;
}

pub struct MongoNoteRepository {
    collection: Collection<Note>,
}

impl MongoNoteRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for notes collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let book_user_index = IndexModel::builder()
            .keys(doc! { "book_id": 1, "user_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("book_user".to_string())
                    .build(),
            )
            .build();

        self.collection
            .create_indexes(vec![id_index, book_user_index])
            .await?;

        log::info!("Successfully created indexes for notes collection");
        Ok(())
    }
}

#[async_trait]
impl NoteRepository for MongoNoteRepository {
    async fn create(&self, note: Note) -> AppResult<Note> {
        self.collection.insert_one(&note).await?;
        Ok(note)
    }

    async fn find_by_book(&self, book_id: &str, user_id: i64) -> AppResult<Vec<Note>> {
        let cursor = self
            .collection
            .find(doc! { "book_id": book_id, "user_id": user_id })
            .await?;
        let mut notes: Vec<Note> = cursor.try_collect().await?;

        // created_at is stored as an RFC 3339 string whose fraction width
        // varies, so order on the parsed value.
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(notes)
    }

    async fn delete(&self, note_id: &str, user_id: i64) -> AppResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "id": note_id, "user_id": user_id })
            .await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Note with id '{}' not found",
                note_id
            )));
        }

        Ok(())
    }
}
