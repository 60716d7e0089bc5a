use serde::Serialize;

use crate::models::domain::Note;

/// `{"data": ...}` envelope of the note endpoints.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteDto {
    pub note: Note,
}

#[derive(Debug, Serialize)]
pub struct NotesDto {
    pub notes: Vec<Note>,
}
