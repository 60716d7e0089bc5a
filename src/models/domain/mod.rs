pub mod generation;
pub mod note;
pub mod quiz_item;
pub use generation::{ContentKind, Difficulty, GenerationRequest, QuizParams};
pub use note::Note;
pub use quiz_item::{ChatReply, MultipleChoiceItem, QuizItem, ShortAnswerItem, TrueFalseItem};
