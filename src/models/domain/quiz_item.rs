use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::generation::ContentKind;

pub const MULTIPLE_CHOICE_OPTION_COUNT: usize = 4;

/// A quiz item shape the model is asked to produce.
///
/// `validate` runs after deserialization and rejects items whose required
/// fields are present but empty.
pub trait QuizItem: DeserializeOwned + Serialize + Send + 'static {
    const KIND: ContentKind;

    fn validate(&self) -> Result<(), String>;
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MultipleChoiceItem {
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
    #[serde(alias = "correct_option", alias = "correct_index")]
    pub correct_answer_index: usize,
    pub explanation: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrueFalseItem {
    pub id: u32,
    pub question: String,
    pub answer: bool,
    pub explanation: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShortAnswerItem {
    pub id: u32,
    pub question: String,
    pub answer: String,
    pub explanation: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub id: String,
    pub message: String,
}

fn require_text(item_id: u32, field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("item {item_id}: `{field}` is empty"));
    }
    Ok(())
}

impl QuizItem for MultipleChoiceItem {
    const KIND: ContentKind = ContentKind::MultipleChoice;

    fn validate(&self) -> Result<(), String> {
        require_text(self.id, "question", &self.question)?;
        require_text(self.id, "explanation", &self.explanation)?;

        if self.options.len() != MULTIPLE_CHOICE_OPTION_COUNT {
            return Err(format!(
                "item {}: expected {} options, got {}",
                self.id,
                MULTIPLE_CHOICE_OPTION_COUNT,
                self.options.len()
            ));
        }
        for option in &self.options {
            require_text(self.id, "options", option)?;
        }

        if self.correct_answer_index >= self.options.len() {
            return Err(format!(
                "item {}: `correct_answer_index` {} is out of range",
                self.id, self.correct_answer_index
            ));
        }

        Ok(())
    }
}

impl QuizItem for TrueFalseItem {
    const KIND: ContentKind = ContentKind::TrueFalse;

    fn validate(&self) -> Result<(), String> {
        require_text(self.id, "question", &self.question)?;
        require_text(self.id, "explanation", &self.explanation)
    }
}

impl QuizItem for ShortAnswerItem {
    const KIND: ContentKind = ContentKind::ShortAnswer;

    fn validate(&self) -> Result<(), String> {
        require_text(self.id, "question", &self.question)?;
        require_text(self.id, "answer", &self.answer)?;
        require_text(self.id, "explanation", &self.explanation)
    }
}
