use crate::{
    constants::prompts::{
        CHAT_RESPONSE_RULES, MULTIPLE_CHOICE_SCHEMA, NOTE_INSIGHT_RULES, QUIZ_OUTPUT_RULES,
        SHORT_ANSWER_SCHEMA, TRUE_FALSE_SCHEMA,
    },
    models::domain::{ContentKind, GenerationRequest},
};

const MULTIPLE_CHOICE_REQUIREMENTS: &str = "- Exactly 4 options per question.
- Exactly 1 correct option; `correct_answer_index` is its 0-based position in `options`.";
const TRUE_FALSE_REQUIREMENTS: &str = "- Each question is a single statement that is either true or false.
- `answer` is the JSON boolean true or false, not a string.";
const SHORT_ANSWER_REQUIREMENTS: &str = "- Each `answer` is a short phrase or one sentence.";

/// Builds the prompt for one generation request. Pure function of its input.
pub fn build(request: &GenerationRequest) -> String {
    match request.content_kind() {
        ContentKind::MultipleChoice => build_quiz(
            request,
            "multiple-choice",
            MULTIPLE_CHOICE_REQUIREMENTS,
            MULTIPLE_CHOICE_SCHEMA,
        ),
        ContentKind::TrueFalse => build_quiz(
            request,
            "true/false",
            TRUE_FALSE_REQUIREMENTS,
            TRUE_FALSE_SCHEMA,
        ),
        ContentKind::ShortAnswer => build_quiz(
            request,
            "short-answer",
            SHORT_ANSWER_REQUIREMENTS,
            SHORT_ANSWER_SCHEMA,
        ),
        ContentKind::FreeChat => build_chat(request),
    }
}

/// Prompt for the reading-note insight generated from text selected in a book.
pub fn build_note_insight(selected_text: &str) -> String {
    format!(
        "You are a helpful reading assistant. The user selected the following text from a book:
\"{selected_text}\"

Please provide a concise explanation and insight based on this text.
{NOTE_INSIGHT_RULES}"
    )
}

fn book_line(request: &GenerationRequest) -> String {
    match request.book_author() {
        Some(author) => format!("\"{}\" by {}", request.book_title(), author),
        None => format!("\"{}\"", request.book_title()),
    }
}

fn build_quiz(
    request: &GenerationRequest,
    description: &str,
    requirements: &str,
    schema: &str,
) -> String {
    let count = request.question_count();
    let difficulty = request.difficulty();

    format!(
        "Generate exactly {count} {description} questions about the book {book}.
Difficulty: {difficulty}.

## REQUIREMENTS

- Generate EXACTLY {count} questions, no more and no fewer.
{requirements}
- Base every question on the book's content.

{QUIZ_OUTPUT_RULES}

## FORMAT

Set \"book_title\" to \"{title}\" and \"difficulty\" to \"{difficulty}\".

{schema}",
        book = book_line(request),
        title = request.book_title(),
    )
}

fn build_chat(request: &GenerationRequest) -> String {
    let author_line = request
        .book_author()
        .map(|author| format!("\n- Author: {author}"))
        .unwrap_or_default();

    format!(
        "You are a knowledgeable, concise AI book assistant in a bookstore app.

Book context:
- Title: {title}{author_line}

User question:
\"{question}\"

{CHAT_RESPONSE_RULES}",
        title = request.book_title(),
        question = request.user_prompt().unwrap_or_default(),
    )
}
