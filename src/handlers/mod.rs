pub mod chat_handler;
pub mod health_handler;
pub mod note_handler;
pub mod quiz_handler;

use actix_web::web;

pub use chat_handler::{get_chat_reply, stream_chat_reply};
pub use health_handler::{health_check, health_check_live, health_check_ready};
pub use note_handler::{create_note, delete_note, generate_ai_note, get_notes};
pub use quiz_handler::{
    get_multiple_choice_questions, get_short_answer_questions, get_true_false_questions,
};

/// Registers every route of the service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_ready)
        .service(health_check_live)
        .service(get_multiple_choice_questions)
        .service(get_true_false_questions)
        .service(get_short_answer_questions)
        .service(get_chat_reply)
        .service(stream_chat_reply)
        .service(generate_ai_note)
        .service(create_note)
        .service(get_notes)
        .service(delete_note);
}
