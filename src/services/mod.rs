pub mod chat_service;
pub mod gemini_types;
pub mod generation_client;
pub mod note_service;
pub mod prompt_builder;
pub mod quiz_service;
pub mod response_decoder;
