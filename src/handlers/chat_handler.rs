use std::convert::Infallible;

use actix_web::{get, post, web, HttpResponse};
use futures::Stream;
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::{AppError, GenerationError},
    models::dto::request::{ChatQuery, StreamQuery},
    services::chat_service::FragmentReceiver,
};

const DONE_EVENT: &[u8] = b"event: done\ndata: [DONE]\n\n";

#[post("/chats/responses/{id}")]
pub async fn get_chat_reply(
    state: web::Data<AppState>,
    id: web::Path<String>,
    query: web::Query<ChatQuery>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    query.validate()?;

    let reply = state
        .chat_service
        .get_chat_reply(&id, &query.prompt, &query.book_name)
        .await?;
    Ok(HttpResponse::Ok().json(reply))
}

#[get("/stream")]
pub async fn stream_chat_reply(
    state: web::Data<AppState>,
    query: web::Query<StreamQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    query.validate()?;

    let fragments = state.chat_service.stream_chat_reply(&query.prompt)?;

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(sse_body(fragments)))
}

/// Formats one server-sent event. Multi-line data is split across
/// several `data:` lines.
fn sse_event(event: Option<&str>, data: &str) -> String {
    let mut out = String::new();
    if let Some(event) = event {
        out.push_str("event: ");
        out.push_str(event);
        out.push('\n');
    }
    for line in data.split('\n') {
        out.push_str("data: ");
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    out
}

fn error_event(err: &GenerationError) -> String {
    let payload = serde_json::json!({
        "error": err.user_message(),
        "code": err.error_code(),
    });
    sse_event(Some("error"), &payload.to_string())
}

/// Drains the fragment channel into SSE frames. Ends with a `done` event,
/// or with an `error` event when generation failed. Dropping the body
/// drops the receiver, which cancels generation.
fn sse_body(rx: FragmentReceiver) -> impl Stream<Item = Result<web::Bytes, Infallible>> {
    futures::stream::unfold(Some(rx), |state| async move {
        let mut rx = state?;
        let (frame, next) = match rx.recv().await {
            Some(Ok(fragment)) => (web::Bytes::from(sse_event(None, &fragment)), Some(rx)),
            Some(Err(err)) => (web::Bytes::from(error_event(&err)), None),
            None => (web::Bytes::from_static(DONE_EVENT), None),
        };
        Some((Ok(frame), next))
    })
}
