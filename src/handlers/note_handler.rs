use actix_web::{delete, get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{CreateNoteRequest, GenerateAiNoteRequest},
        response::{DataResponse, NoteDto, NotesDto},
    },
};

#[post("/notes")]
pub async fn create_note(
    state: web::Data<AppState>,
    request: web::Json<CreateNoteRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let note = state
        .note_service
        .create_note(auth.id(), &request.book_id, &request.content)
        .await?;
    Ok(HttpResponse::Created().json(DataResponse::new(NoteDto { note })))
}

#[post("/notes/ai")]
pub async fn generate_ai_note(
    state: web::Data<AppState>,
    request: web::Json<GenerateAiNoteRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let note = state
        .note_service
        .generate_ai_note(auth.id(), &request.book_id, &request.text)
        .await?;
    Ok(HttpResponse::Created().json(DataResponse::new(NoteDto { note })))
}

#[get("/notes/{book_id}")]
pub async fn get_notes(
    state: web::Data<AppState>,
    book_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let notes = state.note_service.get_notes(auth.id(), &book_id).await?;
    Ok(HttpResponse::Ok().json(DataResponse::new(NotesDto { notes })))
}

#[delete("/notes/{note_id}")]
pub async fn delete_note(
    state: web::Data<AppState>,
    note_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.note_service.delete_note(auth.id(), &note_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::USER_ID_HEADER,
        test_utils::test_helpers::{test_state, StubGenerationClient},
    };
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    macro_rules! note_app {
        ($client:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(test_state($client)))
                    .service(generate_ai_note)
                    .service(create_note)
                    .service(get_notes)
                    .service(delete_note),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_note_lifecycle() {
        let app = note_app!(StubGenerationClient::replying("unused"));

        let req = test::TestRequest::post()
            .uri("/notes")
            .insert_header((USER_ID_HEADER, "11"))
            .set_json(json!({"book_id": "dune", "content": "The litany against fear"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: serde_json::Value = test::read_body_json(resp).await;
        let note_id = created["data"]["note"]["id"]
            .as_str()
            .expect("note id")
            .to_string();
        assert_eq!(created["data"]["note"]["is_ai_generated"], false);

        let req = test::TestRequest::get()
            .uri("/notes/dune")
            .insert_header((USER_ID_HEADER, "11"))
            .to_request();
        let listed: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed["data"]["notes"].as_array().map(Vec::len), Some(1));

        let req = test::TestRequest::delete()
            .uri(&format!("/notes/{note_id}"))
            .insert_header((USER_ID_HEADER, "12"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete()
            .uri(&format!("/notes/{note_id}"))
            .insert_header((USER_ID_HEADER, "11"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn test_generate_ai_note() {
        let app = note_app!(StubGenerationClient::replying(
            "  Fear is what stops us from acting.  "
        ));

        let req = test::TestRequest::post()
            .uri("/notes/ai")
            .insert_header((USER_ID_HEADER, "11"))
            .set_json(json!({"book_id": "dune", "text": "Fear is the mind-killer."}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["note"]["content"], "Fear is what stops us from acting.");
        assert_eq!(body["data"]["note"]["is_ai_generated"], true);
    }

    #[actix_web::test]
    async fn test_create_note_validates_body() {
        let app = note_app!(StubGenerationClient::replying("unused"));

        let req = test::TestRequest::post()
            .uri("/notes")
            .insert_header((USER_ID_HEADER, "11"))
            .set_json(json!({"book_id": "dune", "content": ""}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_notes_require_user() {
        let app = note_app!(StubGenerationClient::replying("unused"));

        let req = test::TestRequest::get().uri("/notes/dune").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
