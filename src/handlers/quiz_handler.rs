use actix_web::{post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState, auth::AuthenticatedUser, errors::AppError,
    models::dto::request::QuizQuery,
};

#[post("/chats/questions/multiple-choice/{id}")]
pub async fn get_multiple_choice_questions(
    state: web::Data<AppState>,
    id: web::Path<String>,
    query: web::Query<QuizQuery>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    query.validate()?;
    let (book_name, params) = query.into_parts();

    let items = state
        .quiz_service
        .get_multiple_choice_questions(&id, &book_name, params)
        .await?;
    Ok(HttpResponse::Ok().json(items))
}

#[post("/chats/questions/true-false/{id}")]
pub async fn get_true_false_questions(
    state: web::Data<AppState>,
    id: web::Path<String>,
    query: web::Query<QuizQuery>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    query.validate()?;
    let (book_name, params) = query.into_parts();

    let items = state
        .quiz_service
        .get_true_false_questions(&id, &book_name, params)
        .await?;
    Ok(HttpResponse::Ok().json(items))
}

#[post("/chats/questions/short-answer/{id}")]
pub async fn get_short_answer_questions(
    state: web::Data<AppState>,
    id: web::Path<String>,
    query: web::Query<QuizQuery>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    query.validate()?;
    let (book_name, params) = query.into_parts();

    let items = state
        .quiz_service
        .get_short_answer_questions(&id, &book_name, params)
        .await?;
    Ok(HttpResponse::Ok().json(items))
}
