use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Failures of the generation pipeline. None of them are retried here;
/// callers decide what to tell the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("AI rate limit reached, please wait a minute and try again: {0}")]
    RateLimited(String),

    #[error("AI provider error: {0}")]
    UpstreamError(String),

    #[error("AI model returned no content")]
    EmptyResponse,

    #[error("AI response did not match the expected format: {0}")]
    SchemaViolation(String),
}

impl GenerationError {
    /// Message safe to show to the end user. Provider detail and parse
    /// errors stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::RateLimited(_) => {
                "AI rate limit reached. Please wait a minute and try again"
            }
            GenerationError::UpstreamError(_) => {
                "The AI service is unavailable, please try again later"
            }
            GenerationError::EmptyResponse => "The AI service returned no content, please try again",
            GenerationError::SchemaViolation(_) => {
                "The AI service returned an unexpected response, please try again"
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            GenerationError::RateLimited(_) => "RATE_LIMITED",
            GenerationError::UpstreamError(_) => "UPSTREAM_ERROR",
            GenerationError::EmptyResponse => "EMPTY_RESPONSE",
            GenerationError::SchemaViolation(_) => "SCHEMA_VIOLATION",
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::InternalError(_) => "INTERNAL_ERROR",
            AppError::Generation(err) => err.error_code(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub status: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Generation(GenerationError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Generation(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::Generation(err) => {
                log::warn!("Generation failed ({}): {}", err.error_code(), err);
                err.user_message().to_string()
            }
            _ => self.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error,
            code: self.error_code(),
            status: self.status_code().as_u16(),
        })
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
