use crate::models::{Envelope, FieldErrors};
use axum::{http::StatusCode, Json};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("Action with ID {0} does not exist")]
    NotFound(u64),

    #[error("failed to persist actions: {0}")]
    Storage(#[from] std::io::Error),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: Option<String>,
    pub errors: Option<FieldErrors>,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Invalid request body",
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn validation(errors: FieldErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Validation failed",
            message: None,
            errors: Some(errors),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: "Action not found",
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: "Internal server error",
            message: Some(err.to_string()),
            errors: None,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(errors) => Self::validation(errors),
            RepositoryError::NotFound(_) => Self::not_found(err.to_string()),
            RepositoryError::Storage(_) => Self::internal(err),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body: Envelope<Value> = Envelope {
            success: false,
            error: Some(self.error.to_string()),
            message: self.message,
            errors: self.errors,
            ..Envelope::default()
        };
        (self.status, Json(body)).into_response()
    }
}
