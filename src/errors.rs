use std::collections::BTreeMap;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use derive_more::derive::{Display, Error as DeriveMoreError};

#[derive(Debug, Error)]
pub enum AppError{
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Cant bind to the Socket")]
    SocketBind,
    #[error("Cant connect to the DB")]
    DbConnect,
    #[error("Cant start the server")]
    ServerStart,
}

/// Failures reported by the model layer.
#[derive(Debug, Error)]
pub enum ModelError{
    #[error("record not found")]
    RecordNotFound,
    #[error("edit conflict")]
    EditConflict,
    #[error("failed validation")]
    FailedValidation(BTreeMap<String, String>),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("database operation timed out")]
    Timeout,
}

impl ModelError {
    /// Whether repeating the same call could succeed without any change from
    /// the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelError::Timeout => true,
            ModelError::Database(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::WorkerCrashed
            ),
            _ => false,
        }
    }
}

impl ResponseError for ModelError {
    fn status_code(&self) -> StatusCode {
        match *self {
            ModelError::RecordNotFound => StatusCode::NOT_FOUND,
            ModelError::EditConflict => StatusCode::CONFLICT,
            ModelError::FailedValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ModelError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ModelError::Timeout => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ModelError::RecordNotFound => json!({"error": "the requested resource could not be found"}),
            ModelError::EditConflict => json!({"error": "unable to update the record due to an edit conflict, please try again"}),
            ModelError::FailedValidation(errors) => json!({"error": errors}),
            ModelError::Database(_) | ModelError::Timeout => {
                tracing::error!(error = %self, retryable = self.is_retryable(), "server error");
                json!({"error": "the server encountered a problem and could not process your request"})
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[derive(Debug, Display, DeriveMoreError, Serialize, Deserialize)]
#[display("error :{}", error)]
pub struct CustomError{
    pub error:String
}

impl ResponseError for CustomError{
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}
