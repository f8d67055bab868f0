use crate::board::applications::ApplicationError;
use crate::board::jobs::JobError;
use crate::board::users::UserError;
use crate::config::ConfigError;
use crate::store::StoreError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Top-level failure when assembling or running the service.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Board(BoardError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Board(err) => write!(f, "board error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Board(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<BoardError> for AppError {
    fn from(value: BoardError) -> Self {
        Self::Board(value)
    }
}

/// Domain-operation failure surfaced through the HTTP layer. Wraps the
/// per-service errors and maps them onto response codes in one place.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Job(#[from] JobError),
    #[error(transparent)]
    Application(#[from] ApplicationError),
}

impl BoardError {
    fn status(&self) -> StatusCode {
        match self {
            BoardError::User(UserError::Validation(_))
            | BoardError::Job(JobError::Validation(_))
            | BoardError::Application(ApplicationError::Validation(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            BoardError::User(UserError::DuplicateEmail) => StatusCode::CONFLICT,
            BoardError::User(UserError::NotFound)
            | BoardError::Job(JobError::NotFound)
            | BoardError::Application(ApplicationError::NotFound)
            | BoardError::Application(ApplicationError::JobNotFound) => StatusCode::NOT_FOUND,
            BoardError::User(UserError::Policy(_))
            | BoardError::Job(JobError::Policy(_))
            | BoardError::Application(ApplicationError::Policy(_)) => StatusCode::FORBIDDEN,
            BoardError::User(UserError::Store(err))
            | BoardError::Job(JobError::Store(err))
            | BoardError::Application(ApplicationError::Store(err)) => store_status(err),
        }
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::RevisionMismatch { .. } => StatusCode::CONFLICT,
        StoreError::NotFound => StatusCode::NOT_FOUND,
        StoreError::Unavailable(_) | StoreError::Malformed(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
