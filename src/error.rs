//! Error types for smlt

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::routes::ApiResponse;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The identity provider rejected the request (bad credentials, validation failure, expired token)
    #[error("Auth provider error ({status}): {message}")]
    Provider {
        status: u16,
        message: String,
        data: serde_json::Value,
    },

    #[error("Course not found")]
    CourseNotFound(String),

    #[error("Lesson not found")]
    LessonNotFound(String),

    #[error("Quiz not found")]
    QuizNotFound(String),

    #[error("Content error: {0}")]
    Content(String),

    #[error("Config file not found. Run 'smlt init' first.")]
    ConfigNotFound,

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// HTTP status this error maps to at the route layer
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::CourseNotFound(_) | Error::LessonNotFound(_) | Error::QuizNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Error::Provider { status, .. } => {
                StatusCode::from_u16(*status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_REQUEST)
            }
            Error::Http(_) | Error::Content(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is a route-level "entity not found" signal
    pub fn is_not_found(&self) -> bool {
        self.status_code() == StatusCode::NOT_FOUND
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(ApiResponse::<()>::err(self.to_string()))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(Error::CourseNotFound("3".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::LessonNotFound("3".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::QuizNotFound("abc".into()).status_code(), StatusCode::NOT_FOUND);
        assert!(Error::QuizNotFound("3".into()).is_not_found());
    }

    #[test]
    fn test_provider_status_passthrough() {
        let err = Error::Provider {
            status: 400,
            message: "Failed to authenticate.".to_string(),
            data: serde_json::Value::Null,
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = Error::Provider {
            status: 0,
            message: "Something went wrong".to_string(),
            data: serde_json::Value::Null,
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_content_failure_is_bad_gateway() {
        let err = Error::Content("courses.json returned 500".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(!err.is_not_found());
    }
}
