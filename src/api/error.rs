use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::{ErrorResponse, json_response};

/// Failures at the HTTP/CLI boundary. The projection itself cannot fail.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid API JSON payload: {0}")]
    InvalidJson(String),

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error("Not found")]
    NotFound,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_) | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        json_response(
            self.status(),
            ErrorResponse {
                error: self.to_string(),
            },
        )
    }
}
