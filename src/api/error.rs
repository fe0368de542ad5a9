use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::error::LibraryError;

/// HTTP face of [`LibraryError`]. Internal details stay in the server log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error("missing owner identity")]
    Unauthorized,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Library(LibraryError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Library(LibraryError::Conflict(_)) => StatusCode::BAD_REQUEST,
            ApiError::Library(LibraryError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Library(LibraryError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Library(LibraryError::Internal(_)) => "Server error".to_string(),
            ApiError::Library(err) => err.to_string(),
            ApiError::Unauthorized => "Missing owner identity".to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Library(LibraryError::from(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Library(LibraryError::invalid_input(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Library(LibraryError::invalid_input(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Library(LibraryError::Internal(err)) = &self {
            error!("Request failed: {err:#}");
        }

        let status = self.status();
        (status, Json(json!({ "message": self.message() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
