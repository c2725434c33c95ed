use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use color_eyre::eyre::Report;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(Report),
}

impl ApiError {
    pub fn is_internal(&self) -> bool {
        matches!(self, ApiError::Internal(_))
    }
}

impl From<Report> for ApiError {
    fn from(report: Report) -> Self {
        ApiError::Internal(report)
    }
}

impl From<DetailError> for ApiError {
    fn from(err: DetailError) -> Self {
        ApiError::BadRequest(format!("vote detail unavailable: {}", err))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Store failures are logged in full, the caller only learns that one happened.
        let error = match self {
            ApiError::Internal(_) => "internal error".to_owned(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { error })
    }
}

/// Failure of one of the remote lookups behind a vote detail.
#[derive(Error, Debug)]
pub enum DetailError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("remote lookups did not finish within {0:?}")]
    Timeout(Duration),
}
