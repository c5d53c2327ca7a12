//! API error types and conversions

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::ingest::IngestError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced to HTTP clients.
///
/// Bodies only carry the canonical status text; details stay in the logs.
#[derive(Debug)]
pub enum ApiError {
    /// Empty write body, wrong method on a read endpoint
    BadRequest,

    /// Routing or normalization failure
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let text = status.canonical_reason().unwrap_or_default();

        (status, text).into_response()
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::EmptyBody => ApiError::BadRequest,
            IngestError::UnsupportedPlugin { .. } | IngestError::Normalization { .. } => {
                ApiError::Internal
            }
        }
    }
}
