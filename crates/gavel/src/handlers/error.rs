//! api error handling for http handlers

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use gavel_auction::BidError;
use crate::acceptor::SubmitError;

/// api error type for handler responses
#[derive(Debug)]
pub enum ApiError {
    /// bad request (400)
    BadRequest(String),
    /// unauthorized (401)
    Unauthorized(String),
    /// forbidden (403)
    Forbidden(String),
    /// not found (404)
    NotFound(String),
    /// unprocessable entity (422)
    Unprocessable(String),
    /// internal server error (500)
    Internal(String),
    /// service unavailable (503)
    Unavailable(String),
}

impl ApiError {
    /// create internal server error from any error type
    pub fn internal(e: impl std::fmt::Display) -> Self {
        Self::Internal(e.to_string())
    }

    /// create bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// create unauthorized error
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// create not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// create unprocessable entity error
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::Unprocessable(msg.into())
    }
}

/// json body for error responses
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::NotFound => ApiError::NotFound(err.to_string()),
            SubmitError::Rejected(ref rejection) => {
                let message = rejection.to_string();
                match rejection {
                    BidError::InvalidState | BidError::Expired => ApiError::BadRequest(message),
                    BidError::SellerConflict => ApiError::Forbidden(message),
                    BidError::BidTooLow { .. } => ApiError::Unprocessable(message),
                }
            }
            SubmitError::Contention => ApiError::Unavailable(err.to_string()),
            SubmitError::Storage(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<gavel_db::Error> for ApiError {
    fn from(err: gavel_db::Error) -> Self {
        match err {
            gavel_db::Error::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
