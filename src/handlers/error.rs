use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::{error, warn};
use serde::Serialize;
use thiserror::Error;

/// Request-path errors. Each variant maps to one status code and a JSON
/// body of the form `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing or invalid token")]
    MissingOrMalformedToken,

    /// Bad signature, malformed token and expired token all land here.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// Detail is logged, not returned.
    #[error("Invalid request")]
    BadRequest(String),

    /// Detail is logged, not returned.
    #[error("Internal server error")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidCredentials
            | ApiError::MissingOrMalformedToken
            | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::InsufficientPermissions => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Internal(detail) => error!("Internal error: {}", detail),
            ApiError::BadRequest(detail) => warn!("Rejected request: {}", detail),
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
