use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::types::Failure;

/// Failure envelope for every route: `{ "success": false, "error": <message> }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 500 with `message` when there is one, else `fallback`.
    pub fn internal_or(message: Option<String>, fallback: &str) -> Self {
        match message {
            Some(m) if !m.is_empty() => Self::Internal(m),
            _ => Self::Internal(fallback.to_string()),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        let body = Failure { success: false, error: self.to_string() };
        (code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_used_without_message() {
        assert_eq!(ApiError::internal_or(None, "Failed").to_string(), "Failed");
        assert_eq!(ApiError::internal_or(Some(String::new()), "Failed").to_string(), "Failed");
        assert_eq!(ApiError::internal_or(Some("boom".into()), "Failed").to_string(), "boom");
    }

    #[test]
    fn status_codes() {
        assert_eq!(ApiError::bad_request("x").into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::internal("x").into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
