use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use brite_derive::api_model;
use std::borrow::Cow;
use std::fmt;

/// JSON body of every error response.
#[api_model]
pub struct ErrorBody {
    /// Human readable reason
    pub error: String,
}

/// An error that has already been mapped to an HTTP status.
///
/// Feature crates convert their own error enums into this type with
/// [`ApiError::from_status`], using the status generated by `#[brite_error]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: Cow<'static, str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self { status, message: message.into() }
    }

    /// Builds from a numeric status; unknown codes become `500`.
    pub fn from_status(status: u16, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message,
        )
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn payment_required(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::PAYMENT_REQUIRED, message)
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// A `500` with a fixed, non-revealing message.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "Request failed");
        }
        (self.status, Json(ErrorBody { error: self.message.into_owned() })).into_response()
    }
}
