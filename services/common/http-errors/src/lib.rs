use axum::{http::{StatusCode, HeaderValue}, response::{IntoResponse, Response}, Json};
use serde::Serialize;

#[derive(Serialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub status: Status,
    pub message: String,
}

/// Success envelope: `{"status": "success", "data": ...}`.
#[derive(Serialize, Debug)]
pub struct SuccessBody<T: Serialize> {
    pub status: Status,
    pub data: T,
}

impl<T: Serialize> SuccessBody<T> {
    pub fn new(data: T) -> Self { Self { status: Status::Success, data } }
}

impl<T: Serialize> IntoResponse for SuccessBody<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: &'static str, message: String },
    Gone { code: &'static str, message: String },
    Internal { code: &'static str, message: String },
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self { Self::BadRequest { code, message: message.into() } }
    pub fn gone(code: &'static str, message: impl Into<String>) -> Self { Self::Gone { code, message: message.into() } }
    pub fn internal<E: std::fmt::Display>(e: E) -> Self { Self::Internal { code: "internal_error", message: e.to_string() } }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Gone { .. } => StatusCode::GONE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest { code, .. }
            | ApiError::Gone { code, .. }
            | ApiError::Internal { code, .. } => code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest { message, .. }
            | ApiError::Gone { message, .. }
            | ApiError::Internal { message, .. } => message,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.status().as_u16(), self.code(), self.message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_code = self.code();
        let body = match self {
            ApiError::BadRequest { message, .. }
            | ApiError::Gone { message, .. }
            | ApiError::Internal { message, .. } => ErrorBody { status: Status::Error, message },
        };
        let mut resp = (status, Json(body)).into_response();
        if let Ok(val) = HeaderValue::from_str(error_code) {
            resp.headers_mut().insert("X-Error-Code", val);
        }
        resp
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
