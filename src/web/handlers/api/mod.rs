//! API 处理器

pub mod health;
pub mod import;
pub mod status;
pub mod translation;

pub use health::*;
pub use import::*;
pub use status::*;
pub use translation::*;

use axum::{http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::network::ImportError;
use crate::translation::TranslationError;

/// 处理器统一的错误响应
pub type ApiError = (StatusCode, Json<Value>);

pub(crate) fn error_body(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

/// 翻译错误对应的 HTTP 状态码
pub fn translation_error_status(error: &TranslationError) -> StatusCode {
    match error {
        TranslationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        TranslationError::JobNotFound(_) => StatusCode::NOT_FOUND,
        TranslationError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        TranslationError::NetworkError(_)
        | TranslationError::TimeoutError(_)
        | TranslationError::TranslationServiceError(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn translation_error_response(error: TranslationError) -> ApiError {
    let status = translation_error_status(&error);
    (
        status,
        Json(json!({ "error": error.to_string(), "code": error.code() })),
    )
}

/// 导入错误对应的 HTTP 状态码
pub fn import_error_status(error: &ImportError) -> StatusCode {
    match error {
        ImportError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
        ImportError::NoContent => StatusCode::NOT_FOUND,
        ImportError::Fetch(_) | ImportError::HttpStatus(_) => StatusCode::BAD_GATEWAY,
    }
}

pub(crate) fn import_error_response(error: ImportError) -> ApiError {
    error_body(import_error_status(&error), error.to_string())
}
