//! Error handling for the inventory gateway
//!
//! Provides consistent error responses in English and Arabic. When the ERP
//! backend explains a failure its message is passed through; otherwise a
//! generic localized message is used.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::FieldError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Session errors
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Upstream (ERP backend) errors
    #[error("Upstream rejected the request ({status})")]
    Upstream {
        status: u16,
        message: Option<String>,
    },

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed upstream response: {0}")]
    UpstreamDecode(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<FieldError> for AppError {
    fn from(e: FieldError) -> Self {
        AppError::Validation {
            field: e.field,
            message: e.message,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AppError::UpstreamDecode(e.to_string())
        } else {
            AppError::UpstreamUnavailable(e.to_string())
        }
    }
}

impl AppError {
    /// Message the server gave us, if any
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            AppError::Upstream { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_ar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    fn new(code: &str, message_en: impl Into<String>, message_ar: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message_en: message_en.into(),
            message_ar: message_ar.into(),
            field: None,
        }
    }
}

fn upstream_status(status: u16) -> StatusCode {
    match status {
        400 | 404 | 409 | 422 => {
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        401 => StatusCode::UNAUTHORIZED,
        403 => StatusCode::FORBIDDEN,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("TOKEN_EXPIRED", "Session has expired", "انتهت صلاحية الجلسة"),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_TOKEN", "Invalid session token", "رمز الجلسة غير صالح"),
            ),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", msg.clone(), "غير مصرح"),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new(
                        "VALIDATION_ERROR",
                        message.clone(),
                        format!("بيانات غير صحيحة: {}", message),
                    )
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "NOT_FOUND",
                    format!("{} not found", resource),
                    format!("لم يتم العثور على {}", resource),
                ),
            ),
            AppError::Upstream { status, message } => {
                let (en, ar) = match message.as_deref().filter(|m| !m.trim().is_empty()) {
                    Some(m) => (m.to_string(), m.to_string()),
                    None => (
                        "The operation could not be completed".to_string(),
                        "تعذر إتمام العملية".to_string(),
                    ),
                };
                (upstream_status(*status), ErrorDetail::new("UPSTREAM_ERROR", en, ar))
            }
            AppError::UpstreamUnavailable(_) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new(
                    "UPSTREAM_UNAVAILABLE",
                    "The inventory service is unavailable",
                    "خدمة المخزون غير متاحة حالياً",
                ),
            ),
            AppError::UpstreamDecode(_) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new(
                    "UPSTREAM_DECODE_ERROR",
                    "Unexpected response from the inventory service",
                    "استجابة غير متوقعة من خدمة المخزون",
                ),
            ),
            AppError::Cancelled => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail::new("CANCELLED", "Request was cancelled", "تم إلغاء الطلب"),
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "CONFIGURATION_ERROR",
                    format!("Configuration error: {}", msg),
                    "خطأ في الإعدادات",
                ),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone(), "حدث خطأ داخلي في الخادم"),
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
