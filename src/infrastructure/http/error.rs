//! HTTP Error Handling
//!
//! OpenAI 兼容错误格式：`{"error": {"message", "type", "code"}}`，配合真实 HTTP 状态码

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::GatewayError;

/// 错误类型
pub mod error_type {
    pub const INVALID_REQUEST: &str = "invalid_request_error";
    pub const SERVICE_UNAVAILABLE: &str = "service_unavailable";
    pub const BACKEND_ERROR: &str = "backend_error";
    pub const SERVER_ERROR: &str = "server_error";
    pub const ALIGNMENT_ERROR: &str = "alignment_error";
    pub const SERVICE_BUSY: &str = "service_busy";
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub code: &'static str,
}

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// API 错误
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub code: &'static str,
    pub message: String,
    /// 仅 ServiceBusy 设置，写入 `Retry-After`
    pub retry_after_secs: Option<u64>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        kind: &'static str,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            kind,
            code,
            message: message.into(),
            retry_after_secs: None,
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            error_type::INVALID_REQUEST,
            code,
            message,
        )
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_type::SERVICE_UNAVAILABLE,
            "backend_unavailable",
            message,
        )
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        let message = e.to_string();
        match e {
            GatewayError::InvalidVoice(_) => ApiError::bad_request("invalid_voice", message),
            GatewayError::InvalidParameter(_) => {
                ApiError::bad_request("invalid_parameter", message)
            }
            GatewayError::DecodeError(_) => ApiError::bad_request("invalid_audio", message),
            GatewayError::BackendUnavailable { .. } => ApiError::service_unavailable(message),
            // 后端拒绝请求（4xx）视为调用方错误
            GatewayError::BackendError {
                status: Some(status),
                ..
            } if (400..500).contains(&status) => ApiError::new(
                StatusCode::BAD_REQUEST,
                error_type::BACKEND_ERROR,
                "backend_rejected",
                message,
            ),
            GatewayError::BackendError { .. } => ApiError::new(
                StatusCode::BAD_GATEWAY,
                error_type::BACKEND_ERROR,
                "backend_error",
                message,
            ),
            GatewayError::EncodeError(_) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_type::SERVER_ERROR,
                "encode_error",
                message,
            ),
            GatewayError::AlignmentTimeout(_) => ApiError::new(
                StatusCode::GATEWAY_TIMEOUT,
                error_type::ALIGNMENT_ERROR,
                "alignment_timeout",
                message,
            ),
            GatewayError::AlignmentFailure(_) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_type::ALIGNMENT_ERROR,
                "alignment_failed",
                message,
            ),
            GatewayError::ServiceBusy(wait) => {
                let mut err = ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    error_type::SERVICE_BUSY,
                    "service_busy",
                    message,
                );
                err.retry_after_secs = Some(wait.as_secs_f64().ceil().max(1.0) as u64);
                err
            }
            GatewayError::Internal(_) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_type::SERVER_ERROR,
                "internal_error",
                message,
            ),
        }
    }
}

/// 请求体 JSON 解析失败（语法错误 400，字段错误 422）
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(
            rejection.status(),
            error_type::INVALID_REQUEST,
            "invalid_json",
            rejection.body_text(),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = self.status.as_u16(),
                code = self.code,
                error = %self.message,
                "Request failed"
            );
        } else {
            tracing::warn!(
                status = self.status.as_u16(),
                code = self.code,
                error = %self.message,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                message: self.message,
                kind: self.kind,
                code: self.code,
            },
        };

        let mut response = (self.status, Json(body)).into_response();
        if let Some(secs) = self.retry_after_secs {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
