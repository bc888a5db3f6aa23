use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::infrastructure::feishu::FeishuError;

/// 转发请求的错误分类，决定返回给表单的状态码和响应体
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// 上游返回 401，客户端可重试一次
    #[error("upstream rejected the tenant access token")]
    TokenExpired,

    #[error("upstream request failed: {details}")]
    Upstream { details: Value },

    #[error("invalid form: {0}")]
    InvalidForm(String),

    /// 请求体超过上传大小限制
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("uploaded image storage failed: {0}")]
    Storage(#[from] std::io::Error),
}

impl From<FeishuError> for RelayError {
    fn from(err: FeishuError) -> Self {
        if err.is_unauthorized() {
            RelayError::TokenExpired
        } else {
            RelayError::Upstream {
                details: err.details(),
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            RelayError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Token expired", "message": "Please try again" }),
            ),
            RelayError::Upstream { details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to send message", "details": details }),
            ),
            RelayError::InvalidForm(reason) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid form", "details": reason }),
            ),
            RelayError::PayloadTooLarge(reason) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({ "error": "Payload too large", "details": reason }),
            ),
            RelayError::Storage(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to send message", "details": e.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
