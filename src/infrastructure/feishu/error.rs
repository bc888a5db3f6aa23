use serde_json::Value;

/// 飞书开放平台调用错误
#[derive(Debug, thiserror::Error)]
pub enum FeishuError {
    #[error("feishu rejected the access token (401)")]
    Unauthorized { body: Value },

    #[error("feishu request failed with status {status}")]
    Status { status: u16, body: Value },

    #[error("feishu request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected feishu response: {reason}")]
    Malformed { reason: String, body: Value },
}

impl FeishuError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FeishuError::Unauthorized { .. })
    }

    /// 返回给调用方的诊断信息：优先使用上游响应体，否则使用错误描述
    pub fn details(&self) -> Value {
        match self {
            FeishuError::Unauthorized { body }
            | FeishuError::Status { body, .. }
            | FeishuError::Malformed { body, .. }
                if !body.is_null() =>
            {
                body.clone()
            }
            other => Value::String(other.to_string()),
        }
    }
}
