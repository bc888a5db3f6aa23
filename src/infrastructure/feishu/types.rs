use serde::{Deserialize, Serialize};

/// 应用凭据，用于换取 tenant_access_token
#[derive(Debug, Clone, Serialize)]
pub struct AppCredentials {
    pub app_id: String,
    pub app_secret: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TenantTokenResponse {
    #[serde(default)]
    pub code: i64,
    pub msg: Option<String>,
    pub tenant_access_token: Option<String>,
    pub expire: Option<i64>,
}

/// 鉴权接口返回的令牌及其有效期（秒）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantToken {
    pub value: String,
    pub expire_secs: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageUploadResponse {
    pub data: Option<ImageUploadData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageUploadData {
    pub image_key: Option<String>,
}

/// 待上传的图片
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text { text: String },
    Image { image_key: String },
}

/// message/v3/send 的请求体，content 为 JSON 对象
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub open_chat_id: String,
    pub msg_type: MessageKind,
    pub content: MessageContent,
}

impl OutboundMessage {
    pub fn text(open_chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            open_chat_id: open_chat_id.into(),
            msg_type: MessageKind::Text,
            content: MessageContent::Text { text: text.into() },
        }
    }

    pub fn image(open_chat_id: impl Into<String>, image_key: impl Into<String>) -> Self {
        Self {
            open_chat_id: open_chat_id.into(),
            msg_type: MessageKind::Image,
            content: MessageContent::Image {
                image_key: image_key.into(),
            },
        }
    }
}
