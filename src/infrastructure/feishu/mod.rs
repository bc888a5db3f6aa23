//! 飞书开放平台客户端
//!
//! `ChatApi` 是对外部平台的抽象，业务层只依赖该 trait，测试中可替换为假实现。

mod error;
mod types;

pub use error::FeishuError;
pub use types::{
    AppCredentials, ImageUpload, MessageContent, MessageKind, OutboundMessage, TenantToken,
};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, multipart};
use serde_json::Value;

use types::{ImageUploadResponse, TenantTokenResponse};

const TENANT_TOKEN_PATH: &str = "/auth/v3/tenant_access_token/internal";
const IMAGE_UPLOAD_PATH: &str = "/im/v1/images";
const MESSAGE_SEND_PATH: &str = "/message/v3/send";

#[async_trait]
pub trait ChatApi: Send + Sync {
    /// 使用应用凭据换取 tenant_access_token
    async fn tenant_access_token(
        &self,
        credentials: &AppCredentials,
    ) -> Result<TenantToken, FeishuError>;

    /// 上传图片，返回 image_key
    async fn upload_image(&self, token: &str, image: ImageUpload) -> Result<String, FeishuError>;

    /// 发送消息，返回平台原始响应
    async fn send_message(
        &self,
        token: &str,
        message: &OutboundMessage,
    ) -> Result<Value, FeishuError>;
}

#[derive(Clone, Debug)]
pub struct FeishuClient {
    http: Client,
    base_url: String,
}

impl FeishuClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// 读取响应体；非 JSON 内容按字符串保留，便于回显诊断信息
async fn read_body(response: Response) -> Result<(StatusCode, Value), FeishuError> {
    let status = response.status();
    let text = response.text().await?;
    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => value,
            Err(_) => Value::String(text),
        }
    };
    Ok((status, body))
}

fn check_status(status: StatusCode, body: Value) -> Result<Value, FeishuError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(FeishuError::Unauthorized { body });
    }
    if !status.is_success() {
        return Err(FeishuError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

#[async_trait]
impl ChatApi for FeishuClient {
    async fn tenant_access_token(
        &self,
        credentials: &AppCredentials,
    ) -> Result<TenantToken, FeishuError> {
        let response = self
            .http
            .post(self.url(TENANT_TOKEN_PATH))
            .json(credentials)
            .send()
            .await?;
        let (status, body) = read_body(response).await?;
        let body = check_status(status, body)?;

        let parsed: TenantTokenResponse = match serde_json::from_value(body.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Err(FeishuError::Malformed {
                    reason: e.to_string(),
                    body,
                });
            }
        };

        if parsed.code != 0 {
            return Err(FeishuError::Malformed {
                reason: format!(
                    "code {}: {}",
                    parsed.code,
                    parsed.msg.as_deref().unwrap_or("unknown error")
                ),
                body,
            });
        }

        match (parsed.tenant_access_token, parsed.expire) {
            (Some(value), Some(expire_secs)) if !value.is_empty() => Ok(TenantToken {
                value,
                expire_secs,
            }),
            _ => Err(FeishuError::Malformed {
                reason: "missing tenant_access_token or expire".into(),
                body,
            }),
        }
    }

    async fn upload_image(&self, token: &str, image: ImageUpload) -> Result<String, FeishuError> {
        let part = multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;
        let form = multipart::Form::new()
            .text("image_type", "message")
            .part("image", part);

        let response = self
            .http
            .post(self.url(IMAGE_UPLOAD_PATH))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        let (status, body) = read_body(response).await?;
        let body = check_status(status, body)?;

        let image_key = serde_json::from_value::<ImageUploadResponse>(body.clone())
            .ok()
            .and_then(|parsed| parsed.data)
            .and_then(|data| data.image_key)
            .filter(|key| !key.is_empty());

        image_key.ok_or(FeishuError::Malformed {
            reason: "missing data.image_key".into(),
            body,
        })
    }

    async fn send_message(
        &self,
        token: &str,
        message: &OutboundMessage,
    ) -> Result<Value, FeishuError> {
        let response = self
            .http
            .post(self.url(MESSAGE_SEND_PATH))
            .bearer_auth(token)
            .json(message)
            .send()
            .await?;
        let (status, body) = read_body(response).await?;
        check_status(status, body)
    }
}
