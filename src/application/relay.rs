use std::sync::Arc;

use serde_json::Value;

use crate::cache::TokenCache;
use crate::error::RelayError;
use crate::infrastructure::feishu::{ChatApi, ImageUpload, OutboundMessage};
use crate::models::{StoredImage, SubmittedForm};

/// 把一次表单提交转发到固定的飞书群
pub struct MessageRelay {
    api: Arc<dyn ChatApi>,
    tokens: Arc<TokenCache>,
    open_chat_id: String,
}

impl MessageRelay {
    pub fn new(api: Arc<dyn ChatApi>, tokens: Arc<TokenCache>, open_chat_id: String) -> Self {
        Self {
            api,
            tokens,
            open_chat_id,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// 转发并返回平台响应。
    ///
    /// 上游 401 时强制刷新一次令牌并返回 `TokenExpired`，由客户端重新提交；
    /// 不做其他自动重试。
    pub async fn relay(&self, form: SubmittedForm) -> Result<Value, RelayError> {
        match self.deliver(&form).await {
            Ok(data) => Ok(data),
            Err(RelayError::TokenExpired) => {
                tracing::warn!("Feishu returned 401, renewing tenant access token");
                self.tokens.refresh().await;
                Err(RelayError::TokenExpired)
            }
            Err(e) => {
                tracing::error!("Failed to relay message: {}", e);
                Err(e)
            }
        }
    }

    async fn deliver(&self, form: &SubmittedForm) -> Result<Value, RelayError> {
        self.tokens.ensure_valid().await;
        let token = self.tokens.current().await.unwrap_or_default();
        let text = form.compose_text();

        let primary = match &form.image {
            Some(image) => {
                let image_key = self.upload(&token, image).await?;
                tracing::debug!("Image uploaded, key: {}", image_key);

                // 文字单独一条，先于图片发送
                self.api
                    .send_message(&token, &OutboundMessage::text(&self.open_chat_id, text))
                    .await?;

                if let Err(e) = tokio::fs::remove_file(&image.path).await {
                    tracing::warn!(
                        "Failed to remove uploaded file {}: {}",
                        image.path.display(),
                        e
                    );
                }

                OutboundMessage::image(&self.open_chat_id, image_key)
            }
            None => OutboundMessage::text(&self.open_chat_id, text),
        };

        let data = self.api.send_message(&token, &primary).await?;
        tracing::info!("Message relayed to chat {}", self.open_chat_id);
        Ok(data)
    }

    async fn upload(&self, token: &str, image: &StoredImage) -> Result<String, RelayError> {
        let bytes = tokio::fs::read(&image.path).await?;
        let upload = ImageUpload {
            bytes,
            file_name: image.file_name().to_string(),
            content_type: image.content_type().to_string(),
        };
        Ok(self.api.upload_image(token, upload).await?)
    }
}
