use std::path::Path;

use axum::{
    Json,
    extract::{Form, FromRequest, Multipart, Request},
    http::{StatusCode, header},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::AppState;
use crate::error::RelayError;
use crate::models::{StoredImage, SubmittedForm};

const IMAGE_FIELD: &str = "image";

/// 表单中的文本字段，multipart、urlencoded 与 JSON 共用
#[derive(Debug, Default, Deserialize)]
pub struct FormFields {
    pub alias: Option<String>,
    pub message: Option<String>,
    pub reply_to: Option<String>,
    pub link: Option<String>,
    pub video_id: Option<String>,
    pub queue: Option<String>,
}

impl FormFields {
    fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "alias" => &mut self.alias,
            "message" => &mut self.message,
            "reply_to" => &mut self.reply_to,
            "link" => &mut self.link,
            "video_id" => &mut self.video_id,
            "queue" => &mut self.queue,
            _ => {
                tracing::debug!("Ignoring unknown form field: {}", name);
                return;
            }
        };
        *slot = Some(value);
    }

    pub fn into_submitted(self, image: Option<StoredImage>) -> Result<SubmittedForm, RelayError> {
        let message = self
            .message
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| RelayError::InvalidForm("message is required".into()))?;

        Ok(SubmittedForm {
            alias: self.alias,
            message,
            reply_to: self.reply_to,
            link: self.link,
            video_id: self.video_id,
            queue: self.queue,
            image,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub message: &'static str,
    pub data: Value,
}

/// 按上游拒绝原因的状态码区分：超过大小限制为 413，其余为 400
fn rejected(status: StatusCode, reason: String) -> RelayError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::PayloadTooLarge(reason)
    } else {
        RelayError::InvalidForm(reason)
    }
}

/// `/sendMessage` 的请求体：multipart 时图片先落盘到上传目录
pub struct MessageForm(pub SubmittedForm);

impl FromRequest<AppState> for MessageForm {
    type Rejection = RelayError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;
            read_multipart(multipart, &state.config.upload_dir)
                .await
                .map(MessageForm)
        } else if content_type.starts_with("application/json") {
            let Json(fields) = Json::<FormFields>::from_request(req, state)
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;
            fields.into_submitted(None).map(MessageForm)
        } else {
            let Form(fields) = Form::<FormFields>::from_request(req, state)
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;
            fields.into_submitted(None).map(MessageForm)
        }
    }
}

async fn read_multipart(
    mut multipart: Multipart,
    upload_dir: &Path,
) -> Result<SubmittedForm, RelayError> {
    let mut fields = FormFields::default();
    let mut image: Option<StoredImage> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejected(e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name != IMAGE_FIELD {
            let value = field
                .text()
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;
            fields.set(&name, value);
            continue;
        }

        // 只有带 filename 的文件段才算图片，同名文本段忽略
        if field.file_name().is_none() {
            tracing::debug!("Ignoring image part without filename");
            continue;
        }

        if image.is_some() {
            tracing::debug!("Ignoring extra image part");
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;

        // 浏览器未选文件时也会提交一个空的文件段
        if bytes.is_empty() && file_name.as_deref().is_none_or(str::is_empty) {
            continue;
        }

        image = Some(store_image(upload_dir, &bytes, file_name, content_type).await?);
    }

    match fields.into_submitted(image.clone()) {
        Ok(form) => Ok(form),
        Err(e) => {
            if let Some(stored) = image {
                if let Err(io) = tokio::fs::remove_file(&stored.path).await {
                    tracing::warn!(
                        "Failed to remove uploaded file {}: {}",
                        stored.path.display(),
                        io
                    );
                }
            }
            Err(e)
        }
    }
}

async fn store_image(
    upload_dir: &Path,
    bytes: &[u8],
    file_name: Option<String>,
    content_type: Option<String>,
) -> Result<StoredImage, RelayError> {
    tokio::fs::create_dir_all(upload_dir).await?;
    let path = upload_dir.join(Uuid::new_v4().simple().to_string());
    tokio::fs::write(&path, bytes).await?;
    tracing::debug!("Stored uploaded image at {} ({} bytes)", path.display(), bytes.len());

    Ok(StoredImage {
        path,
        file_name,
        content_type,
    })
}
