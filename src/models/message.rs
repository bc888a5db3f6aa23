use std::path::PathBuf;

const ANONYMOUS: &str = "Anonymous";
const DEFAULT_IMAGE_NAME: &str = "image.png";
const DEFAULT_IMAGE_TYPE: &str = "image/png";

/// 上传层落盘的临时图片，成功转发后由转发逻辑删除
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub path: PathBuf,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl StoredImage {
    pub fn file_name(&self) -> &str {
        self.file_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_IMAGE_NAME)
    }

    pub fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_IMAGE_TYPE)
    }
}

/// 一次表单提交，只在单个请求内存活
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmittedForm {
    pub alias: Option<String>,
    pub message: String,
    pub reply_to: Option<String>,
    pub link: Option<String>,
    pub video_id: Option<String>,
    pub queue: Option<String>,
    pub image: Option<StoredImage>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn present_trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl SubmittedForm {
    /// 拼接群消息正文：首行为 `别名[ → @回复对象]: 内容`，
    /// 随后依次追加 Link、Video ID、Queue 行，缺省字段不产生行
    pub fn compose_text(&self) -> String {
        let mut text = present(&self.alias).unwrap_or(ANONYMOUS).to_string();

        if let Some(reply_to) = present_trimmed(&self.reply_to) {
            text.push_str(" → @");
            text.push_str(reply_to);
        }
        text.push_str(": ");
        text.push_str(&self.message);

        if let Some(link) = present(&self.link) {
            text.push_str("\nLink: ");
            text.push_str(link);
        }
        if let Some(video_id) = present(&self.video_id) {
            text.push_str("\nVideo ID: ");
            text.push_str(video_id);
        }
        if let Some(queue) = present_trimmed(&self.queue) {
            text.push_str("\nQueue: ");
            text.push_str(queue);
        }

        text
    }
}
