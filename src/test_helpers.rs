//! 单元测试共用的假实现

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Value, json};

use crate::cache::Clock;
use crate::infrastructure::feishu::{
    AppCredentials, ChatApi, FeishuError, ImageUpload, OutboundMessage, TenantToken,
};

pub fn credentials() -> AppCredentials {
    AppCredentials {
        app_id: "cli_test".into(),
        app_secret: "secret".into(),
    }
}

pub struct FakeClock {
    now: Mutex<DateTime<Utc>>,
}

impl FakeClock {
    pub fn at_epoch_secs(secs: i64) -> Self {
        Self {
            now: Mutex::new(DateTime::from_timestamp(secs, 0).unwrap()),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap() = instant;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Token,
    Upload {
        token: String,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
    Send {
        token: String,
        message: OutboundMessage,
    },
}

/// 记录调用顺序的 `ChatApi` 假实现
///
/// 未预置结果时：令牌接口返回 `t-<序号>`，上传返回 `img_key`，发送返回 `{"code":0}`。
#[derive(Default)]
pub struct RecordingApi {
    calls: Mutex<Vec<Call>>,
    token_results: Mutex<VecDeque<Result<TenantToken, FeishuError>>>,
    upload_results: Mutex<VecDeque<Result<String, FeishuError>>>,
    send_results: Mutex<VecDeque<Result<Value, FeishuError>>>,
    token_delay: Option<Duration>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token_delay(mut self, delay: Duration) -> Self {
        self.token_delay = Some(delay);
        self
    }

    pub fn push_token(&self, result: Result<TenantToken, FeishuError>) {
        self.token_results.lock().unwrap().push_back(result);
    }

    pub fn push_upload(&self, result: Result<String, FeishuError>) {
        self.upload_results.lock().unwrap().push_back(result);
    }

    pub fn push_send(&self, result: Result<Value, FeishuError>) {
        self.send_results.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn token_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Token))
            .count()
    }

    pub fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatApi for RecordingApi {
    async fn tenant_access_token(
        &self,
        _credentials: &AppCredentials,
    ) -> Result<TenantToken, FeishuError> {
        let seq = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call::Token);
            calls.iter().filter(|c| matches!(c, Call::Token)).count()
        };
        if let Some(delay) = self.token_delay {
            tokio::time::sleep(delay).await;
        }
        let queued = self.token_results.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| {
            Ok(TenantToken {
                value: format!("t-{seq}"),
                expire_secs: 7200,
            })
        })
    }

    async fn upload_image(&self, token: &str, image: ImageUpload) -> Result<String, FeishuError> {
        self.calls.lock().unwrap().push(Call::Upload {
            token: token.to_string(),
            file_name: image.file_name,
            content_type: image.content_type,
            bytes: image.bytes,
        });
        let queued = self.upload_results.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok("img_key".to_string()))
    }

    async fn send_message(
        &self,
        token: &str,
        message: &OutboundMessage,
    ) -> Result<Value, FeishuError> {
        self.calls.lock().unwrap().push(Call::Send {
            token: token.to_string(),
            message: message.clone(),
        });
        let queued = self.send_results.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(json!({ "code": 0, "msg": "ok" })))
    }
}
