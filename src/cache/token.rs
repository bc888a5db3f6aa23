use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::infrastructure::feishu::{AppCredentials, ChatApi};

/// 提前 30 秒视为过期，避免与真实过期时间赛跑
pub const EXPIRY_SAFETY_MARGIN_MS: i64 = 30_000;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 租户访问令牌，整体替换，不做部分更新
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// tenant_access_token 缓存
///
/// 只在请求到来且令牌缺失或过期时才刷新，没有后台定时器。
/// 刷新由 `refresh_gate` 串行化：同一时刻最多一个刷新请求在途，
/// 其余等待者拿到锁后重新检查，直接复用刚写入的令牌。
pub struct TokenCache {
    api: Arc<dyn ChatApi>,
    credentials: AppCredentials,
    clock: Arc<dyn Clock>,
    token: RwLock<Option<AccessToken>>,
    refresh_gate: Mutex<()>,
}

impl TokenCache {
    pub fn new(api: Arc<dyn ChatApi>, credentials: AppCredentials) -> Self {
        Self::with_clock(api, credentials, Arc::new(SystemClock))
    }

    pub fn with_clock(
        api: Arc<dyn ChatApi>,
        credentials: AppCredentials,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            api,
            credentials,
            clock,
            token: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    async fn is_valid(&self) -> bool {
        let now = self.clock.now();
        self.token
            .read()
            .await
            .as_ref()
            .is_some_and(|token| token.is_usable_at(now))
    }

    /// 令牌缺失或过期时刷新，否则什么也不做
    pub async fn ensure_valid(&self) {
        if self.is_valid().await {
            return;
        }

        let _gate = self.refresh_gate.lock().await;
        // 排队期间可能已被其他请求刷新
        if self.is_valid().await {
            return;
        }
        self.refresh_locked().await;
    }

    /// 强制刷新。失败时保留旧令牌，只记录日志
    pub async fn refresh(&self) -> bool {
        let _gate = self.refresh_gate.lock().await;
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> bool {
        let fetched = match self.api.tenant_access_token(&self.credentials).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::error!(
                    "Error obtaining tenant access token: {} (details: {})",
                    e,
                    e.details()
                );
                return false;
            }
        };

        let lifetime = TimeDelta::try_seconds(fetched.expire_secs)
            .map(|ttl| ttl - TimeDelta::milliseconds(EXPIRY_SAFETY_MARGIN_MS));
        let Some(expires_at) = lifetime.and_then(|ttl| self.clock.now().checked_add_signed(ttl))
        else {
            tracing::error!(
                "Tenant access token carried an unusable expire value: {}",
                fetched.expire_secs
            );
            return false;
        };

        *self.token.write().await = Some(AccessToken {
            value: fetched.value,
            expires_at,
        });
        tracing::info!("Token renewed successfully. Expires at: {}", expires_at);
        true
    }

    /// 当前缓存的令牌值，可能已过期，也可能为空
    pub async fn current(&self) -> Option<String> {
        self.token.read().await.as_ref().map(|t| t.value.clone())
    }

    pub async fn snapshot(&self) -> Option<AccessToken> {
        self.token.read().await.clone()
    }
}
