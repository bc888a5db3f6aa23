use std::env;
use std::path::PathBuf;

// 开发环境占位凭据，生产环境必须通过环境变量覆盖
const DEV_APP_ID: &str = "cli_dev_app_id";
const DEV_APP_SECRET: &str = "dev_app_secret";
const DEV_OPEN_CHAT_ID: &str = "oc_dev_chat_id";

const DEFAULT_FEISHU_BASE_URL: &str = "https://open.feishu.cn/open-apis";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub app_id: String,
    pub app_secret: String,
    pub open_chat_id: String,
    pub server_host: String,
    pub server_port: u16,
    pub feishu_base_url: String,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源构建配置，空字符串视为未设置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let app_id = get("APP_ID").unwrap_or_else(|| {
            tracing::warn!("APP_ID not set, using development placeholder");
            DEV_APP_ID.to_string()
        });
        let app_secret = get("APP_SECRET").unwrap_or_else(|| {
            tracing::warn!("APP_SECRET not set, using development placeholder");
            DEV_APP_SECRET.to_string()
        });
        let open_chat_id = get("OPEN_CHAT_ID").unwrap_or_else(|| {
            tracing::warn!("OPEN_CHAT_ID not set, using development placeholder");
            DEV_OPEN_CHAT_ID.to_string()
        });

        let server_port: u16 = match get("PORT").or_else(|| get("SERVER_PORT")) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw,
            })?,
            None => 5000,
        };

        let max_upload_bytes: usize = match get("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "MAX_UPLOAD_BYTES",
                value: raw,
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Config {
            app_id,
            app_secret,
            open_chat_id,
            server_host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port,
            feishu_base_url: get("FEISHU_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_FEISHU_BASE_URL.into()),
            upload_dir: get("UPLOAD_DIR").unwrap_or_else(|| "uploads".into()).into(),
            static_dir: get("STATIC_DIR").unwrap_or_else(|| "public".into()).into(),
            max_upload_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.app_id, DEV_APP_ID);
        assert_eq!(config.server_port, 5000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.feishu_base_url, DEFAULT_FEISHU_BASE_URL);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("APP_ID", "cli_real"),
            ("APP_SECRET", "s3cret"),
            ("OPEN_CHAT_ID", "oc_real"),
            ("PORT", "8080"),
            ("FEISHU_BASE_URL", "http://127.0.0.1:9000/open-apis/"),
        ]))
        .unwrap();
        assert_eq!(config.app_id, "cli_real");
        assert_eq!(config.app_secret, "s3cret");
        assert_eq!(config.open_chat_id, "oc_real");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.feishu_base_url, "http://127.0.0.1:9000/open-apis");
    }

    #[test]
    fn port_falls_back_to_server_port() {
        let config = Config::from_lookup(lookup(&[("SERVER_PORT", "3001")])).unwrap();
        assert_eq!(config.server_port, 3001);
    }

    #[test]
    fn unparsable_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }
}
