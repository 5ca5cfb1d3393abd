use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// 会话持久化后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    Memory,
    File,
    Redis,
}

impl SessionBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "file" => Some(Self::File),
            "redis" => Some(Self::Redis),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub storage_base_url: Option<String>,
    pub storage_bucket: String,
    pub storage_api_key: Option<String>,
    pub page_size: u32,
    pub request_timeout_secs: u64,
    pub session_backend: SessionBackend,
    pub session_file: PathBuf,
    pub redis_url: Option<String>,
    pub session_namespace: String,
    pub login_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let session_backend = match env::var("SESSION_BACKEND") {
            Ok(value) => SessionBackend::parse(&value).unwrap_or_else(|| {
                tracing::warn!("Unknown SESSION_BACKEND {:?}, falling back to file", value);
                SessionBackend::File
            }),
            Err(_) => SessionBackend::File,
        };

        Ok(Config {
            api_base_url: env::var("API_BASE_URL")?,
            storage_base_url: env::var("STORAGE_BASE_URL").ok(),
            storage_bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "imagenes".into()),
            storage_api_key: env::var("STORAGE_API_KEY").ok(),
            page_size: env::var("PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            request_timeout_secs: env::var("REQUEST_TIMEOUT")
                .ok()
                .map(|v| v.trim_end_matches('s').to_string())
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            session_backend,
            session_file: env::var("SESSION_FILE")
                .unwrap_or_else(|_| ".mdtn-session.json".into())
                .into(),
            redis_url: env::var("REDIS_URL").ok(),
            session_namespace: env::var("SESSION_NAMESPACE").unwrap_or_else(|_| "mdtn".into()),
            login_path: env::var("LOGIN_PATH").unwrap_or_else(|_| "/login".into()),
        })
    }

    /// 以给定 API 地址构造一份全部默认值的配置，会话只保存在内存中
    pub fn for_api(api_base_url: impl Into<String>) -> Self {
        Config {
            api_base_url: api_base_url.into(),
            storage_base_url: None,
            storage_bucket: "imagenes".into(),
            storage_api_key: None,
            page_size: 100,
            request_timeout_secs: 30,
            session_backend: SessionBackend::Memory,
            session_file: ".mdtn-session.json".into(),
            redis_url: None,
            session_namespace: "mdtn".into(),
            login_path: "/login".into(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
