use thiserror::Error;

use crate::session::Role;

/// 客户端统一错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    /// 本地没有访问令牌，请求未发出
    #[error("no active session")]
    NoSession,

    /// 401 之后刷新失败，会话已被清除
    #[error("session expired and could not be refreshed")]
    SessionExpired,

    /// 令牌已刷新，但非幂等请求未被自动重放
    #[error("{method} {url} was not replayed after the session was refreshed")]
    ReplayRefused { method: String, url: String },

    #[error("login rejected ({status}): {message}")]
    LoginRejected { status: u16, message: String },

    #[error("role {0} is not allowed to use the admin dashboard")]
    RoleNotAllowed(Role),

    #[error("unexpected response status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
