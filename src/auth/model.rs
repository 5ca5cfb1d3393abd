use serde::{Deserialize, Serialize};

use crate::session::UserProfile;

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// 登录响应
///
/// 不同版本的接口把访问令牌放在 `accessToken` 或 `token`，用户资料放在 `user` 或 `usuario`。
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub usuario: Option<UserProfile>,
}

impl LoginResponse {
    pub fn access_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .or(self.token.as_deref())
            .filter(|token| !token.is_empty())
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.user.as_ref().or(self.usuario.as_ref())
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    #[serde(rename = "refreshToken")]
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
}

impl RefreshResponse {
    /// 新的访问令牌和（轮换时才有的）新刷新令牌
    pub fn into_tokens(self) -> Option<(String, Option<String>)> {
        let access_token = self
            .access_token
            .or(self.token)
            .filter(|token| !token.is_empty())?;
        let refresh_token = self.refresh_token.filter(|token| !token.is_empty());
        Some((access_token, refresh_token))
    }
}

/// 接口返回的错误体，字段名不统一
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub mensaje: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn describe(raw: &str) -> String {
        serde_json::from_str::<ErrorBody>(raw)
            .ok()
            .and_then(|body| body.message.or(body.mensaje).or(body.error))
            .unwrap_or_else(|| raw.trim().to_string())
    }
}
