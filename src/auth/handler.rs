use chrono::{Duration, Utc};
use reqwest::Client;

use super::claims;
use super::model::{Credentials, ErrorBody, LoginResponse};
use super::refresh::TokenRefresher;
use crate::error::{ClientError, Result};
use crate::session::{Session, SessionStore};
use crate::utils::join_url;

pub const LOGIN_PATH: &str = "/auth/login";

/// 距离过期不足这个时间的令牌在启动时就刷新
const EXPIRY_LEEWAY_SECS: i64 = 30;

#[derive(Clone)]
pub struct AuthClient {
    http: Client,
    login_url: String,
    sessions: SessionStore,
    refresher: TokenRefresher,
}

impl AuthClient {
    pub fn new(
        http: Client,
        api_base_url: &str,
        sessions: SessionStore,
        refresher: TokenRefresher,
    ) -> Self {
        Self {
            http,
            login_url: join_url(api_base_url, LOGIN_PATH),
            sessions,
            refresher,
        }
    }

    /// 登录并保存会话，不检查角色（公共网页和移动端使用）
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let session = self.authenticate(credentials).await?;
        self.sessions.set(&session).await?;
        tracing::info!(
            user = session.user.as_ref().map(|u| u.id.as_str()).unwrap_or("-"),
            "Logged in"
        );
        Ok(session)
    }

    /// 管理后台登录：HTTP 调用成功后还要求 admin 或 superadmin 角色，否则不保存任何东西
    pub async fn login_admin(&self, credentials: &Credentials) -> Result<Session> {
        let session = self.authenticate(credentials).await?;

        match session.role() {
            Some(role) if role.is_admin() => {}
            Some(role) => {
                tracing::warn!("Rejected dashboard login for role {}", role);
                return Err(ClientError::RoleNotAllowed(role));
            }
            None => {
                return Err(ClientError::MalformedResponse(
                    "login response has no user profile".into(),
                ));
            }
        }

        self.sessions.set(&session).await?;
        tracing::info!("Admin session started");
        Ok(session)
    }

    pub async fn logout(&self) -> Result<()> {
        self.sessions.clear().await?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// 启动时检查已保存的会话
    ///
    /// 访问令牌已过期时先刷新一次；刷新失败则清除会话并返回 None。
    pub async fn restore(&self) -> Result<Option<Session>> {
        let Some(session) = self.sessions.get().await? else {
            return Ok(None);
        };

        if !claims::is_expired(
            &session.access_token,
            Utc::now(),
            Duration::seconds(EXPIRY_LEEWAY_SECS),
        ) {
            return Ok(Some(session));
        }

        tracing::info!("Stored access token has expired, refreshing");
        if self.refresher.refresh().await {
            return self.sessions.get().await;
        }

        tracing::warn!("Stored session could not be refreshed, clearing it");
        self.sessions.clear().await?;
        Ok(None)
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<Session> {
        let response = self
            .http
            .post(&self.login_url)
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(ClientError::LoginRejected {
                status: status.as_u16(),
                message: ErrorBody::describe(&raw),
            });
        }

        let body: LoginResponse = response.json().await?;
        let access_token = body
            .access_token()
            .ok_or_else(|| ClientError::MalformedResponse("login response has no token".into()))?
            .to_string();

        Ok(Session {
            access_token,
            refresh_token: body.refresh_token.clone().filter(|t| !t.is_empty()),
            user: body.profile().cloned(),
        })
    }
}
