// 带认证的请求封装
// 注入 Bearer 令牌，401 时刷新一次并重试

pub mod redirect;
pub mod request;

use std::sync::Arc;

use reqwest::{Client, Response, StatusCode};

use crate::auth::TokenRefresher;
use crate::error::{ClientError, Result};
use crate::session::SessionStore;
use crate::utils::join_url;

pub use redirect::{LogRedirect, LoginRedirect};
pub use request::{ApiRequest, FormFactory, RequestBody};

#[derive(Clone)]
pub struct AuthFetch {
    http: Client,
    base_url: String,
    sessions: SessionStore,
    refresher: TokenRefresher,
    redirect: Arc<dyn LoginRedirect>,
    login_path: String,
}

impl AuthFetch {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        sessions: SessionStore,
        refresher: TokenRefresher,
        redirect: Arc<dyn LoginRedirect>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            sessions,
            refresher,
            redirect,
            login_path: login_path.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 发送带认证的请求
    ///
    /// 除 401 以外的状态码原样返回。401 时最多刷新并重试一次，第二次的响应无论是什么都直接返回。
    pub async fn send(&self, request: ApiRequest) -> Result<Response> {
        let url = join_url(&self.base_url, request.path());

        let Some(token) = self.sessions.access_token().await? else {
            tracing::warn!("No access token for {} {}", request.method(), url);
            self.redirect.redirect_to_login(&self.login_path);
            return Err(ClientError::NoSession);
        };

        tracing::debug!("{} {}", request.method(), url);
        let response = request
            .build(&self.http, &self.base_url, Some(&token))
            .send()
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::info!("{} {} answered 401, refreshing session", request.method(), url);

        let Some(fresh_token) = self.renew_token(&token).await? else {
            return Err(self.tear_down().await);
        };

        if !request.replays_after_refresh() {
            tracing::warn!(
                "Session refreshed but {} {} is not replayed automatically",
                request.method(),
                url
            );
            return Err(ClientError::ReplayRefused {
                method: request.method().to_string(),
                url,
            });
        }

        let retry = request
            .build(&self.http, &self.base_url, Some(&fresh_token))
            .send()
            .await?;

        if retry.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("{} {} still unauthorized after refresh", request.method(), url);
        }
        Ok(retry)
    }

    /// 不带认证头发送，用于公开的列表接口
    pub async fn send_public(&self, request: ApiRequest) -> Result<Response> {
        tracing::debug!(
            "{} {} (public)",
            request.method(),
            join_url(&self.base_url, request.path())
        );
        Ok(request.build(&self.http, &self.base_url, None).send().await?)
    }

    /// 取得可用于重试的新令牌
    ///
    /// 如果存储里的令牌已经不是第一次请求用的那个，说明别的调用刚刷新过，直接使用。
    async fn renew_token(&self, rejected: &str) -> Result<Option<String>> {
        match self.sessions.access_token().await? {
            Some(current) if current != rejected => {
                tracing::debug!("Access token already replaced by a concurrent refresh");
                return Ok(Some(current));
            }
            _ => {}
        }

        if !self.refresher.refresh().await {
            return Ok(None);
        }
        self.sessions.access_token().await
    }

    async fn tear_down(&self) -> ClientError {
        tracing::warn!("Session could not be refreshed, signing out");
        if let Err(e) = self.sessions.clear().await {
            tracing::error!("Failed to clear session: {}", e);
        }
        self.redirect.redirect_to_login(&self.login_path);
        ClientError::SessionExpired
    }
}

/// 非 2xx 响应转成错误，保留响应体便于排查
pub async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!("Request failed with {}: {}", status, body);
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}
