use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use reqwest::Client;
use tokio::sync::Mutex;

use super::model::{RefreshRequest, RefreshResponse};
use crate::session::SessionStore;
use crate::utils::{join_url, mask_token};

pub const REFRESH_PATH: &str = "/auth/refresh";

type InFlight = Shared<BoxFuture<'static, bool>>;

/// 用刷新令牌换取新的访问令牌
///
/// 并发的调用共享同一次刷新请求，刷新结束后槽位清空，下一次 401 会重新发起。
#[derive(Clone)]
pub struct TokenRefresher {
    call: RefreshCall,
    in_flight: Arc<Mutex<Option<InFlight>>>,
}

#[derive(Clone)]
struct RefreshCall {
    http: Client,
    refresh_url: String,
    sessions: SessionStore,
}

impl TokenRefresher {
    pub fn new(http: Client, api_base_url: &str, sessions: SessionStore) -> Self {
        Self {
            call: RefreshCall {
                http,
                refresh_url: join_url(api_base_url, REFRESH_PATH),
                sessions,
            },
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// 刷新成功并写入新令牌时返回 true，任何失败都返回 false，从不报错
    pub async fn refresh(&self) -> bool {
        let flight = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some(flight) => {
                    tracing::debug!("Joining in-flight token refresh");
                    flight.clone()
                }
                None => {
                    let flight = self.call.clone().run().boxed().shared();
                    *slot = Some(flight.clone());
                    flight
                }
            }
        };

        let refreshed = flight.clone().await;

        let mut slot = self.in_flight.lock().await;
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&flight)) {
            *slot = None;
        }

        refreshed
    }
}

impl RefreshCall {
    async fn run(self) -> bool {
        let refresh_token = match self.sessions.refresh_token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::debug!("No refresh token stored, skipping refresh");
                return false;
            }
            Err(e) => {
                tracing::warn!("Failed to read refresh token: {}", e);
                return false;
            }
        };

        tracing::debug!("Refreshing access token with {}", mask_token(&refresh_token));

        let response = match self
            .http
            .post(&self.refresh_url)
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Token refresh request failed: {}", e);
                return false;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Token refresh rejected with status {}", response.status());
            return false;
        }

        let tokens = match response.json::<RefreshResponse>().await {
            Ok(body) => body.into_tokens(),
            Err(e) => {
                tracing::warn!("Token refresh response is not valid JSON: {}", e);
                return false;
            }
        };

        let Some((access_token, rotated)) = tokens else {
            tracing::warn!("Token refresh response carried no access token");
            return false;
        };

        if let Err(e) = self
            .sessions
            .update_tokens(&access_token, rotated.as_deref())
            .await
        {
            tracing::warn!("Failed to store refreshed tokens: {}", e);
            return false;
        }

        tracing::info!(
            rotated = rotated.is_some(),
            "Access token refreshed"
        );
        true
    }
}
