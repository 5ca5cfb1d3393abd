use std::sync::Arc;

use config::{Config, SessionBackend};
use error::{ClientError, Result};
use fetch::{AuthFetch, LogRedirect, LoginRedirect};
use object_storage::ObjectStorage;
use resources::{Banner, Category, City, Coupon, ResourceOperations, Venue};
use session::{FileStorage, LocalStorage, MemoryStorage, RedisStorage, SessionStore};

pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod object_storage;
pub mod pagination;
pub mod resources;
pub mod session;
pub mod utils;

use auth::{AuthClient, TokenRefresher};

/// 客户端共享状态，各组件共用同一个 HTTP 连接池和会话
#[derive(Clone)]
pub struct MdtnClient {
    pub config: Config,
    pub sessions: SessionStore,
    pub auth: AuthClient,
    pub refresher: TokenRefresher,
    pub fetch: AuthFetch,
    pub storage: Option<ObjectStorage>,
}

impl MdtnClient {
    /// 按配置选择会话后端
    pub fn from_config(config: Config) -> Result<Self> {
        let storage: Arc<dyn LocalStorage> = match config.session_backend {
            SessionBackend::Memory => Arc::new(MemoryStorage::new()),
            SessionBackend::File => Arc::new(FileStorage::new(config.session_file.clone())),
            SessionBackend::Redis => {
                let url = config.redis_url.as_deref().ok_or_else(|| {
                    ClientError::Config("SESSION_BACKEND=redis requires REDIS_URL".into())
                })?;
                Arc::new(RedisStorage::open(url, config.session_namespace.clone())?)
            }
        };
        Self::with_parts(config, storage, Arc::new(LogRedirect))
    }

    /// 注入会话存储和登录跳转，测试和嵌入方使用
    pub fn with_parts(
        config: Config,
        storage: Arc<dyn LocalStorage>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let sessions = SessionStore::new(storage);
        let refresher = TokenRefresher::new(http.clone(), &config.api_base_url, sessions.clone());
        let auth = AuthClient::new(
            http.clone(),
            &config.api_base_url,
            sessions.clone(),
            refresher.clone(),
        );
        let fetch = AuthFetch::new(
            http.clone(),
            config.api_base_url.clone(),
            sessions.clone(),
            refresher.clone(),
            redirect,
            config.login_path.clone(),
        );
        let storage = config.storage_base_url.as_ref().map(|base_url| {
            ObjectStorage::new(
                http.clone(),
                base_url.clone(),
                config.storage_bucket.clone(),
                config.storage_api_key.clone(),
            )
        });

        tracing::debug!(
            api = %config.api_base_url,
            backend = ?config.session_backend,
            "Client initialised"
        );

        Ok(Self {
            config,
            sessions,
            auth,
            refresher,
            fetch,
            storage,
        })
    }

    pub fn venues(&self) -> ResourceOperations<Venue> {
        self.resource()
    }

    pub fn coupons(&self) -> ResourceOperations<Coupon> {
        self.resource()
    }

    pub fn banners(&self) -> ResourceOperations<Banner> {
        self.resource()
    }

    pub fn cities(&self) -> ResourceOperations<City> {
        self.resource()
    }

    pub fn categories(&self) -> ResourceOperations<Category> {
        self.resource()
    }

    fn resource<R: resources::Resource>(&self) -> ResourceOperations<R> {
        ResourceOperations::new(self.fetch.clone(), self.config.page_size)
    }
}
