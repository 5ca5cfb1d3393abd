use std::fmt;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::utils::{bearer, join_url};

/// 每次调用都生成一个新的表单，重试时不复用已经发送过的流
pub type FormFactory = Arc<dyn Fn() -> Form + Send + Sync>;

/// 请求体，所有变体都可以为重试重新构造
#[derive(Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Binary {
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
    Multipart(FormFactory),
}

impl RequestBody {
    /// 二进制和 multipart 请求体由传输层决定 Content-Type
    pub fn is_binary(&self) -> bool {
        matches!(self, RequestBody::Binary { .. } | RequestBody::Multipart(_))
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Json(value) => f.debug_tuple("Json").field(value).finish(),
            RequestBody::Binary {
                bytes,
                content_type,
            } => f
                .debug_struct("Binary")
                .field("len", &bytes.len())
                .field("content_type", content_type)
                .finish(),
            RequestBody::Multipart(_) => f.write_str("Multipart"),
        }
    }
}

/// 一次 API 调用的描述，不持久化
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: RequestBody,
    replay_on_refresh: Option<bool>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            replay_on_refresh: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn binary(mut self, bytes: Vec<u8>, content_type: Option<String>) -> Self {
        self.body = RequestBody::Binary {
            bytes,
            content_type,
        };
        self
    }

    pub fn multipart<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Form + Send + Sync + 'static,
    {
        self.body = RequestBody::Multipart(Arc::new(factory));
        self
    }

    /// 显式声明 401 刷新后是否允许重放此请求
    pub fn replay_on_refresh(mut self, replay: bool) -> Self {
        self.replay_on_refresh = Some(replay);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// 幂等方法默认重放；POST 和 PATCH 需要调用方显式同意
    pub fn replays_after_refresh(&self) -> bool {
        self.replay_on_refresh
            .unwrap_or_else(|| is_idempotent(&self.method))
    }

    /// 构造一次实际发送的请求，`token` 为 None 时不带认证头
    pub(crate) fn build(&self, http: &Client, base_url: &str, token: Option<&str>) -> RequestBuilder {
        let url = join_url(base_url, &self.path);
        let mut builder = http.request(self.method.clone(), url);

        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, bearer(token));
        }
        if !self.body.is_binary() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }

        match &self.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Binary {
                bytes,
                content_type,
            } => {
                if let Some(content_type) = content_type {
                    builder = builder.header(CONTENT_TYPE, content_type.as_str());
                }
                builder.body(bytes.clone())
            }
            RequestBody::Multipart(factory) => builder.multipart(factory()),
        }
    }
}

pub fn is_idempotent(method: &Method) -> bool {
    [
        Method::GET,
        Method::HEAD,
        Method::OPTIONS,
        Method::PUT,
        Method::DELETE,
    ]
    .contains(method)
}
