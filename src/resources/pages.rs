use std::marker::PhantomData;

use async_trait::async_trait;

use super::Resource;
use crate::error::Result;
use crate::fetch::{ApiRequest, AuthFetch, ensure_success};
use crate::pagination::{Page, PageSource, parse_page};

/// 查询参数名沿用接口的西语命名
pub const PAGE_PARAM: &str = "pagina";
pub const LIMIT_PARAM: &str = "limite";

/// 资源列表接口作为分页来源
pub struct ResourcePages<R> {
    fetch: AuthFetch,
    filters: Vec<(String, String)>,
    authenticated: bool,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> ResourcePages<R> {
    pub fn authenticated(fetch: AuthFetch, filters: &[(&str, &str)]) -> Self {
        Self::new(fetch, filters, true)
    }

    pub fn public(fetch: AuthFetch, filters: &[(&str, &str)]) -> Self {
        Self::new(fetch, filters, false)
    }

    fn new(fetch: AuthFetch, filters: &[(&str, &str)], authenticated: bool) -> Self {
        Self {
            fetch,
            filters: filters
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            authenticated,
            _resource: PhantomData,
        }
    }
}

#[async_trait]
impl<R: Resource> PageSource<R> for ResourcePages<R> {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<R>> {
        request_page(&self.fetch, self.authenticated, page, limit, &self.filters).await
    }
}

/// `GET /<resource>?pagina=N&limite=M&<filters>`
pub(crate) async fn request_page<R: Resource>(
    fetch: &AuthFetch,
    authenticated: bool,
    page: u32,
    limit: u32,
    filters: &[(String, String)],
) -> Result<Page<R>> {
    let mut request = ApiRequest::get(format!("/{}", R::PATH))
        .query(PAGE_PARAM, page)
        .query(LIMIT_PARAM, limit);
    for (key, value) in filters {
        request = request.query(key.as_str(), value);
    }

    let response = if authenticated {
        fetch.send(request).await?
    } else {
        fetch.send_public(request).await?
    };

    let body = ensure_success(response).await?.json().await?;
    parse_page(body, R::PATH)
}
