// 后台管理的资源：场所、优惠券、横幅、城市、分类

pub mod banner;
pub mod category;
pub mod city;
pub mod coupon;
pub mod pages;
pub mod venue;

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::fetch::{ApiRequest, AuthFetch, ensure_success};
use crate::pagination::{Aggregated, Page, Progress, fetch_all_pages};

pub use banner::Banner;
pub use category::Category;
pub use city::City;
pub use coupon::Coupon;
pub use pages::ResourcePages;
pub use venue::Venue;

/// REST 资源
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// 路径，同时也是列表响应中的集合键
    const PATH: &'static str;
    /// 单个对象响应中的键
    const ITEM_KEY: &'static str;
}

/// 某一类资源的增删改查
pub struct ResourceOperations<R> {
    fetch: AuthFetch,
    page_size: u32,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceOperations<R> {
    fn clone(&self) -> Self {
        Self {
            fetch: self.fetch.clone(),
            page_size: self.page_size,
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceOperations<R> {
    pub fn new(fetch: AuthFetch, page_size: u32) -> Self {
        Self {
            fetch,
            page_size,
            _resource: PhantomData,
        }
    }

    /// 取一页
    pub async fn list(&self, page: u32, limit: u32, filters: &[(&str, &str)]) -> Result<Page<R>> {
        pages::request_page(&self.fetch, true, page, limit, &owned(filters)).await
    }

    pub async fn get(&self, id: i64) -> Result<R> {
        let response = self.fetch.send(ApiRequest::get(item_path::<R>(id))).await?;
        parse_item::<R>(ensure_success(response).await?.json().await?)
    }

    pub async fn create<P: Serialize + ?Sized>(&self, payload: &P) -> Result<R> {
        let request = ApiRequest::post(format!("/{}", R::PATH)).json(payload)?;
        let response = self.fetch.send(request).await?;
        let created = parse_item::<R>(ensure_success(response).await?.json().await?)?;
        tracing::info!("Created {} entry", R::ITEM_KEY);
        Ok(created)
    }

    pub async fn update<P: Serialize + ?Sized>(&self, id: i64, payload: &P) -> Result<R> {
        let request = ApiRequest::put(item_path::<R>(id)).json(payload)?;
        let response = self.fetch.send(request).await?;
        let updated = parse_item::<R>(ensure_success(response).await?.json().await?)?;
        tracing::info!("Updated {} {}", R::ITEM_KEY, id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let response = self.fetch.send(ApiRequest::delete(item_path::<R>(id))).await?;
        ensure_success(response).await?;
        tracing::info!("Deleted {} {}", R::ITEM_KEY, id);
        Ok(())
    }

    /// 带认证取回全部记录
    pub async fn list_all<F>(&self, filters: &[(&str, &str)], on_progress: F) -> Aggregated<R>
    where
        F: FnMut(Progress<'_, R>),
    {
        let source = ResourcePages::<R>::authenticated(self.fetch.clone(), filters);
        fetch_all_pages(&source, self.page_size, on_progress).await
    }

    /// 公开接口取回全部记录，不需要登录
    pub async fn list_all_public<F>(&self, filters: &[(&str, &str)], on_progress: F) -> Aggregated<R>
    where
        F: FnMut(Progress<'_, R>),
    {
        let source = ResourcePages::<R>::public(self.fetch.clone(), filters);
        fetch_all_pages(&source, self.page_size, on_progress).await
    }
}

fn item_path<R: Resource>(id: i64) -> String {
    format!("/{}/{}", R::PATH, id)
}

fn owned(filters: &[(&str, &str)]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// 单个对象可能包在资源键或 `data` 里
fn parse_item<R: Resource>(body: Value) -> Result<R> {
    let item = match body {
        Value::Object(mut map) if map.contains_key(R::ITEM_KEY) || map.contains_key("data") => map
            .remove(R::ITEM_KEY)
            .or_else(|| map.remove("data"))
            .ok_or_else(|| ClientError::MalformedResponse("empty item response".into()))?,
        other => other,
    };
    Ok(serde_json::from_value(item)?)
}
