// 分页聚合
// 逐页请求列表接口直到取完，绕开服务端的单页上限

pub mod envelope;

use async_trait::async_trait;

use crate::error::Result;

pub use envelope::parse_page;

/// 默认页大小，服务端单页上限
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// 一页数据
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub records: Vec<T>,
    /// 服务端报告的总数，可能缺失
    pub total: Option<u64>,
}

/// 能按页码取数据的来源
#[async_trait]
pub trait PageSource<T: Send>: Send + Sync {
    /// `page` 从 1 开始
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<T>>;
}

/// 每取完一页回调一次的进度
#[derive(Debug)]
pub struct Progress<'a, T> {
    pub records: &'a [T],
    pub page: u32,
    pub total: Option<u64>,
}

/// 聚合结果，`complete` 为 false 表示中途失败、数据被截断
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregated<T> {
    pub records: Vec<T>,
    pub complete: bool,
    pub failure_reason: Option<String>,
    pub pages_fetched: u32,
    pub total: Option<u64>,
}

impl<T> Aggregated<T> {
    pub fn is_partial(&self) -> bool {
        !self.complete
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }
}

/// 取回全部页
///
/// 某页失败时停止并返回已累积的数据，不重试，也不向上抛错。
/// 收到的记录数小于页大小，或累积数达到服务端总数时结束。
/// 丢弃返回的 future 即放弃本次聚合。
pub async fn fetch_all_pages<T, S, F>(source: &S, page_size: u32, mut on_progress: F) -> Aggregated<T>
where
    T: Send,
    S: PageSource<T> + ?Sized,
    F: FnMut(Progress<'_, T>),
{
    let page_size = page_size.max(1);
    let mut records: Vec<T> = Vec::new();
    let mut total: Option<u64> = None;
    let mut page: u32 = 1;
    let mut pages_fetched: u32 = 0;

    loop {
        let fetched = match source.fetch_page(page, page_size).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(
                    page,
                    accumulated = records.len(),
                    "Page request failed, returning partial result: {}",
                    e
                );
                return Aggregated {
                    records,
                    complete: false,
                    failure_reason: Some(e.to_string()),
                    pages_fetched,
                    total,
                };
            }
        };

        pages_fetched += 1;
        if total.is_none() {
            total = fetched.total;
        }

        let received = fetched.records.len();
        records.extend(fetched.records);
        tracing::debug!(page, received, accumulated = records.len(), "Fetched page");

        on_progress(Progress {
            records: &records,
            page,
            total,
        });

        let last_page = received < page_size as usize;
        let reached_total = total.is_some_and(|total| records.len() as u64 >= total);
        if last_page || reached_total {
            break;
        }
        page += 1;
    }

    Aggregated {
        records,
        complete: true,
        failure_reason: None,
        pages_fetched,
        total,
    }
}
