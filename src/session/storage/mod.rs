// 本地键值存储
// 对应浏览器的 localStorage 或移动端的持久化存储

mod file;
mod memory;
mod redis_store;

use async_trait::async_trait;

use crate::error::Result;

pub use self::file::FileStorage;
pub use self::memory::MemoryStorage;
pub use self::redis_store::RedisStorage;

#[async_trait]
pub trait LocalStorage: Send + Sync {
    /// 读取键值，不存在时返回 None
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// 写入键值，已存在则覆盖
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// 删除键值，不存在时不报错
    async fn remove_item(&self, key: &str) -> Result<()>;
}
