// 会话模块
// 包含会话数据结构、本地存储后端和会话读写逻辑

pub mod keys;
pub mod model;
pub mod storage;
pub mod store;

pub use model::{Role, Session, UserProfile};
pub use storage::{FileStorage, LocalStorage, MemoryStorage, RedisStorage};
pub use store::SessionStore;
