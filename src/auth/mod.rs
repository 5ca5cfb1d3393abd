// 认证模块
// 登录、登出、启动时恢复会话，以及访问令牌刷新

pub mod claims;
pub mod handler;
pub mod model;
pub mod refresh;

pub use handler::AuthClient;
pub use model::Credentials;
pub use refresh::TokenRefresher;
