/// 访问令牌键
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// 刷新令牌键
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// 序列化后的用户资料键
pub const USER_KEY: &str = "user";

/// 会话占用的全部键，登出时一并删除
pub const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

/// 生成 Redis 中带命名空间的会话键
pub fn namespaced_key(namespace: &str, key: &str) -> String {
    format!("{}:session:{}", namespace, key)
}
