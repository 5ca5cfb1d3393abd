use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// 读取 JWT 的 `exp`
///
/// 客户端没有签名密钥，只看声明不验签；非 JWT 的不透明令牌返回 None。
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    DateTime::from_timestamp(data.claims.exp?, 0)
}

/// 令牌在 `leeway` 之内即将过期也算过期
pub fn is_expired(token: &str, now: DateTime<Utc>, leeway: Duration) -> bool {
    match token_expiry(token) {
        Some(expires_at) => expires_at <= now + leeway,
        None => false,
    }
}
