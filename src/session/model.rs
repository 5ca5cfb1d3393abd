use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::string_or_number;

/// 用户角色，服务端以小写字符串返回
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    Propietario,
    Usuario,
    #[serde(other)]
    Otro,
}

impl Role {
    /// 是否允许进入管理后台
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::Superadmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Propietario => "propietario",
            Role::Usuario => "usuario",
            Role::Otro => "otro",
        };
        f.write_str(name)
    }
}

/// 登录用户资料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "rol")]
    pub role: Role,
}

/// 客户端会话
///
/// 没有访问令牌就没有会话，所以 `access_token` 不是可选的。
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }
}
