use serde::{Deserialize, Serialize};
use std::fmt;

pub mod models;
pub mod protocol;

pub use models::*;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 持久化存储中的键名（与后端/旧客户端共享的事实标准）
pub const STORAGE_KEY_TOKEN: &str = "token";
pub const STORAGE_KEY_USER_ID: &str = "userId";
pub const STORAGE_KEY_ROLE_ID: &str = "roleId";

pub const HEADER_AUTHORIZATION: &str = "Authorization";

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 用户角色
///
/// 线上格式为整数：Student = 1, Parent = 2, Teacher = 3。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Role {
    Student,
    Parent,
    Teacher,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Parent, Role::Teacher];

    pub const fn id(self) -> u8 {
        match self {
            Role::Student => 1,
            Role::Parent => 2,
            Role::Teacher => 3,
        }
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Student),
            2 => Some(Role::Parent),
            3 => Some(Role::Teacher),
            _ => None,
        }
    }

    /// 解析存储中的字符串角色标识，非法输入返回 `None`
    pub fn parse_id(raw: &str) -> Option<Self> {
        raw.trim().parse::<u8>().ok().and_then(Self::from_id)
    }

    pub fn is_teacher(self) -> bool {
        matches!(self, Role::Teacher)
    }
}

impl TryFrom<u8> for Role {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Role::from_id(id).ok_or_else(|| format!("unknown role id: {}", id))
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        role.id()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Student => "student",
            Role::Parent => "parent",
            Role::Teacher => "teacher",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 服务端下发的原始角色 ID
///
/// 可能是整数也可能是字符串，未知取值同样接受，原样写入会话，
/// 解析交给读取方（见 `Role::parse_id`）。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawRoleId {
    Number(i64),
    Text(String),
}

impl RawRoleId {
    /// 已知角色；未知或格式错误时为 `None`
    pub fn role(&self) -> Option<Role> {
        Role::parse_id(&self.to_string())
    }
}

impl From<Role> for RawRoleId {
    fn from(role: Role) -> Self {
        RawRoleId::Number(role.id().into())
    }
}

impl fmt::Display for RawRoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawRoleId::Number(id) => write!(f, "{}", id),
            RawRoleId::Text(id) => f.write_str(id),
        }
    }
}

/// 登录 / 注册成功后服务端返回的凭据
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: String,
    #[serde(default)]
    pub role_id: Option<RawRoleId>,
}

impl AuthResponse {
    pub fn role(&self) -> Option<Role> {
        self.role_id.as_ref().and_then(RawRoleId::role)
    }
}

pub type LoginResponse = AuthResponse;
pub type SignupResponse = AuthResponse;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    pub role_id: Role,
}

/// 非 2xx 响应中可选的错误体
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
