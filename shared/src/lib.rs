//! TechNest 共享领域层
//!
//! 前端与测试共用的纯 Rust 代码，不依赖任何浏览器 API：
//! - 领域模型（会话、教程、帖子、社区、广告、个人资料）
//! - `protocol`: 所有后端接口的请求/响应定义
//! - `validation`: 提交前的客户端表单校验
//! - `quiz`: 测验状态机
//! - `activity`: 仪表盘按日期分桶统计

pub mod activity;
pub mod advert;
pub mod date;
pub mod profile;
pub mod protocol;
pub mod quiz;
pub mod social;
pub mod validation;

pub use advert::{AdCategory, Advertisement, AdvertisementRequest};
pub use profile::{AdminUserSummary, ProfileUpdate, RegistrationRecord, UserProfile};
pub use quiz::{Mcq, Tutorial, TutorialProgress};
pub use social::{CommunityComment, CommunityPost, Post, PostComment};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

/// 广告未填写链接时使用的占位地址
pub const PLACEHOLDER_AD_LINK: &str = "https://via.placeholder.com/800x400";

// =========================================================
// 角色与会话 (Role & Session)
// =========================================================

/// 用户角色
///
/// 所有基于角色的分支都必须对此枚举做穷尽匹配，不再散落字符串比较。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[serde(alias = "ROLE_USER", alias = "user")]
    User,
    #[serde(alias = "ROLE_ADMIN", alias = "admin")]
    Admin,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::User, Role::Admin];

    /// 持久化与传输使用的字符串形式
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// 界面显示用的名称
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// 宽松解析：忽略大小写并接受 Spring 风格的 `ROLE_` 前缀
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        match normalized.strip_prefix("ROLE_").unwrap_or(&normalized) {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// 客户端持有的认证凭据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub email: String,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role, email: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            role,
            email: email.into(),
        }
    }

    /// `Authorization` 请求头的值
    pub fn bearer(&self) -> String {
        format!("{}{}", BEARER_PREFIX, self.token)
    }
}

/// 用于所有权判断的当前访问者
///
/// `id` 来自 `GET /api/profile`，在会话建立后异步补全，因此可能暂缺。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub id: Option<i64>,
    pub email: String,
    pub role: Role,
}

impl Viewer {
    pub fn from_session(session: &Session, id: Option<i64>) -> Self {
        Self {
            id,
            email: session.email.clone(),
            role: session.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

// =========================================================
// 所有权 (Ownership)
// =========================================================

/// 带有数字主键的实体，供列表按 id 做增删改
pub trait Entity {
    fn id(&self) -> i64;
}

/// 可由作者（以及可选的管理员）修改的资源
pub trait Owned {
    /// 管理员是否拥有该类资源的管理权限
    const ADMIN_MODERATED: bool;

    fn is_owned_by(&self, viewer: &Viewer) -> bool;

    /// 编辑/删除按钮是否对该访问者可见
    fn can_modify(&self, viewer: &Viewer) -> bool {
        self.is_owned_by(viewer) || (Self::ADMIN_MODERATED && viewer.is_admin())
    }
}

/// 身份比较：只有双方都有 id 且相等时才视为同一用户
pub(crate) fn same_user(author: Option<i64>, viewer: &Viewer) -> bool {
    matches!((author, viewer.id), (Some(a), Some(v)) if a == v)
}

// =========================================================
// 认证载荷 (Auth Payloads)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthLoginRequest {
    pub credential: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthLoginResponse {
    pub token: String,
    pub role: Role,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    pub birthday: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAdminRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetConfirmRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

// =========================================================
// 分页 (Pagination)
// =========================================================

/// 列表范围：全部，或仅当前用户创建的
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListScope {
    #[default]
    All,
    Mine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub const fn first(size: u32) -> Self {
        Self { page: 0, size }
    }

    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }

    pub fn previous(self) -> Self {
        Self {
            page: self.page.saturating_sub(1),
            ..self
        }
    }
}

/// Spring 风格的分页响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default = "default_true")]
    pub last: bool,
}

fn default_true() -> bool {
    true
}

/// 集合接口既可能返回分页对象，也可能直接返回数组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageOrList<T> {
    Page(Page<T>),
    List(Vec<T>),
}

impl<T> PageOrList<T> {
    /// 统一转换为分页对象；数组视为唯一的一页
    pub fn into_page(self) -> Page<T> {
        match self {
            PageOrList::Page(page) => page,
            PageOrList::List(items) => Page {
                size: items.len() as u32,
                total_elements: items.len() as u64,
                total_pages: 1,
                number: 0,
                last: true,
                content: items,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_lenient() {
        assert_eq!("USER".parse::<Role>(), Ok(Role::User));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("ROLE_ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert!("".parse::<Role>().is_err());
        let err = "MODERATOR".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "unknown role: MODERATOR");
    }

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        let role: Role = serde_json::from_str("\"ROLE_USER\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn session_bearer_header() {
        let session = Session::new("abc", Role::User, "a@b.co");
        assert_eq!(session.bearer(), "Bearer abc");
    }

    #[test]
    fn page_or_list_accepts_both_shapes() {
        let page: PageOrList<i64> =
            serde_json::from_str(r#"{"content":[1,2],"number":0,"totalPages":3,"last":false}"#)
                .unwrap();
        let page = page.into_page();
        assert_eq!(page.content, vec![1, 2]);
        assert_eq!(page.total_pages, 3);
        assert!(!page.last);

        let list: PageOrList<i64> = serde_json::from_str("[4,5,6]").unwrap();
        let page = list.into_page();
        assert_eq!(page.content, vec![4, 5, 6]);
        assert!(page.last);
    }

    #[test]
    fn previous_page_saturates() {
        assert_eq!(PageRequest::first(10).previous().page, 0);
        assert_eq!(PageRequest::first(10).next().next().previous().page, 1);
    }

    #[test]
    fn register_user_payload_is_camel_case() {
        let req = RegisterUserRequest {
            email: "a@b.co".into(),
            password: "secret123".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            mobile: "0123456789".into(),
            birthday: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["birthday"], serde_json::Value::Null);
    }
}
