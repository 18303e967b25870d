//! 构建期配置
//!
//! 通过 `option_env!` 在编译时读取，未设置时使用默认值：
//! - `TECHNEST_API_BASE`: 后端地址
//! - `TECHNEST_GOOGLE_CLIENT_ID`: Google 登录的 OAuth Client ID

use std::time::Duration;

const DEFAULT_API_BASE: &str = "http://localhost:8080";

/// 后端根地址（不含末尾 `/`）
pub fn api_base() -> &'static str {
    option_env!("TECHNEST_API_BASE")
        .unwrap_or(DEFAULT_API_BASE)
        .trim_end_matches('/')
}

/// 未配置时 Google 登录按钮不渲染
pub fn google_client_id() -> Option<&'static str> {
    option_env!("TECHNEST_GOOGLE_CLIENT_ID").filter(|id| !id.trim().is_empty())
}

// =========================================================
// 持久化键 (Storage Keys)
// =========================================================

pub const STORAGE_TOKEN_KEY: &str = "token";
pub const STORAGE_ROLE_KEY: &str = "role";
pub const STORAGE_EMAIL_KEY: &str = "email";

// =========================================================
// 界面常量 (UI)
// =========================================================

pub const POSTS_PAGE_SIZE: u32 = 10;
pub const COMMUNITY_PAGE_SIZE: u32 = 10;

/// 通知自动消失时间
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);
