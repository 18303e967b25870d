//! 前端错误模型
//!
//! 所有请求失败统一归入 [`ApiError`]，界面据此决定：
//! - `Unauthorized`: 结束会话，由路由守卫跳转到登录页
//! - `Rejected`: 显示服务端消息
//! - `Network` / `Decode`: 显示通用提示
//! - `Cancelled`: 视图已卸载，静默丢弃

use serde::Deserialize;
use thiserror::Error;

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Your session has expired. Please log in again.")]
    Unauthorized,
    #[error("{}", .message.as_deref().unwrap_or(GENERIC_ERROR_MESSAGE))]
    Rejected { status: u16, message: Option<String> },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Request cancelled")]
    Cancelled,
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// 从错误响应体中提取服务端消息
///
/// 支持 `{"message": ..}`、`{"error": ..}` 以及纯文本响应体；
/// HTML 错误页与空响应体视为没有消息。
pub fn server_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed
            .message
            .or(parsed.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
    }
    if body.starts_with('<') || body.starts_with('{') || body.starts_with('[') {
        return None;
    }
    Some(body.to_string())
}

impl ApiError {
    /// 由非 2xx 响应构造错误
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => ApiError::Unauthorized,
            _ => ApiError::Rejected {
                status,
                message: server_message(body),
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// 展示给用户的文案
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) | ApiError::Decode(_) => GENERIC_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_end_the_session() {
        assert_eq!(ApiError::from_status(401, ""), ApiError::Unauthorized);
        assert_eq!(ApiError::from_status(403, "Forbidden"), ApiError::Unauthorized);
        assert!(ApiError::from_status(401, "").is_unauthorized());
        assert!(!ApiError::from_status(404, "").is_unauthorized());
        assert!(!ApiError::Cancelled.is_unauthorized());
    }

    #[test]
    fn extracts_json_and_text_messages() {
        assert_eq!(
            server_message(r#"{"message":"Email already exists"}"#).as_deref(),
            Some("Email already exists")
        );
        assert_eq!(
            server_message(r#"{"error":"Invalid OTP"}"#).as_deref(),
            Some("Invalid OTP")
        );
        assert_eq!(
            server_message("Tutorial not found").as_deref(),
            Some("Tutorial not found")
        );
        assert_eq!(server_message(r#"{"status":500}"#), None);
        assert_eq!(server_message("<html>oops</html>"), None);
        assert_eq!(server_message("   "), None);
    }

    #[test]
    fn rejected_falls_back_to_generic_message() {
        let err = ApiError::from_status(500, "");
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);

        let err = ApiError::from_status(400, r#"{"message":"Title is required"}"#);
        assert_eq!(err.user_message(), "Title is required");
    }

    #[test]
    fn transport_errors_stay_generic() {
        let err = ApiError::Network("TypeError: Failed to fetch".into());
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
        assert!(!err.is_unauthorized());
    }
}
