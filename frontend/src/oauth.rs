//! Google 登录
//!
//! 两条路径：
//! - 登录页渲染 Google Identity Services 按钮，拿到 credential 后调用
//!   `POST /api/auth/oauth/google` 换取会话
//! - 后端重定向回前端时在查询串中携带 `token` / `role` / `email` 或 `error`，
//!   应用启动时解析并建立会话

use technest_shared::{Role, Session};
use wasm_bindgen::prelude::*;

/// 重定向回调的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthCallback {
    Success(Session),
    Failed(String),
}

impl OAuthCallback {
    /// 从查询参数解析；查询串中没有回调参数时返回 `None`
    pub fn from_params(get: impl Fn(&str) -> Option<String>) -> Option<Self> {
        if let Some(error) = get("error") {
            return Some(Self::Failed(error));
        }
        let token = get("token").filter(|t| !t.is_empty())?;
        let role = get("role")?;
        let email = get("email").filter(|e| !e.is_empty())?;
        match role.parse::<Role>() {
            Ok(role) => Some(Self::Success(Session::new(token, role, email))),
            Err(e) => Some(Self::Failed(e.to_string())),
        }
    }
}

/// 读取当前地址的回调参数
pub fn read_callback() -> Option<OAuthCallback> {
    let search = web_sys::window()?.location().search().ok()?;
    if search.is_empty() {
        return None;
    }
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    OAuthCallback::from_params(|key| params.get(key))
}

#[wasm_bindgen]
extern "C" {
    /// `index.html` 中定义的 GIS 初始化函数
    #[wasm_bindgen(js_name = technestRenderGoogleButton, catch)]
    fn render_google_button_js(
        client_id: &str,
        parent: &web_sys::Element,
        callback: &Closure<dyn FnMut(String)>,
    ) -> Result<(), JsValue>;
}

/// 在 `parent` 中渲染 Google 登录按钮
///
/// GIS 脚本未加载时返回错误，调用方隐藏按钮即可。
pub fn render_google_button(
    client_id: &str,
    parent: &web_sys::Element,
    on_credential: impl FnMut(String) + 'static,
) -> Result<(), String> {
    let callback = Closure::<dyn FnMut(String)>::new(on_credential);
    render_google_button_js(client_id, parent, &callback).map_err(|e| format!("{:?}", e))?;
    // 回调由 GIS 持有
    callback.forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(pairs: &[(&str, &str)]) -> Option<OAuthCallback> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        OAuthCallback::from_params(|key| map.get(key).cloned())
    }

    #[test]
    fn complete_callback_builds_session() {
        assert_eq!(
            parse(&[("token", "t"), ("role", "ADMIN"), ("email", "a@b.co")]),
            Some(OAuthCallback::Success(Session::new("t", Role::Admin, "a@b.co")))
        );
    }

    #[test]
    fn error_wins_over_everything() {
        assert_eq!(
            parse(&[("error", "access_denied"), ("token", "t")]),
            Some(OAuthCallback::Failed("access_denied".into()))
        );
    }

    #[test]
    fn partial_or_unrelated_queries_are_ignored() {
        assert_eq!(parse(&[]), None);
        assert_eq!(parse(&[("page", "2")]), None);
        assert_eq!(parse(&[("token", "t"), ("role", "USER")]), None);
    }

    #[test]
    fn unknown_role_is_a_failure() {
        assert!(matches!(
            parse(&[("token", "t"), ("role", "GUEST"), ("email", "a@b.co")]),
            Some(OAuthCallback::Failed(_))
        ));
    }
}
