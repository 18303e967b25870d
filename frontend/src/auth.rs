//! 认证模块
//!
//! 管理会话状态，与路由系统解耦：
//! - [`SessionStore`]: 会话的持久化（token / role / email 三个键）
//! - [`AuthGateway`]: 认证接口抽象，由 `TechNestApi` 实现
//! - [`AuthContext`]: 根组件创建并通过 Context 注入的响应式会话
//!
//! 路由服务只订阅派生出的角色信号，会话变化时自动重新执行守卫。

use crate::api::TechNestApi;
use crate::config::{STORAGE_EMAIL_KEY, STORAGE_ROLE_KEY, STORAGE_TOKEN_KEY};
use crate::error::{ApiError, ApiResult};
use crate::web::{KeyValueStore, LocalStorage};
use async_trait::async_trait;
use leptos::prelude::*;
use leptos::task::spawn_local;
use technest_shared::protocol::GetProfile;
use technest_shared::{
    LoginRequest, LoginResponse, OAuthLoginRequest, OAuthLoginResponse, Role, Session, Viewer,
};
use thiserror::Error;

// =========================================================
// 持久化 (Persistence)
// =========================================================

/// 会话持久化
pub struct SessionStore<S> {
    storage: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// 读取持久化的会话
    ///
    /// 三个键必须同时存在且角色可解析，否则视为未登录。
    pub fn restore(&self) -> Option<Session> {
        let token = self.storage.get(STORAGE_TOKEN_KEY)?;
        let role = self.storage.get(STORAGE_ROLE_KEY)?;
        let email = self.storage.get(STORAGE_EMAIL_KEY)?;
        if token.is_empty() || email.is_empty() {
            return None;
        }
        let role = role.parse::<Role>().ok()?;
        Some(Session::new(token, role, email))
    }

    pub fn persist(&self, session: &Session) {
        let ok = self.storage.set(STORAGE_TOKEN_KEY, &session.token)
            && self.storage.set(STORAGE_ROLE_KEY, session.role.as_str())
            && self.storage.set(STORAGE_EMAIL_KEY, &session.email);
        if !ok {
            // 不留下残缺的会话键
            self.clear();
            log_warn!("[Auth] Failed to persist session; it will not survive a reload.");
        }
    }

    pub fn clear(&self) {
        self.storage.delete(STORAGE_TOKEN_KEY);
        self.storage.delete(STORAGE_ROLE_KEY);
        self.storage.delete(STORAGE_EMAIL_KEY);
    }
}

// =========================================================
// 认证网关 (Gateway)
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("This account is not registered as {}", .expected.label())]
    RoleMismatch { expected: Role, actual: Role },
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// 认证相关接口
#[async_trait(?Send)]
pub trait AuthGateway {
    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse>;

    async fn google_login(&self, credential: &str) -> ApiResult<OAuthLoginResponse>;
}

/// 校验凭据并构造会话
///
/// 指定 `expected` 时，服务端返回的角色不一致视为登录失败。
pub async fn authenticate<G: AuthGateway + ?Sized>(
    gateway: &G,
    email: &str,
    password: &str,
    expected: Option<Role>,
) -> Result<Session, AuthError> {
    let email = email.trim();
    let request = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    let response = gateway.login(&request).await.map_err(|e| match e {
        ApiError::Unauthorized => AuthError::InvalidCredentials,
        other => AuthError::Api(other),
    })?;

    if let Some(expected) = expected
        && expected != response.role
    {
        return Err(AuthError::RoleMismatch {
            expected,
            actual: response.role,
        });
    }
    Ok(Session::new(response.token, response.role, email))
}

/// Google 凭据换取会话
pub async fn authenticate_google<G: AuthGateway + ?Sized>(
    gateway: &G,
    credential: &str,
) -> Result<Session, AuthError> {
    let response = gateway.google_login(credential).await?;
    Ok(Session::new(response.token, response.role, response.email))
}

// =========================================================
// 响应式上下文 (Context)
// =========================================================

/// 认证上下文
///
/// 包含读写信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 当前会话
    session: RwSignal<Option<Session>>,
    /// 当前用户 id，来自 `GET /api/profile`
    viewer_id: RwSignal<Option<i64>>,
}

impl AuthContext {
    /// 创建新的认证上下文
    pub fn new() -> Self {
        Self {
            session: RwSignal::new(None),
            viewer_id: RwSignal::new(None),
        }
    }

    fn store() -> SessionStore<LocalStorage> {
        SessionStore::new(LocalStorage)
    }

    pub fn session(&self) -> Signal<Option<Session>> {
        self.session.into()
    }

    /// 获取角色信号（用于路由服务注入）
    pub fn role_signal(&self) -> Signal<Option<Role>> {
        let session = self.session;
        Signal::derive(move || session.with(|s| s.as_ref().map(|s| s.role)))
    }

    pub fn role(&self) -> Option<Role> {
        self.session.with(|s| s.as_ref().map(|s| s.role))
    }

    /// 当前访问者，用于编辑/删除按钮的所有权判断
    pub fn viewer(&self) -> Option<Viewer> {
        let id = self.viewer_id.get();
        self.session
            .with(|s| s.as_ref().map(|s| Viewer::from_session(s, id)))
    }

    /// 带当前凭据的 API 客户端
    pub fn api(&self) -> TechNestApi {
        self.session
            .with_untracked(|s| TechNestApi::from_config().with_session(s.as_ref()))
    }

    /// 建立会话（密码登录、Google 登录、OAuth 回调）
    pub fn sign_in(&self, session: Session) {
        log_info!("[Auth] Signed in as {} ({})", session.email, session.role);
        Self::store().persist(&session);
        self.viewer_id.set(None);
        self.session.set(Some(session));
    }

    /// 注销并清除状态
    ///
    /// 导航将由路由服务的会话监听自动处理。
    pub fn logout(&self) {
        if self.session.get_untracked().is_some() {
            log_info!("[Auth] Session ended");
        }
        Self::store().clear();
        self.viewer_id.set(None);
        self.session.set(None);
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 初始化认证状态
///
/// 从 LocalStorage 恢复会话，并在每次会话变化后补全当前用户 id。
pub fn init_auth(ctx: &AuthContext) {
    if let Some(session) = AuthContext::store().restore() {
        ctx.session.set(Some(session));
    }

    let ctx = *ctx;
    Effect::new(move |_| {
        let Some(session) = ctx.session.get() else {
            return;
        };
        spawn_local(async move {
            let api = TechNestApi::from_config().with_session(Some(&session));
            match api.send(&GetProfile).await {
                Ok(profile) => {
                    // 会话已切换则丢弃
                    if ctx.session.get_untracked().as_ref() == Some(&session) {
                        ctx.viewer_id.set(profile.id);
                    }
                }
                Err(ApiError::Unauthorized) => ctx.logout(),
                Err(e) => log_warn!("[Auth] Could not load profile: {}", e),
            }
        });
    });
}

/// 密码登录并保存会话
pub async fn login(
    ctx: &AuthContext,
    email: &str,
    password: &str,
    expected: Option<Role>,
) -> Result<Role, AuthError> {
    let session = authenticate(&ctx.api(), email, password, expected).await?;
    let role = session.role;
    ctx.sign_in(session);
    Ok(role)
}

/// Google 登录并保存会话
pub async fn login_with_google(ctx: &AuthContext, credential: &str) -> Result<Role, AuthError> {
    let session = authenticate_google(&ctx.api(), credential).await?;
    let role = session.role;
    ctx.sign_in(session);
    Ok(role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    // =========================================================
    // Mock Components
    // =========================================================

    #[derive(Clone, Default)]
    struct MemoryStorage {
        data: Rc<RefCell<HashMap<String, String>>>,
        /// 写入该键时模拟配额错误
        reject_key: Option<&'static str>,
    }

    impl KeyValueStore for MemoryStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.data.borrow().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) -> bool {
            if self.reject_key == Some(key) {
                return false;
            }
            self.data
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            true
        }

        fn delete(&self, key: &str) {
            self.data.borrow_mut().remove(key);
        }
    }

    struct MockGateway {
        response: ApiResult<LoginResponse>,
        calls: RefCell<Vec<String>>,
    }

    impl MockGateway {
        fn answering(role: Role) -> Self {
            Self {
                response: Ok(LoginResponse {
                    token: "jwt-token".into(),
                    role,
                }),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing(err: ApiError) -> Self {
            Self {
                response: Err(err),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl AuthGateway for MockGateway {
        async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
            self.calls.borrow_mut().push(request.email.clone());
            self.response.clone()
        }

        async fn google_login(&self, _credential: &str) -> ApiResult<OAuthLoginResponse> {
            self.response.clone().map(|r| OAuthLoginResponse {
                token: r.token,
                role: r.role,
                email: "g@technest.dev".into(),
            })
        }
    }

    // =========================================================
    // Tests
    // =========================================================

    #[test]
    fn restore_requires_all_three_keys() {
        let storage = MemoryStorage::default();
        let store = SessionStore::new(storage.clone());
        assert_eq!(store.restore(), None);

        storage.set(STORAGE_TOKEN_KEY, "t");
        storage.set(STORAGE_ROLE_KEY, "USER");
        assert_eq!(store.restore(), None);

        storage.set(STORAGE_EMAIL_KEY, "a@b.co");
        assert_eq!(
            store.restore(),
            Some(Session::new("t", Role::User, "a@b.co"))
        );
        // 幂等
        assert_eq!(store.restore(), store.restore());
    }

    #[test]
    fn restore_rejects_unknown_role() {
        let storage = MemoryStorage::default();
        storage.set(STORAGE_TOKEN_KEY, "t");
        storage.set(STORAGE_ROLE_KEY, "SUPERUSER");
        storage.set(STORAGE_EMAIL_KEY, "a@b.co");
        assert_eq!(SessionStore::new(storage).restore(), None);
    }

    #[test]
    fn persist_then_clear_round_trip() {
        let storage = MemoryStorage::default();
        let store = SessionStore::new(storage.clone());
        let session = Session::new("t", Role::Admin, "root@technest.dev");

        store.persist(&session);
        assert_eq!(storage.get(STORAGE_ROLE_KEY).as_deref(), Some("ADMIN"));
        assert_eq!(store.restore(), Some(session));

        store.clear();
        assert_eq!(store.restore(), None);
        assert!(storage.data.borrow().is_empty());
    }

    #[test]
    fn failed_persist_leaves_no_partial_session() {
        let storage = MemoryStorage {
            reject_key: Some(STORAGE_EMAIL_KEY),
            ..Default::default()
        };
        let store = SessionStore::new(storage.clone());

        store.persist(&Session::new("t", Role::User, "a@b.co"));

        assert!(storage.data.borrow().is_empty());
        assert_eq!(store.restore(), None);
    }

    #[tokio::test]
    async fn login_builds_session_from_server_role() {
        let gateway = MockGateway::answering(Role::User);
        let session = authenticate(&gateway, " ada@technest.dev ", "secret123", None)
            .await
            .unwrap();
        assert_eq!(session, Session::new("jwt-token", Role::User, "ada@technest.dev"));
        assert_eq!(*gateway.calls.borrow(), vec!["ada@technest.dev".to_string()]);
    }

    #[tokio::test]
    async fn login_with_wrong_expected_role_fails() {
        let gateway = MockGateway::answering(Role::User);
        let err = authenticate(&gateway, "ada@technest.dev", "pw", Some(Role::Admin))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::RoleMismatch {
                expected: Role::Admin,
                actual: Role::User
            }
        );
    }

    #[tokio::test]
    async fn rejected_credentials_map_to_invalid_credentials() {
        let gateway = MockGateway::failing(ApiError::Unauthorized);
        let err = authenticate(&gateway, "a@b.co", "bad", None).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);

        let gateway = MockGateway::failing(ApiError::Network("offline".into()));
        let err = authenticate(&gateway, "a@b.co", "pw", None).await.unwrap_err();
        assert!(matches!(err, AuthError::Api(ApiError::Network(_))));
    }

    #[tokio::test]
    async fn google_login_uses_server_email() {
        let gateway = MockGateway::answering(Role::Admin);
        let session = authenticate_google(&gateway, "credential").await.unwrap();
        assert_eq!(session.email, "g@technest.dev");
        assert_eq!(session.role, Role::Admin);
    }
}
