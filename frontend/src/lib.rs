//! TechNest 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义与守卫决策（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `auth`: 会话状态管理
//! - `api`: 后端接口客户端
//! - `resource`: 列表视图的乐观更新与取消令牌
//! - `components`: UI 组件层

#[macro_use]
mod log;

mod api;
mod auth;
mod config;
mod error;
mod notify;
mod oauth;
mod resource;

mod components {
    pub mod admin_dashboard;
    pub mod advertisements;
    pub mod common;
    pub mod community;
    pub mod dashboard;
    pub mod forgot_password;
    pub mod home;
    pub mod login;
    pub mod navbar;
    pub mod posts;
    pub mod profile;
    pub mod quiz;
    pub mod register;
    pub mod tutorials;
}

// 浏览器 API 封装模块
pub(crate) mod web {
    mod http;
    pub mod route;
    pub mod router;
    mod storage;

    pub use http::{HttpClient, HttpError, HttpRequestBuilder};
    pub use storage::{KeyValueStore, LocalStorage};
}

use crate::auth::{AuthContext, init_auth};
use crate::components::admin_dashboard::AdminDashboardPage;
use crate::components::advertisements::{AdvertisementEditorPage, AdvertisementsPage};
use crate::components::community::CommunityPage;
use crate::components::dashboard::DashboardPage;
use crate::components::forgot_password::ForgotPasswordPage;
use crate::components::home::HomePage;
use crate::components::login::LoginPage;
use crate::components::navbar::Navbar;
use crate::components::posts::PostsPage;
use crate::components::profile::ProfilePage;
use crate::components::quiz::QuizPage;
use crate::components::register::RegisterPage;
use crate::components::tutorials::{TutorialEditorPage, TutorialsPage};
use crate::notify::{NotificationToast, provide_notifier};
use crate::oauth::{OAuthCallback, read_callback};

use leptos::prelude::*;
use technest_shared::Role;
use web::route::AppRoute;
use web::router::{Router, RouterOutlet, use_router};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::UserLogin => view! { <LoginPage role=Role::User /> }.into_any(),
        AppRoute::AdminLogin => view! { <LoginPage role=Role::Admin /> }.into_any(),
        AppRoute::UserRegister => view! { <RegisterPage role=Role::User /> }.into_any(),
        AppRoute::AdminRegister => view! { <RegisterPage role=Role::Admin /> }.into_any(),
        AppRoute::ForgotPassword => view! { <ForgotPasswordPage /> }.into_any(),
        AppRoute::OAuthRedirect => view! {
            <div class="flex items-center justify-center min-h-[60vh]">
                <span class="loading loading-spinner loading-lg text-primary"></span>
            </div>
        }
        .into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::AdminDashboard => view! { <AdminDashboardPage /> }.into_any(),
        AppRoute::Tutorials => view! { <TutorialsPage /> }.into_any(),
        AppRoute::TutorialEditor(id) => view! { <TutorialEditorPage id=id /> }.into_any(),
        AppRoute::Quiz(id) => view! { <QuizPage id=id /> }.into_any(),
        AppRoute::Posts(scope) => view! { <PostsPage scope=scope /> }.into_any(),
        AppRoute::Community(scope) => view! { <CommunityPage scope=scope /> }.into_any(),
        AppRoute::Advertisements(scope) => {
            view! { <AdvertisementsPage scope=scope /> }.into_any()
        }
        AppRoute::AdvertisementEditor(id) => {
            view! { <AdvertisementEditorPage id=id /> }.into_any()
        }
        AppRoute::Profile | AppRoute::AdminProfile => view! { <ProfilePage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-[60vh]">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

/// 处理 Google 重定向回调（查询串中的 token / role / email / error）
#[component]
fn OAuthRedirectHandler(callback: Option<OAuthCallback>) -> impl IntoView {
    let auth = auth::use_auth();
    let router = use_router();
    let notifier = notify::use_notifier();

    match callback {
        Some(OAuthCallback::Success(session)) => {
            let role = session.role;
            auth.sign_in(session);
            notifier.success("Login successful");
            router.navigate_to(AppRoute::home_for(role));
        }
        Some(OAuthCallback::Failed(reason)) => {
            log_warn!("[OAuth] Login failed: {}", reason);
            notifier.error("OAuth login failed");
            router.navigate_to(AppRoute::UserLogin);
        }
        None => {}
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建认证上下文
    let auth_ctx = AuthContext::new();
    provide_context(auth_ctx);

    // 2. 恢复持久化的会话
    init_auth(&auth_ctx);

    // 3. 全局通知
    provide_notifier(auth_ctx);

    // 4. 获取角色信号，用于注入路由服务（解耦！）
    let role = auth_ctx.role_signal();
    let callback = read_callback();

    view! {
        // 5. 路由器组件：注入角色信号实现守卫
        <Router role=role>
            <OAuthRedirectHandler callback=callback />
            <div class="min-h-screen flex flex-col bg-base-200">
                <Navbar />
                <main class="flex-grow">
                    <RouterOutlet matcher=route_matcher />
                </main>
                <footer class="footer footer-center p-4 text-base-content/60">
                    <p>"© TechNest"</p>
                </footer>
            </div>
            <NotificationToast />
        </Router>
    }
}

/// 挂载应用到 `<body>`
pub fn mount() {
    console_error_panic_hook::set_once();
    log_info!("[App] Starting TechNest client against {}", config::api_base());
    mount_to_body(App);
}
