//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、访问规则以及守卫决策。

use std::fmt::Display;
use technest_shared::{ListScope, Role};

const USER_ONLY: &[Role] = &[Role::User];
const ADMIN_ONLY: &[Role] = &[Role::Admin];
const SIGNED_IN: &[Role] = &[Role::User, Role::Admin];

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    #[default]
    Home,
    UserLogin,
    AdminLogin,
    UserRegister,
    AdminRegister,
    ForgotPassword,
    /// Google 登录回调落地页
    OAuthRedirect,
    Dashboard,
    AdminDashboard,
    Tutorials,
    /// `None` 为新建
    TutorialEditor(Option<i64>),
    Quiz(i64),
    Posts(ListScope),
    Community(ListScope),
    Advertisements(ListScope),
    AdvertisementEditor(Option<i64>),
    Profile,
    AdminProfile,
    /// 页面未找到
    NotFound,
}

/// 路由的访问规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// 任何人可见
    Public,
    /// 仅未登录访客（登录、注册、找回密码）
    Guest,
    /// 已登录且角色在集合内
    Roles(&'static [Role]),
}

/// 守卫决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(AppRoute),
}

fn parse_id(segment: &str) -> Option<i64> {
    segment.parse().ok()
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["login"] | ["user", "login"] => Self::UserLogin,
            ["admin", "login"] => Self::AdminLogin,
            ["register"] | ["user", "register"] => Self::UserRegister,
            ["admin", "register"] => Self::AdminRegister,
            ["forgot-password"] => Self::ForgotPassword,
            ["oauth2", "redirect"] => Self::OAuthRedirect,
            ["dashboard"] => Self::Dashboard,
            ["admin", "dashboard"] => Self::AdminDashboard,
            ["tutorials"] => Self::Tutorials,
            ["tutorials", "new"] => Self::TutorialEditor(None),
            ["tutorials", id, "edit"] => parse_id(id)
                .map(|id| Self::TutorialEditor(Some(id)))
                .unwrap_or(Self::NotFound),
            ["quiz", id] => parse_id(id).map(Self::Quiz).unwrap_or(Self::NotFound),
            ["feed"] => Self::Posts(ListScope::All),
            ["posts", "mine"] => Self::Posts(ListScope::Mine),
            ["community"] => Self::Community(ListScope::All),
            ["community", "mine"] => Self::Community(ListScope::Mine),
            ["advertisements"] => Self::Advertisements(ListScope::All),
            ["advertisements", "mine"] => Self::Advertisements(ListScope::Mine),
            ["advertisements", "new"] => Self::AdvertisementEditor(None),
            ["advertisements", id, "edit"] => parse_id(id)
                .map(|id| Self::AdvertisementEditor(Some(id)))
                .unwrap_or(Self::NotFound),
            ["profile"] => Self::Profile,
            ["admin", "profile"] => Self::AdminProfile,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".into(),
            Self::UserLogin => "/user/login".into(),
            Self::AdminLogin => "/admin/login".into(),
            Self::UserRegister => "/user/register".into(),
            Self::AdminRegister => "/admin/register".into(),
            Self::ForgotPassword => "/forgot-password".into(),
            Self::OAuthRedirect => "/oauth2/redirect".into(),
            Self::Dashboard => "/dashboard".into(),
            Self::AdminDashboard => "/admin/dashboard".into(),
            Self::Tutorials => "/tutorials".into(),
            Self::TutorialEditor(None) => "/tutorials/new".into(),
            Self::TutorialEditor(Some(id)) => format!("/tutorials/{}/edit", id),
            Self::Quiz(id) => format!("/quiz/{}", id),
            Self::Posts(ListScope::All) => "/feed".into(),
            Self::Posts(ListScope::Mine) => "/posts/mine".into(),
            Self::Community(ListScope::All) => "/community".into(),
            Self::Community(ListScope::Mine) => "/community/mine".into(),
            Self::Advertisements(ListScope::All) => "/advertisements".into(),
            Self::Advertisements(ListScope::Mine) => "/advertisements/mine".into(),
            Self::AdvertisementEditor(None) => "/advertisements/new".into(),
            Self::AdvertisementEditor(Some(id)) => format!("/advertisements/{}/edit", id),
            Self::Profile => "/profile".into(),
            Self::AdminProfile => "/admin/profile".into(),
            Self::NotFound => "/404".into(),
        }
    }

    /// **核心守卫逻辑：定义该路由的访问规则**
    pub fn access(&self) -> Access {
        match self {
            Self::Home | Self::OAuthRedirect | Self::NotFound => Access::Public,
            Self::UserLogin
            | Self::AdminLogin
            | Self::UserRegister
            | Self::AdminRegister
            | Self::ForgotPassword => Access::Guest,
            Self::Dashboard | Self::Quiz(_) | Self::Posts(_) | Self::Profile => {
                Access::Roles(USER_ONLY)
            }
            Self::AdminDashboard | Self::TutorialEditor(_) | Self::AdminProfile => {
                Access::Roles(ADMIN_ONLY)
            }
            Self::Tutorials
            | Self::Community(_)
            | Self::Advertisements(_)
            | Self::AdvertisementEditor(_) => Access::Roles(SIGNED_IN),
        }
    }

    /// 角色的首页：登录成功、访客页被已登录用户访问时跳转于此
    pub fn home_for(role: Role) -> Self {
        match role {
            Role::User => Self::Dashboard,
            Role::Admin => Self::AdminDashboard,
        }
    }

    /// 角色对应的登录页
    pub fn login_for(role: Role) -> Self {
        match role {
            Role::User => Self::UserLogin,
            Role::Admin => Self::AdminLogin,
        }
    }

    /// 当前角色对应的个人资料页
    pub fn profile_for(role: Role) -> Self {
        match role {
            Role::User => Self::Profile,
            Role::Admin => Self::AdminProfile,
        }
    }
}

/// 守卫决策：只依赖路由与当前角色
///
/// - 未登录访问受保护页：跳转到对应登录页（仅限管理员的页面跳管理员登录）
/// - 已登录但角色不符：跳回首页
/// - 已登录访问访客页：跳转到角色首页
pub fn guard(route: &AppRoute, role: Option<Role>) -> GuardDecision {
    match (route.access(), role) {
        (Access::Public, _) => GuardDecision::Allow,
        (Access::Guest, None) => GuardDecision::Allow,
        (Access::Guest, Some(role)) => GuardDecision::Redirect(AppRoute::home_for(role)),
        (Access::Roles(allowed), None) => {
            let login = if allowed == ADMIN_ONLY {
                AppRoute::AdminLogin
            } else {
                AppRoute::UserLogin
            };
            GuardDecision::Redirect(login)
        }
        (Access::Roles(allowed), Some(role)) if allowed.contains(&role) => GuardDecision::Allow,
        (Access::Roles(_), Some(_)) => GuardDecision::Redirect(AppRoute::Home),
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases_and_ids() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Home);
        assert_eq!(AppRoute::from_path("/login"), AppRoute::UserLogin);
        assert_eq!(AppRoute::from_path("/register/"), AppRoute::UserRegister);
        assert_eq!(AppRoute::from_path("/quiz/42"), AppRoute::Quiz(42));
        assert_eq!(
            AppRoute::from_path("/tutorials/7/edit"),
            AppRoute::TutorialEditor(Some(7))
        );
        assert_eq!(AppRoute::from_path("/quiz/abc"), AppRoute::NotFound);
        assert_eq!(
            AppRoute::from_path("/oauth2/redirect?token=t&role=USER"),
            AppRoute::OAuthRedirect
        );
        assert_eq!(AppRoute::from_path("/nowhere"), AppRoute::NotFound);
    }

    #[test]
    fn canonical_paths_parse_back() {
        let routes = [
            AppRoute::Home,
            AppRoute::AdminLogin,
            AppRoute::Dashboard,
            AppRoute::TutorialEditor(None),
            AppRoute::TutorialEditor(Some(3)),
            AppRoute::Quiz(9),
            AppRoute::Posts(ListScope::Mine),
            AppRoute::Community(ListScope::All),
            AppRoute::Advertisements(ListScope::Mine),
            AppRoute::AdvertisementEditor(Some(5)),
            AppRoute::AdminProfile,
        ];
        for route in routes {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn anonymous_visitors_go_to_the_matching_login() {
        assert_eq!(
            guard(&AppRoute::AdminDashboard, None),
            GuardDecision::Redirect(AppRoute::AdminLogin)
        );
        assert_eq!(
            guard(&AppRoute::Dashboard, None),
            GuardDecision::Redirect(AppRoute::UserLogin)
        );
        assert_eq!(
            guard(&AppRoute::Tutorials, None),
            GuardDecision::Redirect(AppRoute::UserLogin)
        );
        assert_eq!(guard(&AppRoute::Home, None), GuardDecision::Allow);
        assert_eq!(guard(&AppRoute::UserLogin, None), GuardDecision::Allow);
    }

    #[test]
    fn wrong_role_goes_home() {
        assert_eq!(
            guard(&AppRoute::AdminDashboard, Some(Role::User)),
            GuardDecision::Redirect(AppRoute::Home)
        );
        assert_eq!(
            guard(&AppRoute::Quiz(1), Some(Role::Admin)),
            GuardDecision::Redirect(AppRoute::Home)
        );
        assert_eq!(
            guard(&AppRoute::Community(ListScope::All), Some(Role::Admin)),
            GuardDecision::Allow
        );
    }

    #[test]
    fn signed_in_users_skip_guest_pages() {
        assert_eq!(
            guard(&AppRoute::UserLogin, Some(Role::User)),
            GuardDecision::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(
            guard(&AppRoute::AdminRegister, Some(Role::Admin)),
            GuardDecision::Redirect(AppRoute::AdminDashboard)
        );
    }

    #[test]
    fn protected_routes_allow_exactly_their_roles() {
        let routes = [
            AppRoute::Dashboard,
            AppRoute::AdminDashboard,
            AppRoute::Tutorials,
            AppRoute::TutorialEditor(None),
            AppRoute::Quiz(1),
            AppRoute::Posts(ListScope::All),
            AppRoute::Community(ListScope::Mine),
            AppRoute::Advertisements(ListScope::All),
            AppRoute::AdvertisementEditor(Some(2)),
            AppRoute::Profile,
            AppRoute::AdminProfile,
        ];
        for route in routes {
            let Access::Roles(allowed) = route.access() else {
                panic!("{route} should be role-gated");
            };
            for role in [Role::User, Role::Admin] {
                let allowed_here = guard(&route, Some(role)) == GuardDecision::Allow;
                assert_eq!(allowed_here, allowed.contains(&role), "{route} as {role:?}");
            }
            assert!(matches!(
                guard(&route, None),
                GuardDecision::Redirect(AppRoute::UserLogin | AppRoute::AdminLogin)
            ));
        }
    }
}
