use crate::auth::use_auth;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use technest_shared::{ListScope, Role};

/// 每个角色的导航项
fn links_for(role: Option<Role>) -> Vec<(AppRoute, &'static str)> {
    match role {
        None => vec![
            (AppRoute::Home, "Home"),
            (AppRoute::UserLogin, "Login"),
            (AppRoute::UserRegister, "Register"),
            (AppRoute::AdminLogin, "Admin"),
        ],
        Some(Role::User) => vec![
            (AppRoute::Dashboard, "Dashboard"),
            (AppRoute::Tutorials, "Tutorials"),
            (AppRoute::Posts(ListScope::All), "Feed"),
            (AppRoute::Posts(ListScope::Mine), "My Posts"),
            (AppRoute::Community(ListScope::All), "Community"),
            (AppRoute::Advertisements(ListScope::All), "Advertisements"),
        ],
        Some(Role::Admin) => vec![
            (AppRoute::AdminDashboard, "Dashboard"),
            (AppRoute::Tutorials, "Tutorials"),
            (AppRoute::Community(ListScope::All), "Community"),
            (AppRoute::Advertisements(ListScope::All), "Advertisements"),
        ],
    }
}

#[component]
pub fn Navbar() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let session = auth.session();

    let on_logout = move |_| {
        auth.logout();
        router.navigate_to(AppRoute::Home);
    };

    let avatar = move || {
        session.with(|s| {
            s.as_ref()
                .and_then(|s| s.email.chars().next())
                .map(|c| c.to_ascii_uppercase().to_string())
                .unwrap_or_default()
        })
    };

    view! {
        <div class="navbar bg-base-100 shadow-md px-4">
            <div class="flex-1">
                <Link to=AppRoute::Home class="btn btn-ghost text-xl font-bold text-primary">
                    "TechNest"
                </Link>
            </div>
            <div class="flex-none gap-1 hidden md:flex">
                {move || {
                    links_for(auth.role_signal().get())
                        .into_iter()
                        .map(|(route, label)| {
                            view! {
                                <Link to=route class="btn btn-ghost btn-sm">
                                    {label}
                                </Link>
                            }
                        })
                        .collect_view()
                }}
            </div>
            <Show when=move || session.with(Option::is_some)>
                <div class="dropdown dropdown-end ml-2">
                    <div tabindex="0" role="button" class="btn btn-ghost btn-circle avatar placeholder">
                        <div class="bg-primary text-primary-content rounded-full w-10">
                            <span>{avatar}</span>
                        </div>
                    </div>
                    <ul tabindex="0" class="menu menu-sm dropdown-content bg-base-100 rounded-box z-10 mt-3 w-52 p-2 shadow">
                        <li class="menu-title">
                            {move || session.with(|s| s.as_ref().map(|s| s.email.clone()))}
                        </li>
                        <li>
                            {move || {
                                auth.role_signal()
                                    .get()
                                    .map(|role| {
                                        view! {
                                            <Link to=AppRoute::profile_for(role)>"Profile"</Link>
                                        }
                                    })
                            }}
                        </li>
                        <li>
                            <a on:click=on_logout>"Logout"</a>
                        </li>
                    </ul>
                </div>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::route::{GuardDecision, guard};

    #[test]
    fn every_link_is_reachable_for_its_role() {
        for role in [None, Some(Role::User), Some(Role::Admin)] {
            for (route, label) in links_for(role) {
                assert_eq!(
                    guard(&route, role),
                    GuardDecision::Allow,
                    "{} should be open to {:?}",
                    label,
                    role
                );
            }
        }
    }
}
