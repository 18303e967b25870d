use crate::auth::use_auth;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = use_auth();
    let role = auth.role_signal();

    view! {
        <div class="hero min-h-[70vh]">
            <div class="hero-content text-center">
                <div class="max-w-2xl">
                    <h1 class="text-5xl font-bold">"Welcome to TechNest"</h1>
                    <p class="py-6 text-base-content/70">
                        "Learn with hands-on tutorials, test yourself with quizzes, "
                        "ask the community and share what you build."
                    </p>
                    {move || match role.get() {
                        Some(role) => view! {
                            <Link to=AppRoute::home_for(role) class="btn btn-primary">
                                "Go to your dashboard"
                            </Link>
                        }
                        .into_any(),
                        None => view! {
                            <div class="flex gap-4 justify-center">
                                <Link to=AppRoute::UserRegister class="btn btn-primary">
                                    "Get started"
                                </Link>
                                <Link to=AppRoute::UserLogin class="btn btn-outline">
                                    "Login"
                                </Link>
                            </div>
                        }
                        .into_any(),
                    }}
                </div>
            </div>
        </div>
    }
}
