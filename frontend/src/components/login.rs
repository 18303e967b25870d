use crate::auth::{self, AuthError, use_auth};
use crate::components::common::FormError;
use crate::config;
use crate::notify::use_notifier;
use crate::oauth::render_google_button;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::html::Div;
use leptos::prelude::*;
use leptos::task::spawn_local;
use technest_shared::Role;

/// Google 登录按钮；未配置 Client ID 或脚本未加载时不显示
#[component]
fn GoogleLoginButton() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let notifier = use_notifier();
    let container = NodeRef::<Div>::new();

    Effect::new(move |_| {
        let (Some(client_id), Some(div)) = (config::google_client_id(), container.get()) else {
            return;
        };
        let element: web_sys::Element = div.into();
        let rendered = render_google_button(client_id, &element, move |credential| {
            spawn_local(async move {
                match auth::login_with_google(&auth, &credential).await {
                    Ok(role) => {
                        notifier.success("Logged in with Google");
                        router.navigate_to(AppRoute::home_for(role));
                    }
                    Err(AuthError::Api(e)) => notifier.api_error("google login", &e),
                    Err(e) => notifier.error(e.to_string()),
                }
            });
        });
        if let Err(e) = rendered {
            log_warn!("[Login] Google sign-in unavailable: {}", e);
        }
    });

    view! {
        <Show when=|| config::google_client_id().is_some()>
            <div class="divider">"OR"</div>
            <div class="flex justify-center" node_ref=container></div>
        </Show>
    }
}

#[component]
pub fn LoginPage(role: Role) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let notifier = use_notifier();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if email.get().trim().is_empty() || password.get().is_empty() {
            set_error_msg.set(Some("Please fill in all fields".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        spawn_local(async move {
            match auth::login(&auth, &email.get_untracked(), &password.get_untracked(), Some(role))
                .await
            {
                Ok(role) => {
                    notifier.success("Login successful");
                    router.navigate_to(AppRoute::home_for(role));
                }
                Err(e) => set_error_msg.set(Some(e.to_string())),
            }
            set_is_submitting.set(false);
        });
    };

    let (title, register_route) = match role {
        Role::User => ("User Login", AppRoute::UserRegister),
        Role::Admin => ("Admin Login", AppRoute::AdminRegister),
    };

    view! {
        <div class="hero min-h-[70vh]">
            <div class="hero-content flex-col w-full max-w-md">
                <h1 class="text-3xl font-bold">{title}</h1>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <FormError message=error_msg />

                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                            <label class="label">
                                <Link to=AppRoute::ForgotPassword class="label-text-alt link link-hover">
                                    "Forgot password?"
                                </Link>
                            </label>
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Logging in..." }.into_any()
                                } else {
                                    "Login".into_any()
                                }}
                            </button>
                        </div>

                        {(role == Role::User).then(|| view! { <GoogleLoginButton /> })}

                        <p class="text-sm text-center mt-4">
                            "Don't have an account? "
                            <Link to=register_route class="link link-primary">"Register"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
