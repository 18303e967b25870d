use crate::auth::use_auth;
use crate::components::common::{FormError, bind_input};
use crate::notify::use_notifier;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;
use technest_shared::PasswordResetRequest;
use technest_shared::validation::{PasswordResetForm, validate_email};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResetStep {
    RequestOtp,
    Confirm,
}

#[component]
pub fn ForgotPasswordPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let notifier = use_notifier();

    let form = RwSignal::new(PasswordResetForm::default());
    let step = RwSignal::new(ResetStep::RequestOtp);
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_request_otp = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let email = match form.with_untracked(|f| validate_email(&f.email)) {
            Ok(email) => email,
            Err(e) => {
                set_error_msg.set(Some(e.to_string()));
                return;
            }
        };
        set_error_msg.set(None);
        set_is_submitting.set(true);

        let api = auth.api();
        spawn_local(async move {
            match api.send(&PasswordResetRequest { email }).await {
                Ok(()) => {
                    notifier.success("OTP sent to your email");
                    step.set(ResetStep::Confirm);
                }
                Err(e) => {
                    log_warn!("[Reset] OTP request failed: {}", e);
                    set_error_msg.set(Some("Failed to send OTP".to_string()));
                }
            }
            set_is_submitting.set(false);
        });
    };

    let on_confirm = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let request = match form.with_untracked(PasswordResetForm::validate) {
            Ok(request) => request,
            Err(e) => {
                set_error_msg.set(Some(e.to_string()));
                return;
            }
        };
        set_error_msg.set(None);
        set_is_submitting.set(true);

        let api = auth.api();
        spawn_local(async move {
            match api.send(&request).await {
                Ok(()) => {
                    notifier.success("Password reset successfully");
                    router.navigate_to(AppRoute::UserLogin);
                }
                Err(e) => {
                    log_warn!("[Reset] confirm failed: {}", e);
                    set_error_msg.set(Some("Failed to reset password".to_string()));
                }
            }
            set_is_submitting.set(false);
        });
    };

    let submit_label = move |idle: &'static str| {
        if is_submitting.get() { "Please wait..." } else { idle }
    };

    view! {
        <div class="hero min-h-[70vh]">
            <div class="hero-content flex-col w-full max-w-md">
                <h1 class="text-3xl font-bold">"Forgot Password"</h1>
                <div class="card w-full shadow-2xl bg-base-100">
                    {move || match step.get() {
                        ResetStep::RequestOtp => view! {
                            <form class="card-body" on:submit=on_request_otp>
                                <FormError message=error_msg />
                                {bind_input!(form, email, "Email", "email")}
                                <button class="btn btn-primary mt-4" disabled=move || is_submitting.get()>
                                    {move || submit_label("Request OTP")}
                                </button>
                            </form>
                        }
                        .into_any(),
                        ResetStep::Confirm => view! {
                            <form class="card-body" on:submit=on_confirm>
                                <FormError message=error_msg />
                                <p class="text-sm text-base-content/70">
                                    "Enter the code sent to " {move || form.with(|f| f.email.clone())}
                                </p>
                                {bind_input!(form, otp, "OTP", "text")}
                                {bind_input!(form, new_password, "New Password", "password")}
                                {bind_input!(form, confirm_password, "Confirm Password", "password")}
                                <button class="btn btn-primary mt-4" disabled=move || is_submitting.get()>
                                    {move || submit_label("Reset Password")}
                                </button>
                                <button
                                    type="button"
                                    class="btn btn-ghost btn-sm"
                                    on:click=move |_| step.set(ResetStep::RequestOtp)
                                >
                                    "Resend code"
                                </button>
                            </form>
                        }
                        .into_any(),
                    }}
                    <div class="text-center pb-6">
                        <Link to=AppRoute::UserLogin class="link link-primary text-sm">
                            "Back to Login"
                        </Link>
                    </div>
                </div>
            </div>
        </div>
    }
}
