use crate::api::TechNestApi;
use crate::auth::use_auth;
use crate::components::common::{FormError, bind_input};
use crate::error::ApiResult;
use crate::notify::use_notifier;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;
use chrono::NaiveDate;
use technest_shared::validation::{
    AdminRegistrationForm, PasswordStrength, UserRegistrationForm, ValidationError,
};
use technest_shared::{RegisterAdminRequest, RegisterUserRequest, Role};

/// 按注册角色校验后的请求
#[derive(Debug, Clone, PartialEq)]
enum Registration {
    User(RegisterUserRequest),
    Admin(RegisterAdminRequest),
}

impl Registration {
    fn validate(
        role: Role,
        user: &UserRegistrationForm,
        admin: &AdminRegistrationForm,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        match role {
            Role::User => user.validate(today).map(Self::User),
            Role::Admin => admin.validate().map(Self::Admin),
        }
    }

    async fn submit(&self, api: &TechNestApi) -> ApiResult<()> {
        match self {
            Self::User(req) => api.send(req).await,
            Self::Admin(req) => api.send(req).await,
        }
    }
}

#[component]
fn StrengthMeter(#[prop(into)] password: Signal<String>) -> impl IntoView {
    let strength = move || PasswordStrength::of(&password.get());
    let class = move || match strength() {
        PasswordStrength::Weak => "progress progress-error w-full",
        PasswordStrength::Moderate => "progress progress-warning w-full",
        PasswordStrength::Strong => "progress progress-info w-full",
        PasswordStrength::VeryStrong => "progress progress-success w-full",
    };
    let value = move || match strength() {
        PasswordStrength::Weak => "25",
        PasswordStrength::Moderate => "50",
        PasswordStrength::Strong => "75",
        PasswordStrength::VeryStrong => "100",
    };

    view! {
        <Show when=move || password.with(|p| !p.is_empty())>
            <progress class=class value=value max="100"></progress>
            <span class="text-xs">"Strength: " {move || strength().label()}</span>
        </Show>
    }
}

#[component]
pub fn RegisterPage(role: Role) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let notifier = use_notifier();

    let user_form = RwSignal::new(UserRegistrationForm::default());
    let admin_form = RwSignal::new(AdminRegistrationForm::default());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_error_msg.set(None);

        let api = auth.api();
        let today = chrono::Local::now().date_naive();
        let request = user_form.with_untracked(|user| {
            admin_form.with_untracked(|admin| Registration::validate(role, user, admin, today))
        });
        let registration = match request {
            Ok(registration) => registration,
            Err(e) => {
                set_error_msg.set(Some(e.to_string()));
                return;
            }
        };

        set_is_submitting.set(true);
        spawn_local(async move {
            match registration.submit(&api).await {
                Ok(()) => {
                    notifier.success("Registration successful. Please log in.");
                    router.navigate_to(AppRoute::login_for(role));
                }
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
            set_is_submitting.set(false);
        });
    };

    let password = Signal::derive(move || match role {
        Role::User => user_form.with(|f| f.password.clone()),
        Role::Admin => admin_form.with(|f| f.password.clone()),
    });

    let fields = match role {
        Role::User => view! {
            <div class="grid grid-cols-1 md:grid-cols-2 gap-x-4">
                {bind_input!(user_form, first_name, "First Name", "text")}
                {bind_input!(user_form, last_name, "Last Name", "text")}
            </div>
            {bind_input!(user_form, mobile, "Mobile", "tel")}
            {bind_input!(user_form, birthday, "Birthday", "date")}
            {bind_input!(user_form, email, "Email", "email")}
            {bind_input!(user_form, password, "Password", "password")}
            {bind_input!(user_form, confirm_password, "Confirm Password", "password")}
        }
        .into_any(),
        Role::Admin => view! {
            {bind_input!(admin_form, full_name, "Full Name", "text")}
            {bind_input!(admin_form, email, "Email", "email")}
            {bind_input!(admin_form, password, "Password", "password")}
            {bind_input!(admin_form, confirm_password, "Confirm Password", "password")}
        }
        .into_any(),
    };

    let title = match role {
        Role::User => "Create your account",
        Role::Admin => "Register an administrator",
    };

    view! {
        <div class="hero min-h-[70vh]">
            <div class="hero-content flex-col w-full max-w-lg">
                <h1 class="text-3xl font-bold">{title}</h1>
                <div class="card w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <FormError message=error_msg />
                        {fields}
                        <StrengthMeter password=password />
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() { "Registering..." } else { "Register" }}
                            </button>
                        </div>
                        <p class="text-sm text-center mt-4">
                            "Already have an account? "
                            <Link to=AppRoute::login_for(role) class="link link-primary">"Login"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn admin_form() -> AdminRegistrationForm {
        AdminRegistrationForm {
            email: "grace@technest.dev".into(),
            password: "hopper1906".into(),
            confirm_password: "hopper1906".into(),
            full_name: "Grace Hopper".into(),
        }
    }

    #[test]
    fn admin_registration_ignores_the_user_form() {
        let registration =
            Registration::validate(Role::Admin, &UserRegistrationForm::default(), &admin_form(), today())
                .unwrap();
        let Registration::Admin(req) = registration else {
            panic!("expected an admin registration");
        };
        assert_eq!(req.full_name, "Grace Hopper");
    }

    #[test]
    fn user_registration_validates_the_user_form() {
        let err = Registration::validate(Role::User, &UserRegistrationForm::default(), &admin_form(), today())
            .unwrap_err();
        assert_eq!(err, ValidationError::LettersOnly("First Name"));
    }
}
