use crate::auth::use_auth;
use crate::components::common::{FormError, LoadGuard, bind_input, confirm, use_cancel_token};
use crate::notify::use_notifier;
use crate::resource::LoadState;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use technest_shared::protocol::{DeleteProfile, GetProfile};
use technest_shared::validation::ProfileForm;
use technest_shared::{Role, UserProfile};

fn or_dash(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("-")
        .to_string()
}

/// 按角色列出资料字段
fn profile_rows(profile: &UserProfile, role: Role) -> Vec<(&'static str, String)> {
    let mut rows = vec![("Email", profile.email.clone())];
    match role {
        Role::Admin => rows.push(("Full name", or_dash(&profile.full_name))),
        Role::User => {
            rows.push(("First name", or_dash(&profile.first_name)));
            rows.push(("Last name", or_dash(&profile.last_name)));
            rows.push(("Mobile", or_dash(&profile.mobile)));
            rows.push(("Birthday", or_dash(&profile.birthday)));
        }
    }
    rows
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let notifier = use_notifier();
    let cancel = use_cancel_token();

    let profile = RwSignal::new(Option::<UserProfile>::None);
    let form = RwSignal::new(ProfileForm::default());
    let editing = RwSignal::new(false);
    let saving = RwSignal::new(false);
    let load_state = RwSignal::new(LoadState::Loading);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let role = move || auth.role().unwrap_or(Role::User);

    let load = Callback::new(move |()| {
        let api = auth.api();
        let cancel = cancel.clone();
        load_state.set(LoadState::Loading);
        spawn_local(async move {
            match api.send_with(&GetProfile, &cancel).await {
                Ok(loaded) => {
                    form.set(ProfileForm::from(&loaded));
                    profile.set(Some(loaded));
                    load_state.set(LoadState::Ready);
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    load_state.set(LoadState::Failed("Failed to load profile".into()));
                    notifier.api_error("profile", &e);
                }
            }
        });
    });
    load.run(());

    let on_save = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let today = chrono::Local::now().date_naive();
        let update = match form.with_untracked(|f| f.validate(role(), today)) {
            Ok(update) => update,
            Err(e) => {
                set_error_msg.set(Some(e.to_string()));
                return;
            }
        };
        if !confirm("Save changes to your profile?") {
            return;
        }
        set_error_msg.set(None);
        saving.set(true);

        let api = auth.api();
        spawn_local(async move {
            let result = api.send(&update).await;
            saving.set(false);
            match result {
                Ok(saved) => {
                    form.set(ProfileForm::from(&saved));
                    profile.set(Some(saved));
                    editing.set(false);
                    notifier.success("Profile updated");
                }
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
        });
    };

    let on_cancel = move |_| {
        if let Some(p) = profile.get_untracked() {
            form.set(ProfileForm::from(&p));
        }
        set_error_msg.set(None);
        editing.set(false);
    };

    let on_delete = move |_| {
        if !confirm("Delete your account? This cannot be undone.") {
            return;
        }
        let api = auth.api();
        spawn_local(async move {
            match api.send(&DeleteProfile).await {
                Ok(()) => {
                    log_info!("[Profile] account deleted");
                    auth.logout();
                    notifier.success("Account deleted");
                    router.navigate_to(AppRoute::Home);
                }
                Err(e) => notifier.api_error("delete account", &e),
            }
        });
    };

    view! {
        <div class="max-w-2xl mx-auto p-4 md:p-8">
            <LoadGuard state=load_state on_retry=load>
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h1 class="card-title text-2xl">"Profile"</h1>
                        <Show
                            when=move || editing.get()
                            fallback=move || {
                                let rows = profile
                                    .with(|p| p.as_ref().map(|p| profile_rows(p, role())))
                                    .unwrap_or_default();
                                view! {
                                    <dl class="grid grid-cols-3 gap-y-2">
                                        {rows
                                            .into_iter()
                                            .map(|(label, value)| view! {
                                                <dt class="font-semibold">{label}</dt>
                                                <dd class="col-span-2">{value}</dd>
                                            })
                                            .collect_view()}
                                    </dl>
                                    <div class="card-actions justify-between mt-4">
                                        <button class="btn btn-error btn-outline" on:click=on_delete>
                                            "Delete account"
                                        </button>
                                        <button class="btn btn-primary" on:click=move |_| editing.set(true)>
                                            "Edit"
                                        </button>
                                    </div>
                                }
                            }
                        >
                            <form class="space-y-2" on:submit=on_save>
                                <FormError message=error_msg />
                                {move || match role() {
                                    Role::Admin => bind_input!(form, full_name, "Full name", "text").into_any(),
                                    Role::User => view! {
                                        {bind_input!(form, first_name, "First name", "text")}
                                        {bind_input!(form, last_name, "Last name", "text")}
                                        {bind_input!(form, mobile, "Mobile", "tel")}
                                        {bind_input!(form, birthday, "Birthday", "date")}
                                    }
                                    .into_any(),
                                }}
                                <div class="card-actions justify-end mt-4">
                                    <button type="button" class="btn btn-ghost" on:click=on_cancel>
                                        "Cancel"
                                    </button>
                                    <button class="btn btn-primary" disabled=move || saving.get()>
                                        {move || if saving.get() { "Saving..." } else { "Save" }}
                                    </button>
                                </div>
                            </form>
                        </Show>
                    </div>
                </div>
            </LoadGuard>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: Some(1),
            email: "ada@technest.dev".into(),
            role: Some(Role::User),
            first_name: Some("Ada".into()),
            last_name: None,
            mobile: Some(" ".into()),
            birthday: None,
            full_name: Some("Ada Lovelace".into()),
        }
    }

    #[test]
    fn user_rows_hide_full_name_and_dash_blanks() {
        let rows = profile_rows(&profile(), Role::User);
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|(label, _)| *label != "Full name"));
        assert_eq!(rows[2], ("Last name", "-".to_string()));
        assert_eq!(rows[3], ("Mobile", "-".to_string()));
    }

    #[test]
    fn admin_rows_show_full_name_only() {
        let rows = profile_rows(&profile(), Role::Admin);
        assert_eq!(rows, vec![
            ("Email", "ada@technest.dev".to_string()),
            ("Full name", "Ada Lovelace".to_string()),
        ]);
    }
}
