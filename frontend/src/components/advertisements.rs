use crate::auth::use_auth;
use crate::components::common::{
    EmptyState, FormError, LoadGuard, bind_input, bind_textarea, confirm, use_cancel_token,
};
use crate::notify::use_notifier;
use crate::resource::{ListState, LoadState};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;
use technest_shared::protocol::{DeleteAdvertisement, ListAdvertisements, UpdateAdvertisement};
use technest_shared::validation::AdvertisementForm;
use technest_shared::{AdCategory, Advertisement, ListScope, Owned};

fn form_from(ad: &Advertisement) -> AdvertisementForm {
    AdvertisementForm {
        title: ad.title.clone(),
        description: ad.description.clone(),
        category: ad.category.as_str().to_string(),
        reference_name: ad.reference_name.clone(),
        link: ad.link.clone(),
    }
}

fn category_badge(category: AdCategory) -> &'static str {
    match category {
        AdCategory::University => "badge badge-primary",
        AdCategory::LearningPlatform => "badge badge-secondary",
        AdCategory::Youtube => "badge badge-error",
    }
}

#[component]
pub fn AdvertisementsPage(scope: ListScope) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let notifier = use_notifier();
    let cancel = use_cancel_token();

    let ads = RwSignal::new(ListState::<Advertisement>::default());
    let load_state = RwSignal::new(LoadState::Loading);

    let load = Callback::new(move |()| {
        let api = auth.api();
        let cancel = cancel.clone();
        spawn_local(async move {
            match api.send_with(&ListAdvertisements { scope }, &cancel).await {
                Ok(list) => {
                    log_info!("[Ads] loaded {} advertisements", list.len());
                    ads.update(|a| a.replace_all(list));
                    load_state.set(LoadState::Ready);
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    if load_state.get_untracked().is_loading() {
                        load_state.set(LoadState::Failed("Failed to load advertisements".into()));
                    }
                    notifier.api_error("advertisements", &e);
                }
            }
        });
    });
    load.run(());

    let on_delete = move |id: i64| {
        if !confirm("Delete this advertisement?") {
            return;
        }
        ads.update(|a| {
            a.remove(id);
        });
        let api = auth.api();
        spawn_local(async move {
            match api.send(&DeleteAdvertisement { id }).await {
                Ok(()) => notifier.success("Advertisement deleted"),
                Err(e) => {
                    notifier.api_error("delete advertisement", &e);
                    load.run(());
                }
            }
        });
    };

    let title = match scope {
        ListScope::All => "Advertisements",
        ListScope::Mine => "My Advertisements",
    };

    view! {
        <div class="max-w-6xl mx-auto p-4 md:p-8 space-y-6">
            <div class="flex justify-between items-center">
                <h1 class="text-3xl font-bold">{title}</h1>
                <Link to=AppRoute::AdvertisementEditor(None) class="btn btn-primary btn-sm">
                    "New Advertisement"
                </Link>
            </div>

            <LoadGuard state=load_state on_retry=load>
                <Show
                    when=move || ads.with(|a| !a.is_empty())
                    fallback=|| view! { <EmptyState message="No advertisements yet." /> }
                >
                    <div class="grid gap-6 md:grid-cols-2 lg:grid-cols-3">
                        <For
                            each=move || ads.with(|a| a.items().to_vec())
                            key=|ad| ad.id
                            children=move |ad| {
                                let id = ad.id;
                                let can_modify = {
                                    let ad = ad.clone();
                                    move || auth.viewer().is_some_and(|v| ad.can_modify(&v))
                                };
                                view! {
                                    <div class="card bg-base-100 shadow-xl">
                                        <div class="card-body">
                                            <div class="flex justify-between items-start gap-2">
                                                <h2 class="card-title">{ad.title.clone()}</h2>
                                                <span class=category_badge(ad.category)>{ad.category.label()}</span>
                                            </div>
                                            <p class="whitespace-pre-line">{ad.description.clone()}</p>
                                            <p class="text-sm text-base-content/60">{ad.reference_name.clone()}</p>
                                            <div class="card-actions justify-between items-center mt-2">
                                                <a
                                                    class="link link-primary text-sm"
                                                    href=ad.link.clone()
                                                    target="_blank"
                                                    rel="noopener noreferrer"
                                                >
                                                    "Visit"
                                                </a>
                                                <Show when=can_modify.clone()>
                                                    <div class="flex gap-1">
                                                        <button
                                                            class="btn btn-ghost btn-xs"
                                                            on:click=move |_| router.navigate_to(AppRoute::AdvertisementEditor(Some(id)))
                                                        >
                                                            "Edit"
                                                        </button>
                                                        <button
                                                            class="btn btn-ghost btn-xs text-error"
                                                            on:click=move |_| on_delete(id)
                                                        >
                                                            "Delete"
                                                        </button>
                                                    </div>
                                                </Show>
                                            </div>
                                        </div>
                                    </div>
                                }
                            }
                        />
                    </div>
                </Show>
            </LoadGuard>
        </div>
    }
}

/// 新建或编辑广告；后端没有单条查询接口，编辑时从全量列表中按 id 查找
#[component]
pub fn AdvertisementEditorPage(id: Option<i64>) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let notifier = use_notifier();
    let cancel = use_cancel_token();

    let form = RwSignal::new(AdvertisementForm::default());
    let load_state = RwSignal::new(if id.is_some() {
        LoadState::Loading
    } else {
        LoadState::Ready
    });
    let saving = RwSignal::new(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let load = Callback::new(move |()| {
        let Some(id) = id else {
            return;
        };
        let api = auth.api();
        let cancel = cancel.clone();
        load_state.set(LoadState::Loading);
        spawn_local(async move {
            let request = ListAdvertisements {
                scope: ListScope::All,
            };
            match api.send_with(&request, &cancel).await {
                Ok(list) => match list.iter().find(|ad| ad.id == id) {
                    Some(ad) => {
                        form.set(form_from(ad));
                        load_state.set(LoadState::Ready);
                    }
                    None => load_state.set(LoadState::Failed("Advertisement not found".into())),
                },
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    load_state.set(LoadState::Failed("Failed to load advertisement".into()));
                    notifier.api_error("advertisement", &e);
                }
            }
        });
    });
    load.run(());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let body = match form.with_untracked(AdvertisementForm::validate) {
            Ok(body) => body,
            Err(e) => {
                set_error_msg.set(Some(e.to_string()));
                return;
            }
        };
        set_error_msg.set(None);
        saving.set(true);

        let api = auth.api();
        spawn_local(async move {
            let result = match id {
                Some(id) => api.send(&UpdateAdvertisement { id, body }).await,
                None => api.send(&body).await,
            };
            saving.set(false);
            match result {
                Ok(saved) => {
                    log_info!("[Ads] saved advertisement {}", saved.id);
                    notifier.success(if id.is_some() {
                        "Advertisement updated"
                    } else {
                        "Advertisement created"
                    });
                    router.navigate_to(AppRoute::Advertisements(ListScope::Mine));
                }
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
        });
    };

    let heading = if id.is_some() {
        "Edit Advertisement"
    } else {
        "New Advertisement"
    };

    view! {
        <div class="max-w-2xl mx-auto p-4 md:p-8">
            <LoadGuard state=load_state on_retry=load>
                <form class="card bg-base-100 shadow-xl" on:submit=on_submit>
                    <div class="card-body space-y-2">
                        <h1 class="card-title text-2xl">{heading}</h1>
                        <FormError message=error_msg />
                        {bind_input!(form, title, "Title", "text")}
                        {bind_textarea!(form, description, "Description")}
                        <div class="form-control">
                            <label class="label">
                                <span class="label-text">"Category"</span>
                            </label>
                            <select
                                class="select select-bordered"
                                prop:value=move || form.with(|f| f.category.clone())
                                on:change=move |ev| {
                                    let value = event_target_value(&ev);
                                    form.update(|f| f.category = value);
                                }
                            >
                                <option value="">"Select a category"</option>
                                {AdCategory::ALL
                                    .into_iter()
                                    .map(|c| view! { <option value=c.as_str()>{c.label()}</option> })
                                    .collect_view()}
                            </select>
                        </div>
                        {bind_input!(form, reference_name, "Reference name", "text")}
                        {bind_input!(form, link, "Link (optional)", "url")}
                        <div class="card-actions justify-end mt-4">
                            <button
                                type="button"
                                class="btn btn-ghost"
                                on:click=move |_| router.navigate_to(AppRoute::Advertisements(ListScope::Mine))
                            >
                                "Cancel"
                            </button>
                            <button class="btn btn-primary" disabled=move || saving.get()>
                                {move || if saving.get() { "Saving..." } else { "Save" }}
                            </button>
                        </div>
                    </div>
                </form>
            </LoadGuard>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_an_ad_round_trips_through_the_form() {
        let ad = Advertisement {
            id: 4,
            title: "Rust in Action".into(),
            description: "Hands-on systems programming".into(),
            category: AdCategory::LearningPlatform,
            reference_name: "Manning".into(),
            link: "https://manning.com".into(),
            created_by: Some("ada@technest.dev".into()),
        };
        let form = form_from(&ad);
        assert_eq!(form.category, "LEARNING_PLATFORM");
        let request = form.validate().unwrap();
        assert_eq!(request, technest_shared::AdvertisementRequest::from(&ad));
    }
}
