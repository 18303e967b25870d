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
use std::collections::HashSet;
use technest_shared::protocol::{
    CreateMcq, DeleteMcq, DeleteTutorial, EnrollTutorial, GetTutorial, ListProgress,
    ListTutorials, UpdateMcq, UpdateTutorial,
};
use technest_shared::validation::{McqForm, TutorialForm};
use technest_shared::{Mcq, Role, Tutorial};

// =========================================================
// 教程列表
// =========================================================

#[component]
pub fn TutorialsPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let notifier = use_notifier();
    let cancel = use_cancel_token();

    let role = auth.role().unwrap_or(Role::User);
    let tutorials = RwSignal::new(ListState::<Tutorial>::default());
    let enrolled = RwSignal::new(HashSet::<i64>::new());
    let load_state = RwSignal::new(LoadState::Loading);

    let load = Callback::new(move |()| {
        let api = auth.api();
        let cancel = cancel.clone();
        load_state.set(LoadState::Loading);
        spawn_local(async move {
            let request = ListTutorials { role };
            let list = api.send_with(&request, &cancel);
            let result = match role {
                Role::Admin => list.await.map(|list| (list, Vec::new())),
                Role::User => {
                    let (list, progress) =
                        futures::join!(list, api.send_with(&ListProgress, &cancel));
                    list.and_then(|l| progress.map(|p| (l, p)))
                }
            };
            match result {
                Ok((list, progress)) => {
                    tutorials.update(|t| t.replace_all(list));
                    enrolled.set(progress.iter().map(|p| p.tutorial_id).collect());
                    load_state.set(LoadState::Ready);
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    load_state.set(LoadState::Failed("Failed to load tutorials".into()));
                    notifier.api_error("tutorials", &e);
                }
            }
        });
    });
    load.run(());

    let on_enroll = move |id: i64| {
        let api = auth.api();
        spawn_local(async move {
            match api.send(&EnrollTutorial { id }).await {
                Ok(()) => {
                    enrolled.update(|set| {
                        set.insert(id);
                    });
                    notifier.success("Enrolled successfully");
                    router.navigate_to(AppRoute::Quiz(id));
                }
                Err(e) => notifier.api_error("enroll", &e),
            }
        });
    };

    let on_delete = move |id: i64| {
        if !confirm("Delete this tutorial? This cannot be undone.") {
            return;
        }
        let api = auth.api();
        tutorials.update(|t| {
            t.remove(id);
        });
        spawn_local(async move {
            match api.send(&DeleteTutorial { id }).await {
                Ok(()) => notifier.success("Tutorial deleted"),
                Err(e) => {
                    notifier.api_error("delete tutorial", &e);
                    load.run(());
                }
            }
        });
    };

    view! {
        <div class="max-w-6xl mx-auto p-4 md:p-8 space-y-6">
            <div class="flex justify-between items-center">
                <h1 class="text-3xl font-bold">"Tutorials"</h1>
                {(role == Role::Admin).then(|| view! {
                    <Link to=AppRoute::TutorialEditor(None) class="btn btn-primary btn-sm">
                        "New Tutorial"
                    </Link>
                })}
            </div>

            <LoadGuard state=load_state on_retry=load>
                <Show
                    when=move || tutorials.with(|t| !t.is_empty())
                    fallback=|| view! { <EmptyState message="No tutorials available yet." /> }
                >
                    <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                        <For
                            each=move || tutorials.with(|t| t.items().to_vec())
                            key=|t| (t.id, t.title.clone())
                            children=move |tutorial| {
                                let id = tutorial.id;
                                let is_enrolled = move || enrolled.with(|set| set.contains(&id));
                                let description = if tutorial.description.trim().is_empty() {
                                    "No description available".to_string()
                                } else {
                                    tutorial.description.clone()
                                };
                                let actions = match role {
                                    Role::Admin => view! {
                                        <Link to=AppRoute::TutorialEditor(Some(id)) class="btn btn-sm btn-outline">
                                            "Edit"
                                        </Link>
                                        <button class="btn btn-sm btn-error btn-outline" on:click=move |_| on_delete(id)>
                                            "Delete"
                                        </button>
                                    }
                                    .into_any(),
                                    Role::User => view! {
                                        <Show
                                            when=is_enrolled
                                            fallback=move || view! {
                                                <button class="btn btn-sm btn-primary" on:click=move |_| on_enroll(id)>
                                                    "Enroll"
                                                </button>
                                            }
                                        >
                                            <Link to=AppRoute::Quiz(id) class="btn btn-sm btn-primary">
                                                "Start quiz"
                                            </Link>
                                        </Show>
                                    }
                                    .into_any(),
                                };
                                view! {
                                    <div class="card bg-base-100 shadow-xl">
                                        <div class="card-body">
                                            <h2 class="card-title">{tutorial.title.clone()}</h2>
                                            <p class="text-base-content/70">{description}</p>
                                            <p class="text-xs text-base-content/50">
                                                {format!("{} questions", tutorial.mcqs.len())}
                                            </p>
                                            <div class="card-actions justify-end">{actions}</div>
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

// =========================================================
// 教程编辑 + 题目管理
// =========================================================

fn mcq_form_from(mcq: &Mcq) -> McqForm {
    let mut form = McqForm {
        question: mcq.question.clone(),
        options: mcq.options.clone(),
        correct_answer: mcq.correct_answer.clone().unwrap_or_default(),
    };
    form.options.resize(McqForm::default().options.len(), String::new());
    form
}

#[component]
fn McqManager(tutorial_id: i64, mcqs: RwSignal<ListState<Mcq>>) -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();

    let form = RwSignal::new(McqForm::default());
    let editing = RwSignal::new(Option::<i64>::None);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let (is_saving, set_is_saving) = signal(false);

    let reset = move || {
        form.set(McqForm::default());
        editing.set(None);
        set_error_msg.set(None);
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let body = match form.with_untracked(McqForm::validate) {
            Ok(body) => body,
            Err(e) => {
                set_error_msg.set(Some(e.to_string()));
                return;
            }
        };
        set_error_msg.set(None);
        set_is_saving.set(true);

        let api = auth.api();
        let editing_id = editing.get_untracked();
        spawn_local(async move {
            let result = match editing_id {
                Some(id) => api.send(&UpdateMcq { id, body }).await.map(|saved| {
                    mcqs.update(|list| {
                        list.update(saved);
                    });
                    "Question updated"
                }),
                None => api.send(&CreateMcq { tutorial_id, body }).await.map(|saved| {
                    mcqs.update(|list| {
                        let temp = list.temp_id();
                        list.confirm(temp, saved);
                    });
                    "Question added"
                }),
            };
            match result {
                Ok(message) => {
                    notifier.success(message);
                    reset();
                }
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
            set_is_saving.set(false);
        });
    };

    let on_delete = move |id: i64| {
        if !confirm("Delete this question?") {
            return;
        }
        let api = auth.api();
        let Some(removed) = mcqs.try_update(|list| list.remove(id)).flatten() else {
            return;
        };
        spawn_local(async move {
            match api.send(&DeleteMcq { tutorial_id, id }).await {
                Ok(()) => notifier.success("Question deleted"),
                Err(e) => {
                    mcqs.update(|list| list.insert_optimistic(removed));
                    notifier.api_error("delete question", &e);
                }
            }
        });
    };

    let option_input = move |index: usize| {
        view! {
            <input
                type="text"
                class="input input-bordered input-sm w-full"
                placeholder=format!("Option {}", index + 1)
                prop:value=move || form.with(|f| f.options.get(index).cloned().unwrap_or_default())
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    form.update(|f| {
                        if let Some(slot) = f.options.get_mut(index) {
                            *slot = value;
                        }
                    });
                }
            />
        }
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">"Questions"</h2>

                <Show
                    when=move || mcqs.with(|m| !m.is_empty())
                    fallback=|| view! { <EmptyState message="No questions yet." /> }
                >
                    <ul class="space-y-2">
                        <For
                            each=move || mcqs.with(|m| m.items().to_vec())
                            key=|m| (m.id, m.question.clone(), m.options.clone())
                            children=move |mcq| {
                                let id = mcq.id;
                                let edit_form = mcq_form_from(&mcq);
                                view! {
                                    <li class="bg-base-200 rounded-box p-3">
                                        <div class="flex justify-between gap-2">
                                            <span class="font-medium">{mcq.question.clone()}</span>
                                            <div class="flex gap-1 shrink-0">
                                                <button
                                                    class="btn btn-xs btn-outline"
                                                    on:click=move |_| {
                                                        form.set(edit_form.clone());
                                                        editing.set(Some(id));
                                                    }
                                                >
                                                    "Edit"
                                                </button>
                                                <button class="btn btn-xs btn-error btn-outline" on:click=move |_| on_delete(id)>
                                                    "Delete"
                                                </button>
                                            </div>
                                        </div>
                                        <ol class="list-decimal list-inside text-sm mt-1">
                                            {mcq.options.iter().map(|o| {
                                                let is_correct = mcq.correct_answer.as_deref() == Some(o.as_str());
                                                view! {
                                                    <li class:text-success=is_correct>{o.clone()}</li>
                                                }
                                            }).collect_view()}
                                        </ol>
                                    </li>
                                }
                            }
                        />
                    </ul>
                </Show>

                <form class="space-y-2 mt-4" on:submit=on_submit>
                    <h3 class="font-semibold">
                        {move || if editing.get().is_some() { "Edit question" } else { "Add a question" }}
                    </h3>
                    <FormError message=error_msg />
                    {bind_input!(form, question, "Question", "text")}
                    <div class="grid grid-cols-1 md:grid-cols-2 gap-2">
                        {(0..McqForm::default().options.len()).map(option_input).collect_view()}
                    </div>
                    <select
                        class="select select-bordered select-sm w-full"
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            form.update(|f| f.correct_answer = value);
                        }
                        prop:value=move || form.with(|f| f.correct_answer.clone())
                    >
                        <option value="">"Correct answer..."</option>
                        {move || {
                            form.with(|f| f.options.clone())
                                .into_iter()
                                .filter(|o| !o.trim().is_empty())
                                .map(|o| view! { <option value=o.clone()>{o.clone()}</option> })
                                .collect_view()
                        }}
                    </select>
                    <div class="flex gap-2 justify-end">
                        <Show when=move || editing.get().is_some()>
                            <button type="button" class="btn btn-ghost btn-sm" on:click=move |_| reset()>
                                "Cancel"
                            </button>
                        </Show>
                        <button class="btn btn-primary btn-sm" disabled=move || is_saving.get()>
                            {move || if editing.get().is_some() { "Update" } else { "Add" }}
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}

#[component]
pub fn TutorialEditorPage(id: Option<i64>) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let notifier = use_notifier();
    let cancel = use_cancel_token();

    let form = RwSignal::new(TutorialForm::default());
    let mcqs = RwSignal::new(ListState::<Mcq>::default());
    let load_state = RwSignal::new(if id.is_some() {
        LoadState::Loading
    } else {
        LoadState::Ready
    });
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let (is_saving, set_is_saving) = signal(false);

    let load = move || {
        let Some(id) = id else {
            return;
        };
        let api = auth.api();
        let cancel = cancel.clone();
        load_state.set(LoadState::Loading);
        spawn_local(async move {
            match api.send_with(&GetTutorial { role: Role::Admin, id }, &cancel).await {
                Ok(tutorial) => {
                    form.set(TutorialForm {
                        title: tutorial.title,
                        description: tutorial.description,
                    });
                    mcqs.update(|m| m.replace_all(tutorial.mcqs));
                    load_state.set(LoadState::Ready);
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    load_state.set(LoadState::Failed("Failed to load tutorial".into()));
                    notifier.api_error("tutorial", &e);
                }
            }
        });
    };
    load();

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let body = match form.with_untracked(TutorialForm::validate) {
            Ok(body) => body,
            Err(e) => {
                set_error_msg.set(Some(e.to_string()));
                return;
            }
        };
        set_error_msg.set(None);
        set_is_saving.set(true);

        let api = auth.api();
        spawn_local(async move {
            let result = match id {
                Some(id) => api.send(&UpdateTutorial { id, body }).await,
                None => api.send(&body).await,
            };
            match result {
                Ok(saved) => {
                    log_info!("[Tutorials] saved tutorial {}", saved.id);
                    if id.is_some() {
                        notifier.success("Tutorial updated");
                        router.navigate_to(AppRoute::Tutorials);
                    } else {
                        // 新建后停留在编辑页，继续添加题目
                        notifier.success("Tutorial created");
                        router.navigate_to(AppRoute::TutorialEditor(Some(saved.id)));
                    }
                }
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
            set_is_saving.set(false);
        });
    };

    view! {
        <div class="max-w-3xl mx-auto p-4 md:p-8 space-y-6">
            <div class="flex justify-between items-center">
                <h1 class="text-3xl font-bold">
                    {if id.is_some() { "Edit Tutorial" } else { "New Tutorial" }}
                </h1>
                <Link to=AppRoute::Tutorials class="btn btn-ghost btn-sm">"Back"</Link>
            </div>

            <LoadGuard state=load_state on_retry=Callback::new(move |_| load())>
                <div class="card bg-base-100 shadow-xl">
                    <form class="card-body" on:submit=on_submit>
                        <FormError message=error_msg />
                        {bind_input!(form, title, "Title", "text")}
                        {bind_textarea!(form, description, "Description")}
                        <div class="card-actions justify-end mt-4">
                            <button class="btn btn-primary" disabled=move || is_saving.get()>
                                {if id.is_some() { "Save" } else { "Create" }}
                            </button>
                        </div>
                    </form>
                </div>

                {id.map(|tutorial_id| view! { <McqManager tutorial_id=tutorial_id mcqs=mcqs /> })}
            </LoadGuard>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_a_question_pads_missing_options() {
        let mcq = Mcq {
            id: 3,
            question: "2 + 2?".into(),
            options: vec!["3".into(), "4".into()],
            correct_answer: Some("4".into()),
        };
        let form = mcq_form_from(&mcq);
        assert_eq!(form.options, vec!["3", "4", "", ""]);
        assert_eq!(form.correct_answer, "4");
    }
}
