use crate::auth::use_auth;
use crate::components::common::{LoadGuard, use_cancel_token};
use crate::notify::use_notifier;
use crate::resource::LoadState;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use technest_shared::Role;
use technest_shared::protocol::GetTutorial;
use technest_shared::quiz::{AnsweredQuestion, QuizFlow, QuizState, Verdict};

fn verdict_view(verdict: Verdict) -> (&'static str, &'static str) {
    match verdict {
        Verdict::Correct => ("Correct!", "badge badge-success"),
        Verdict::Incorrect => ("Incorrect", "badge badge-error"),
        Verdict::Recorded => ("Answer recorded", "badge badge-ghost"),
    }
}

#[component]
fn AnswerHistory(#[prop(into)] answers: Signal<Vec<AnsweredQuestion>>) -> impl IntoView {
    view! {
        <Show when=move || answers.with(|a| !a.is_empty())>
            <div class="space-y-3">
                <h2 class="text-xl font-semibold">"Your Answers"</h2>
                {move || {
                    answers
                        .get()
                        .into_iter()
                        .map(|answer| {
                            let (label, class) = verdict_view(answer.verdict);
                            view! {
                                <div class="card bg-base-100 shadow">
                                    <div class="card-body p-4">
                                        <p><strong>"Question: "</strong>{answer.question}</p>
                                        <p><strong>"Your Answer: "</strong>{answer.answer}</p>
                                        <span class=class>{label}</span>
                                    </div>
                                </div>
                            }
                        })
                        .collect_view()
                }}
            </div>
        </Show>
    }
}

#[component]
pub fn QuizPage(id: i64) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let notifier = use_notifier();
    let cancel = use_cancel_token();

    let flow = RwSignal::new(QuizFlow::new());
    let selected = RwSignal::new(String::new());
    let load_state = RwSignal::new(LoadState::Loading);

    let load = Callback::new({
        let cancel = cancel.clone();
        move |()| {
            let api = auth.api();
            let cancel = cancel.clone();
            load_state.set(LoadState::Loading);
            spawn_local(async move {
                let request = GetTutorial { role: Role::User, id };
                match api.send_with(&request, &cancel).await {
                    Ok(tutorial) => {
                        log_info!("[Quiz] {} with {} questions", tutorial.title, tutorial.mcqs.len());
                        flow.update(|f| f.load(tutorial));
                        load_state.set(LoadState::Ready);
                    }
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => {
                        load_state.set(LoadState::Failed("Failed to load tutorial".into()));
                        notifier.api_error("quiz", &e);
                    }
                }
            });
        }
    });
    load.run(());

    let submit = Callback::new(move |()| {
        let answer = selected.get_untracked();
        let request = match flow.try_update(|f| f.begin_submit(&answer)) {
            Some(Ok(request)) => request,
            Some(Err(e)) => {
                notifier.error(e.to_string());
                return;
            }
            None => return,
        };

        let api = auth.api();
        let cancel = cancel.clone();
        spawn_local(async move {
            match api.send_with(&request, &cancel).await {
                Ok(result) => {
                    let state = flow.try_update(|f| f.finish_submit(result));
                    selected.set(String::new());
                    if state == Some(QuizState::Completed) {
                        notifier.success("Quiz Completed!");
                    }
                }
                Err(e) => {
                    flow.update(QuizFlow::abort_submit);
                    notifier.api_error("submit answer", &e);
                }
            }
        });
    });

    // 答题记录由服务端逐题保存，退出无需请求
    let on_exit = move |_| {
        notifier.success("Progress Saved!");
        router.navigate_to(AppRoute::Dashboard);
    };

    let title = move || {
        flow.with(|f| f.tutorial().map(|t| t.title.clone()).unwrap_or_default())
    };
    let answers = Signal::derive(move || flow.with(|f| f.answers().to_vec()));
    let submitting = move || flow.with(QuizFlow::is_submitting);

    view! {
        <div class="max-w-3xl mx-auto p-4 md:p-8 space-y-6">
            <LoadGuard state=load_state on_retry=load>
                <div class="flex justify-between items-center">
                    <h1 class="text-3xl font-bold">{title} " - Quiz"</h1>
                    <button class="btn btn-outline btn-sm" on:click=on_exit>
                        "Save & Exit"
                    </button>
                </div>

                {move || match flow.with(QuizFlow::state) {
                    QuizState::Loading => ().into_any(),
                    QuizState::InProgress { index } => {
                        let Some(mcq) = flow.with(|f| f.current().cloned()) else {
                            return ().into_any();
                        };
                        let total = flow.with(QuizFlow::total);
                        let options = mcq
                            .options
                            .into_iter()
                            .enumerate()
                            .map(|(i, option)| {
                                let value = option.clone();
                                let checked = {
                                    let option = option.clone();
                                    move || selected.with(|s| *s == option)
                                };
                                view! {
                                    <label class="label cursor-pointer justify-start gap-3" for=format!("option-{}", i)>
                                        <input
                                            type="radio"
                                            id=format!("option-{}", i)
                                            name="answer"
                                            class="radio radio-primary"
                                            prop:checked=checked
                                            on:change=move |_| selected.set(value.clone())
                                        />
                                        <span class="label-text">{option}</span>
                                    </label>
                                }
                            })
                            .collect_view();
                        view! {
                            <div class="card bg-base-100 shadow-xl">
                                <div class="card-body">
                                    <h2 class="card-title">
                                        {format!("Question {} of {}", index + 1, total)}
                                    </h2>
                                    <progress
                                        class="progress progress-primary w-full"
                                        value=index
                                        max=total
                                    ></progress>
                                    <p class="text-lg my-2">{mcq.question}</p>
                                    <div class="form-control">{options}</div>
                                    <div class="card-actions justify-end mt-4">
                                        <button
                                            class="btn btn-primary"
                                            disabled=submitting
                                            on:click=move |_| submit.run(())
                                        >
                                            {move || if submitting() { "Submitting..." } else { "Submit Answer" }}
                                        </button>
                                    </div>
                                </div>
                            </div>
                        }
                        .into_any()
                    }
                    QuizState::Completed => view! {
                        <div class="card bg-base-100 shadow-xl">
                            <div class="card-body items-center text-center">
                                <h2 class="card-title">"Quiz Completed!"</h2>
                                <p>
                                    {move || {
                                        let total = flow.with(QuizFlow::total);
                                        if total == 0 {
                                            "This tutorial has no questions yet.".to_string()
                                        } else {
                                            format!("You answered all {} questions.", total)
                                        }
                                    }}
                                </p>
                                <button
                                    class="btn btn-primary"
                                    on:click=move |_| router.navigate_to(AppRoute::Dashboard)
                                >
                                    "Back to Dashboard"
                                </button>
                            </div>
                        </div>
                    }
                    .into_any(),
                }}

                <AnswerHistory answers=answers />
            </LoadGuard>
        </div>
    }
}
