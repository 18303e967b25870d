use crate::auth::use_auth;
use crate::components::common::{EmptyState, LoadGuard, use_cancel_token};
use crate::notify::use_notifier;
use crate::resource::LoadState;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;
use technest_shared::Role;
use technest_shared::protocol::{ListProgress, ListTutorials};
use technest_shared::quiz::{ProgressRow, join_progress};

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let notifier = use_notifier();
    let cancel = use_cancel_token();

    let rows = RwSignal::new(Vec::<ProgressRow>::new());
    let load_state = RwSignal::new(LoadState::Loading);

    // 进度与教程列表并发拉取，按教程 id 关联标题
    let load = move || {
        let api = auth.api();
        let cancel = cancel.clone();
        load_state.set(LoadState::Loading);
        spawn_local(async move {
            let catalog = ListTutorials { role: Role::User };
            let (progress, tutorials) = futures::join!(
                api.send_with(&ListProgress, &cancel),
                api.send_with(&catalog, &cancel),
            );
            match progress.and_then(|p| tutorials.map(|t| join_progress(&p, &t))) {
                Ok(joined) => {
                    log_info!("[Dashboard] {} tutorials in progress", joined.len());
                    rows.set(joined);
                    load_state.set(LoadState::Ready);
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    load_state.set(LoadState::Failed("Failed to load dashboard data".into()));
                    notifier.api_error("dashboard", &e);
                }
            }
        });
    };
    load();

    let email = move || auth.session().with(|s| s.as_ref().map(|s| s.email.clone()));
    let completed = move || {
        rows.with(|r| {
            r.iter()
                .filter(|row| row.total_questions > 0 && row.correct_answers >= row.total_questions)
                .count()
        })
    };
    let average = move || {
        rows.with(|r| {
            if r.is_empty() {
                0.0
            } else {
                r.iter().map(|row| row.score).sum::<f64>() / r.len() as f64
            }
        })
    };

    view! {
        <div class="max-w-6xl mx-auto p-4 md:p-8 space-y-8">
            <div>
                <h1 class="text-3xl font-bold">"Dashboard"</h1>
                <p class="text-base-content/70">"Welcome back, " {email}</p>
            </div>

            <LoadGuard state=load_state on_retry=Callback::new(move |_| load())>
                <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                    <div class="stat">
                        <div class="stat-title">"Enrolled"</div>
                        <div class="stat-value text-primary">{move || rows.with(Vec::len)}</div>
                    </div>
                    <div class="stat">
                        <div class="stat-title">"Fully correct"</div>
                        <div class="stat-value text-success">{completed}</div>
                    </div>
                    <div class="stat">
                        <div class="stat-title">"Average score"</div>
                        <div class="stat-value text-secondary">{move || format!("{:.2}%", average())}</div>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h2 class="card-title">"My Library"</h2>
                        <Show
                            when=move || rows.with(|r| !r.is_empty())
                            fallback=|| view! {
                                <EmptyState message="You haven't enrolled in any tutorials yet." />
                                <div class="text-center">
                                    <Link to=AppRoute::Tutorials class="btn btn-primary btn-sm">
                                        "Browse tutorials"
                                    </Link>
                                </div>
                            }
                        >
                            <div class="grid gap-4 md:grid-cols-2">
                                <For
                                    each=move || rows.get()
                                    key=|row| row.tutorial_id
                                    children=move |row| {
                                        let tutorial_id = row.tutorial_id;
                                        view! {
                                            <div class="card bg-base-200">
                                                <div class="card-body p-4">
                                                    <h3 class="font-semibold text-lg">{row.title.clone()}</h3>
                                                    <p class="text-sm">
                                                        "Correct answers: " {row.correct_answers}
                                                        " / " {row.total_questions}
                                                    </p>
                                                    <p class="text-sm">{format!("Progress: {:.2}%", row.score)}</p>
                                                    <progress
                                                        class="progress progress-primary w-full"
                                                        value=row.score
                                                        max="100"
                                                    ></progress>
                                                    <div class="card-actions justify-end">
                                                        <button
                                                            class="btn btn-primary btn-sm"
                                                            on:click=move |_| router.navigate_to(AppRoute::Quiz(tutorial_id))
                                                        >
                                                            "Continue Quiz"
                                                        </button>
                                                    </div>
                                                </div>
                                            </div>
                                        }
                                    }
                                />
                            </div>
                        </Show>
                    </div>
                </div>
            </LoadGuard>
        </div>
    }
}
