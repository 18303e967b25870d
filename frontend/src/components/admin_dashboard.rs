use crate::auth::use_auth;
use crate::components::common::{EmptyState, LoadGuard, use_cancel_token};
use crate::notify::use_notifier;
use crate::resource::LoadState;
use leptos::prelude::*;
use leptos::task::spawn_local;
use technest_shared::activity::{ActivitySeries, TimeWindow, bucket_by_date};
use technest_shared::date::{display_datetime, parse_timestamp};
use technest_shared::profile::UserFilter;
use technest_shared::protocol::{ListRegistrationActivity, ListUsers};
use technest_shared::{AdminUserSummary, RegistrationRecord, Role};

const CHART_WIDTH: f64 = 640.0;
const CHART_HEIGHT: f64 = 220.0;
const CHART_PADDING: f64 = 28.0;
const RECENT_LIMIT: usize = 10;

/// 图表上的一个柱
#[derive(Debug, Clone, PartialEq)]
struct Bar {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    label: String,
    count: usize,
}

/// 把日计数映射为 SVG 坐标，最高的柱占满绘图区
fn layout_bars(series: &ActivitySeries) -> Vec<Bar> {
    let max = series.max_count();
    if series.is_empty() || max == 0 {
        return Vec::new();
    }
    let plot_width = CHART_WIDTH - CHART_PADDING * 2.0;
    let plot_height = CHART_HEIGHT - CHART_PADDING * 2.0;
    let slot = plot_width / series.labels.len() as f64;
    let width = (slot * 0.7).max(1.0);

    series
        .points()
        .enumerate()
        .map(|(i, (label, count))| {
            let height = plot_height * count as f64 / max as f64;
            Bar {
                x: CHART_PADDING + slot * i as f64 + (slot - width) / 2.0,
                y: CHART_HEIGHT - CHART_PADDING - height,
                width,
                height,
                label: label.to_string(),
                count,
            }
        })
        .collect()
}

/// 最近的注册记录，按时间倒序
fn most_recent(records: &[RegistrationRecord], limit: usize) -> Vec<RegistrationRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| std::cmp::Reverse(parse_timestamp(&r.created_at)));
    sorted.truncate(limit);
    sorted
}

#[component]
fn RegistrationChart(#[prop(into)] series: Signal<ActivitySeries>) -> impl IntoView {
    let bars = move || series.with(layout_bars);
    let baseline = CHART_HEIGHT - CHART_PADDING;

    view! {
        <Show
            when=move || series.with(|s| !s.is_empty())
            fallback=|| view! { <EmptyState message="No registrations in this period." /> }
        >
            <svg
                class="w-full h-auto"
                viewBox=format!("0 0 {} {}", CHART_WIDTH, CHART_HEIGHT)
                role="img"
                aria-label="Daily user registrations"
            >
                <line
                    x1=CHART_PADDING
                    y1=baseline
                    x2=CHART_WIDTH - CHART_PADDING
                    y2=baseline
                    class="stroke-base-content/30"
                ></line>
                {move || {
                    bars()
                        .into_iter()
                        .map(|bar| {
                            view! {
                                <g>
                                    <rect
                                        x=bar.x
                                        y=bar.y
                                        width=bar.width
                                        height=bar.height
                                        rx="2"
                                        class="fill-primary"
                                    ></rect>
                                    <text
                                        x=bar.x + bar.width / 2.0
                                        y=bar.y - 4.0
                                        text-anchor="middle"
                                        class="fill-base-content text-[10px]"
                                    >
                                        {bar.count}
                                    </text>
                                    <text
                                        x=bar.x + bar.width / 2.0
                                        y=baseline + 14.0
                                        text-anchor="middle"
                                        class="fill-base-content text-[9px]"
                                    >
                                        {bar.label}
                                    </text>
                                </g>
                            }
                        })
                        .collect_view()
                }}
            </svg>
            <p class="text-sm text-base-content/70 text-right">
                {move || format!("{} registrations, peak {} per day", series.with(ActivitySeries::total), series.with(ActivitySeries::max_count))}
            </p>
        </Show>
    }
}

#[component]
fn UserDirectory(#[prop(into)] users: Signal<Vec<AdminUserSummary>>) -> impl IntoView {
    let filter = RwSignal::new(UserFilter::new(Role::User));

    let visible = move || {
        users.with(|all| {
            filter.with(|f| f.apply(all).into_iter().cloned().collect::<Vec<_>>())
        })
    };
    let tab_class = move |role: Role| {
        if filter.with(|f| f.role == role) {
            "tab tab-active"
        } else {
            "tab"
        }
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <div class="flex flex-col md:flex-row justify-between gap-4">
                    <div role="tablist" class="tabs tabs-boxed">
                        <a role="tab" class=move || tab_class(Role::User) on:click=move |_| filter.update(|f| f.role = Role::User)>
                            "Users"
                        </a>
                        <a role="tab" class=move || tab_class(Role::Admin) on:click=move |_| filter.update(|f| f.role = Role::Admin)>
                            "Admins"
                        </a>
                    </div>
                    <div class="flex gap-2">
                        <input
                            type="text"
                            placeholder="Search by email..."
                            class="input input-bordered input-sm"
                            prop:value=move || filter.with(|f| f.email_query.clone())
                            on:input=move |ev| {
                                let value = event_target_value(&ev);
                                filter.update(|f| f.email_query = value);
                            }
                        />
                        <input
                            type="text"
                            placeholder="Search by name..."
                            class="input input-bordered input-sm"
                            prop:value=move || filter.with(|f| f.name_query.clone())
                            on:input=move |ev| {
                                let value = event_target_value(&ev);
                                filter.update(|f| f.name_query = value);
                            }
                        />
                    </div>
                </div>

                <div class="overflow-x-auto">
                    <table class="table table-zebra">
                        <thead>
                            <tr>
                                <th>"ID"</th>
                                <th>"Name"</th>
                                <th>"Email"</th>
                                <th class="hidden md:table-cell">"Mobile"</th>
                                <th class="hidden md:table-cell">"Registered"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {move || {
                                let rows = visible();
                                if rows.is_empty() {
                                    return view! {
                                        <tr>
                                            <td colspan="5" class="text-center py-8 text-base-content/50">
                                                "No matching accounts."
                                            </td>
                                        </tr>
                                    }
                                    .into_any();
                                }
                                rows.into_iter()
                                    .map(|u| {
                                        view! {
                                            <tr>
                                                <td>{u.id}</td>
                                                <td>{u.display_name()}</td>
                                                <td>{u.email.clone()}</td>
                                                <td class="hidden md:table-cell">{u.mobile.clone().unwrap_or_else(|| "-".into())}</td>
                                                <td class="hidden md:table-cell">
                                                    {u.created_at.as_deref().map(display_datetime).unwrap_or_else(|| "-".into())}
                                                </td>
                                            </tr>
                                        }
                                    })
                                    .collect_view()
                                    .into_any()
                            }}
                        </tbody>
                    </table>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn AdminDashboardPage() -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();
    let cancel = use_cancel_token();

    let records = RwSignal::new(Vec::<RegistrationRecord>::new());
    let users = RwSignal::new(Vec::<AdminUserSummary>::new());
    let load_state = RwSignal::new(LoadState::Loading);
    let window = RwSignal::new(TimeWindow::All);

    let load = move || {
        let api = auth.api();
        let cancel = cancel.clone();
        load_state.set(LoadState::Loading);
        spawn_local(async move {
            let (activity, directory) = futures::join!(
                api.send_with(&ListRegistrationActivity, &cancel),
                api.send_with(&ListUsers, &cancel),
            );
            match (activity, directory) {
                (Ok(activity), Ok(directory)) => {
                    log_info!(
                        "[AdminDashboard] {} registrations, {} accounts",
                        activity.len(),
                        directory.len()
                    );
                    records.set(activity);
                    users.set(directory);
                    load_state.set(LoadState::Ready);
                }
                (Err(e), _) | (_, Err(e)) => {
                    if e.is_cancelled() {
                        return;
                    }
                    load_state.set(LoadState::Failed("Failed to load admin dashboard".into()));
                    notifier.api_error("admin dashboard", &e);
                }
            }
        });
    };
    load();

    let series = Signal::derive(move || {
        let now = chrono::Local::now();
        records.with(|r| bucket_by_date(r, window.get(), &now))
    });
    let recent = move || records.with(|r| most_recent(r, RECENT_LIMIT));

    view! {
        <div class="max-w-7xl mx-auto p-4 md:p-8 space-y-8">
            <h1 class="text-3xl font-bold">"Admin Dashboard"</h1>

            <LoadGuard state=load_state on_retry=Callback::new(move |_| load())>
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <div class="flex flex-col md:flex-row justify-between gap-4">
                            <h2 class="card-title">"User Registration Activity"</h2>
                            <select
                                class="select select-bordered select-sm"
                                on:change=move |ev| window.set(TimeWindow::from_value(&event_target_value(&ev)))
                                prop:value=move || window.get().as_str()
                            >
                                {TimeWindow::ALL
                                    .into_iter()
                                    .map(|w| view! { <option value=w.as_str()>{w.label()}</option> })
                                    .collect_view()}
                            </select>
                        </div>
                        <RegistrationChart series=series />

                        <h3 class="font-semibold mt-4">"Recent Registrations"</h3>
                        <div class="overflow-x-auto">
                            <table class="table table-sm">
                                <thead>
                                    <tr>
                                        <th>"Email"</th>
                                        <th>"Role"</th>
                                        <th>"Registered At"</th>
                                    </tr>
                                </thead>
                                <tbody>
                                    {move || {
                                        recent()
                                            .into_iter()
                                            .map(|r| view! {
                                                <tr>
                                                    <td>{r.email.unwrap_or_else(|| "-".into())}</td>
                                                    <td>{r.role.map(|role| role.label()).unwrap_or("-")}</td>
                                                    <td>{display_datetime(&r.created_at)}</td>
                                                </tr>
                                            })
                                            .collect_view()
                                    }}
                                </tbody>
                            </table>
                        </div>
                    </div>
                </div>

                <UserDirectory users=users />
            </LoadGuard>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(created_at: &str) -> RegistrationRecord {
        RegistrationRecord {
            email: None,
            role: Some(Role::User),
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn tallest_bar_fills_plot_area() {
        let series = ActivitySeries {
            labels: vec!["1 May".into(), "2 May".into()],
            counts: vec![1, 4],
        };
        let bars = layout_bars(&series);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].height, CHART_HEIGHT - CHART_PADDING * 2.0);
        assert_eq!(bars[0].height * 4.0, bars[1].height);
        assert!(bars[0].x < bars[1].x);
        assert_eq!(bars[1].y, CHART_PADDING);
    }

    #[test]
    fn empty_series_has_no_bars() {
        assert!(layout_bars(&ActivitySeries::default()).is_empty());
    }

    #[test]
    fn recent_registrations_are_newest_first() {
        let records = vec![
            record("2025-01-01T10:00:00"),
            record("2025-03-01T10:00:00"),
            record("2025-02-01T10:00:00"),
        ];
        let recent = most_recent(&records, 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].created_at, "2025-03-01T10:00:00");
        assert_eq!(recent[1].created_at, "2025-02-01T10:00:00");
    }
}
