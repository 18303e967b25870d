use crate::auth::use_auth;
use crate::components::common::{
    EmptyState, FormError, LoadGuard, bind_input, bind_textarea, confirm, use_cancel_token,
};
use crate::config::COMMUNITY_PAGE_SIZE;
use crate::notify::use_notifier;
use crate::resource::{ListState, LoadState};
use futures::future::join_all;
use leptos::prelude::*;
use leptos::task::spawn_local;
use technest_shared::date::display_datetime;
use technest_shared::protocol::{
    AddCommunityComment, DeleteCommunityComment, DeleteCommunityPost, ListCommunityComments,
    ListCommunityPosts, UpdateCommunityComment, UpdateCommunityPost,
};
use technest_shared::social::CommunityCommentRequest;
use technest_shared::validation::CommunityPostForm;
use technest_shared::{CommunityComment, CommunityPost, ListScope, Owned, PageRequest, Viewer};

/// 乐观插入时使用的占位评论
fn placeholder_comment(id: i64, content: &str, viewer: Option<&Viewer>) -> CommunityComment {
    CommunityComment {
        id,
        content: content.to_string(),
        user_id: viewer.and_then(|v| v.id),
        username: viewer.map(|v| v.email.clone()),
        created_at: None,
    }
}

/// 服务端返回的评论可能缺少作者字段，用当前访问者补齐
fn fill_author(mut comment: CommunityComment, viewer: Option<&Viewer>) -> CommunityComment {
    if comment.user_id.is_none() {
        comment.user_id = viewer.and_then(|v| v.id);
    }
    if comment.username.is_none() {
        comment.username = viewer.map(|v| v.email.clone());
    }
    comment
}

// =========================================================
// 评论
// =========================================================

#[component]
fn CommentThread(post_id: i64, initial: Vec<CommunityComment>) -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();
    let cancel = use_cancel_token();

    let comments = RwSignal::new(ListState::new(initial));
    let draft = RwSignal::new(String::new());
    let editing = RwSignal::new(Option::<(i64, String)>::None);

    // 失败后以服务端数据为准
    let reload = Callback::new(move |()| {
        let api = auth.api();
        let cancel = cancel.clone();
        spawn_local(async move {
            match api.send_with(&ListCommunityComments { post_id }, &cancel).await {
                Ok(list) => comments.update(|c| c.replace_all(list)),
                Err(e) if e.is_cancelled() => {}
                Err(e) => log_warn!("[Community] comments for {} unavailable: {}", post_id, e),
            }
        });
    });

    let on_add = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let content = draft.get_untracked().trim().to_string();
        if content.is_empty() {
            return;
        }
        let viewer = auth.viewer();
        let temp = comments
            .try_update(|c| {
                let temp = c.temp_id();
                c.insert_optimistic(placeholder_comment(temp, &content, viewer.as_ref()));
                temp
            })
            .unwrap_or(-1);
        draft.set(String::new());

        let api = auth.api();
        spawn_local(async move {
            let request = AddCommunityComment {
                post_id,
                body: CommunityCommentRequest { content },
            };
            match api.send(&request).await {
                Ok(saved) => {
                    let saved = fill_author(saved, viewer.as_ref());
                    comments.update(|c| c.confirm(temp, saved));
                }
                Err(e) => {
                    comments.update(|c| {
                        c.remove(temp);
                    });
                    notifier.api_error("add comment", &e);
                }
            }
        });
    };

    let on_save_edit = move |_| {
        let Some((id, content)) = editing.get_untracked() else {
            return;
        };
        let content = content.trim().to_string();
        if content.is_empty() {
            return;
        }
        let Some(previous) = comments.with_untracked(|c| c.get(id).cloned()) else {
            return;
        };
        comments.update(|c| {
            c.update(CommunityComment {
                content: content.clone(),
                ..previous.clone()
            });
        });
        editing.set(None);

        let api = auth.api();
        let viewer = auth.viewer();
        spawn_local(async move {
            let request = UpdateCommunityComment {
                id,
                body: CommunityCommentRequest { content },
            };
            match api.send(&request).await {
                Ok(saved) => comments.update(|c| {
                    c.update(fill_author(saved, viewer.as_ref()));
                }),
                Err(e) => {
                    notifier.api_error("update comment", &e);
                    reload.run(());
                }
            }
        });
    };

    let on_delete = move |id: i64| {
        if !confirm("Delete this comment?") {
            return;
        }
        comments.update(|c| {
            c.remove(id);
        });
        let api = auth.api();
        spawn_local(async move {
            match api.send(&DeleteCommunityComment { id }).await {
                Ok(()) => {}
                Err(e) => {
                    notifier.api_error("delete comment", &e);
                    reload.run(());
                }
            }
        });
    };

    view! {
        <div class="space-y-2">
            <h3 class="text-sm font-semibold">
                {move || format!("Answers ({})", comments.with(|c| c.items().len()))}
            </h3>
            <For
                each=move || comments.with(|c| c.items().to_vec())
                key=|c| (c.id, c.content.clone())
                children=move |comment| {
                    let id = comment.id;
                    let pending = id < 0;
                    let can_modify = {
                        let comment = comment.clone();
                        move || !pending && auth.viewer().is_some_and(|v| comment.can_modify(&v))
                    };
                    let is_editing = move || editing.with(|e| e.as_ref().is_some_and(|(eid, _)| *eid == id));
                    let original = comment.content.clone();
                    view! {
                        <div class="bg-base-200 rounded-box p-3 text-sm" class:opacity-60=pending>
                            <Show
                                when=is_editing
                                fallback={
                                    let content = comment.content.clone();
                                    move || view! { <p class="whitespace-pre-line">{content.clone()}</p> }
                                }
                            >
                                <div class="join w-full">
                                    <input
                                        type="text"
                                        class="input input-bordered input-sm join-item flex-1"
                                        prop:value=move || editing.with(|e| e.as_ref().map(|(_, c)| c.clone()).unwrap_or_default())
                                        on:input=move |ev| {
                                            let value = event_target_value(&ev);
                                            editing.update(|e| {
                                                if let Some((_, content)) = e {
                                                    *content = value;
                                                }
                                            });
                                        }
                                    />
                                    <button class="btn btn-primary btn-sm join-item" on:click=on_save_edit>"Save"</button>
                                    <button class="btn btn-ghost btn-sm join-item" on:click=move |_| editing.set(None)>"Cancel"</button>
                                </div>
                            </Show>
                            <div class="flex justify-between items-center mt-1 text-xs text-base-content/60">
                                <span>
                                    {comment.username.clone().unwrap_or_else(|| "Anonymous".into())}
                                    {comment.created_at.as_deref().map(|t| format!(" · {}", display_datetime(t)))}
                                </span>
                                <Show when=can_modify.clone()>
                                    <div class="flex gap-1">
                                        <button
                                            class="btn btn-ghost btn-xs"
                                            on:click={
                                                let original = original.clone();
                                                move |_| editing.set(Some((id, original.clone())))
                                            }
                                        >
                                            "Edit"
                                        </button>
                                        <button class="btn btn-ghost btn-xs text-error" on:click=move |_| on_delete(id)>
                                            "Delete"
                                        </button>
                                    </div>
                                </Show>
                            </div>
                        </div>
                    }
                }
            />
            <form class="join w-full" on:submit=on_add>
                <input
                    type="text"
                    placeholder="Write an answer..."
                    class="input input-bordered input-sm join-item flex-1"
                    prop:value=move || draft.get()
                    on:input=move |ev| draft.set(event_target_value(&ev))
                />
                <button class="btn btn-primary btn-sm join-item">"Answer"</button>
            </form>
        </div>
    }
}

// =========================================================
// 帖子
// =========================================================

#[component]
fn CommunityPostCard(
    post: CommunityPost,
    #[prop(into)] can_modify: Signal<bool>,
    on_updated: Callback<CommunityPost>,
    on_delete: Callback<i64>,
) -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();

    let id = post.id;
    let pending = id < 0;
    let editing = RwSignal::new(false);
    let form = RwSignal::new(CommunityPostForm {
        title: post.title.clone(),
        description: post.description.clone(),
    });
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_save = {
        let post = post.clone();
        move |ev: leptos::web_sys::SubmitEvent| {
            ev.prevent_default();
            let body = match form.with_untracked(CommunityPostForm::validate) {
                Ok(body) => body,
                Err(e) => {
                    set_error_msg.set(Some(e.to_string()));
                    return;
                }
            };
            set_error_msg.set(None);
            let api = auth.api();
            let post = post.clone();
            spawn_local(async move {
                match api.send(&UpdateCommunityPost { id, body }).await {
                    Ok(mut saved) => {
                        if saved.comments.is_empty() {
                            saved.comments = post.comments;
                        }
                        editing.set(false);
                        notifier.success("Question updated");
                        on_updated.run(saved);
                    }
                    Err(e) => set_error_msg.set(Some(e.user_message())),
                }
            });
        }
    };

    let author = post.username.clone().unwrap_or_else(|| "Anonymous".into());
    let posted_at = post.created_at.as_deref().map(display_datetime).unwrap_or_default();
    let title = post.title.clone();
    let description = post.description.clone();

    view! {
        <div class="card bg-base-100 shadow-xl" class:opacity-60=pending>
            <div class="card-body">
                <Show
                    when=move || editing.get()
                    fallback=move || view! {
                        <h2 class="card-title">{title.clone()}</h2>
                        <p class="whitespace-pre-line">{description.clone()}</p>
                    }
                >
                    <form class="space-y-2" on:submit=on_save.clone()>
                        <FormError message=error_msg />
                        {bind_input!(form, title, "Title", "text")}
                        {bind_textarea!(form, description, "Description")}
                        <div class="flex gap-2 justify-end">
                            <button type="button" class="btn btn-ghost btn-sm" on:click=move |_| editing.set(false)>
                                "Cancel"
                            </button>
                            <button class="btn btn-primary btn-sm">"Save"</button>
                        </div>
                    </form>
                </Show>

                <div class="flex justify-between items-center text-xs text-base-content/60">
                    <span>"Asked by " {author} " · " {posted_at}</span>
                    <Show when=move || !pending && can_modify.get()>
                        <div class="flex gap-1">
                            <button class="btn btn-ghost btn-xs" on:click=move |_| editing.set(true)>"Edit"</button>
                            <button class="btn btn-ghost btn-xs text-error" on:click=move |_| on_delete.run(id)>
                                "Delete"
                            </button>
                        </div>
                    </Show>
                </div>

                {(!pending).then(|| view! { <CommentThread post_id=id initial=post.comments.clone() /> })}
            </div>
        </div>
    }
}

#[component]
pub fn CommunityPage(scope: ListScope) -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();
    let cancel = use_cancel_token();

    let posts = RwSignal::new(ListState::<CommunityPost>::default());
    let page = RwSignal::new(PageRequest::first(COMMUNITY_PAGE_SIZE));
    let is_last = RwSignal::new(true);
    let load_state = RwSignal::new(LoadState::Loading);
    let show_form = RwSignal::new(false);
    let form = RwSignal::new(CommunityPostForm::default());
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    // 帖子列表与各帖评论：先取列表，再并发拉取每个帖子的评论
    let load = Callback::new(move |()| {
        let api = auth.api();
        let cancel = cancel.clone();
        let request = ListCommunityPosts {
            scope,
            page: page.get_untracked(),
        };
        if load_state.with_untracked(|s| s.error().is_some()) {
            load_state.set(LoadState::Loading);
        }
        spawn_local(async move {
            let result = match api.send_with(&request, &cancel).await {
                Ok(result) => result.into_page(),
                Err(e) if e.is_cancelled() => return,
                Err(e) => {
                    if load_state.get_untracked().is_loading() {
                        load_state.set(LoadState::Failed("Failed to load questions".into()));
                    }
                    notifier.api_error("community", &e);
                    return;
                }
            };

            let requests: Vec<_> = result
                .content
                .iter()
                .map(|p| ListCommunityComments { post_id: p.id })
                .collect();
            let comments = join_all(requests.iter().map(|r| api.send_with(r, &cancel))).await;

            let mut content = result.content;
            for (post, comments) in content.iter_mut().zip(comments) {
                match comments {
                    Ok(list) => post.comments = list,
                    Err(e) if e.is_cancelled() => return,
                    Err(e) => log_warn!("[Community] comments for {} unavailable: {}", post.id, e),
                }
            }
            is_last.set(result.last);
            posts.update(|p| p.replace_all(content));
            load_state.set(LoadState::Ready);
        });
    });
    load.run(());

    let on_create = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let body = match form.with_untracked(CommunityPostForm::validate) {
            Ok(body) => body,
            Err(e) => {
                set_error_msg.set(Some(e.to_string()));
                return;
            }
        };
        set_error_msg.set(None);

        let viewer = auth.viewer();
        let temp = posts
            .try_update(|p| {
                let temp = p.temp_id();
                p.insert_optimistic(CommunityPost {
                    id: temp,
                    title: body.title.clone(),
                    description: body.description.clone(),
                    user_id: viewer.as_ref().and_then(|v| v.id),
                    username: viewer.as_ref().map(|v| v.email.clone()),
                    created_at: None,
                    comments: Vec::new(),
                });
                temp
            })
            .unwrap_or(-1);
        form.set(CommunityPostForm::default());
        show_form.set(false);

        let api = auth.api();
        spawn_local(async move {
            match api.send(&body).await {
                Ok(saved) => {
                    posts.update(|p| p.confirm(temp, saved));
                    notifier.success("Question posted");
                }
                Err(e) => {
                    posts.update(|p| {
                        p.remove(temp);
                    });
                    notifier.api_error("post question", &e);
                }
            }
        });
    };

    let on_updated = Callback::new(move |saved: CommunityPost| {
        posts.update(|p| {
            p.update(saved);
        });
    });

    let on_delete = Callback::new(move |id: i64| {
        if !confirm("Delete this question and all its answers?") {
            return;
        }
        posts.update(|p| {
            p.remove(id);
        });
        let api = auth.api();
        spawn_local(async move {
            match api.send(&DeleteCommunityPost { id }).await {
                Ok(()) => notifier.success("Question deleted"),
                Err(e) => {
                    notifier.api_error("delete question", &e);
                    load.run(());
                }
            }
        });
    });

    let go_to = move |request: PageRequest| {
        page.set(request);
        load.run(());
    };

    let title = match scope {
        ListScope::All => "Community Q&A",
        ListScope::Mine => "My Questions",
    };

    view! {
        <div class="max-w-4xl mx-auto p-4 md:p-8 space-y-6">
            <div class="flex justify-between items-center">
                <h1 class="text-3xl font-bold">{title}</h1>
                <button class="btn btn-primary btn-sm" on:click=move |_| show_form.update(|s| *s = !*s)>
                    "Ask Question"
                </button>
            </div>

            <Show when=move || show_form.get()>
                <form class="card bg-base-100 shadow-xl" on:submit=on_create>
                    <div class="card-body">
                        <h2 class="card-title">"Ask a Question"</h2>
                        <FormError message=error_msg />
                        {bind_input!(form, title, "Title", "text")}
                        {bind_textarea!(form, description, "Description")}
                        <div class="card-actions justify-end">
                            <button type="button" class="btn btn-ghost btn-sm" on:click=move |_| show_form.set(false)>
                                "Cancel"
                            </button>
                            <button class="btn btn-primary btn-sm">"Post Your Question"</button>
                        </div>
                    </div>
                </form>
            </Show>

            <LoadGuard state=load_state on_retry=load>
                <Show
                    when=move || posts.with(|p| !p.is_empty())
                    fallback=|| view! { <EmptyState message="No questions yet." /> }
                >
                    <div class="space-y-6">
                        <For
                            each=move || posts.with(|p| p.items().to_vec())
                            key=|p| (p.id, p.title.clone(), p.description.clone(), p.comments.iter().map(|c| c.id).collect::<Vec<_>>())
                            children=move |post| {
                                let can_modify = {
                                    let post = post.clone();
                                    Signal::derive(move || auth.viewer().is_some_and(|v| post.can_modify(&v)))
                                };
                                view! {
                                    <CommunityPostCard
                                        post=post
                                        can_modify=can_modify
                                        on_updated=on_updated
                                        on_delete=on_delete
                                    />
                                }
                            }
                        />
                    </div>
                </Show>

                <div class="join flex justify-center">
                    <button
                        class="join-item btn btn-sm"
                        disabled=move || page.with(|p| p.page == 0)
                        on:click=move |_| go_to(page.get_untracked().previous())
                    >
                        "«"
                    </button>
                    <button class="join-item btn btn-sm btn-disabled">
                        {move || format!("Page {}", page.with(|p| p.page) + 1)}
                    </button>
                    <button
                        class="join-item btn btn-sm"
                        disabled=move || is_last.get()
                        on:click=move |_| go_to(page.get_untracked().next())
                    >
                        "»"
                    </button>
                </div>
            </LoadGuard>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use technest_shared::Role;

    fn viewer() -> Viewer {
        Viewer {
            id: Some(7),
            email: "ada@technest.dev".into(),
            role: Role::User,
        }
    }

    #[test]
    fn placeholder_comment_belongs_to_viewer() {
        let comment = placeholder_comment(-1, "Try cargo clean", Some(&viewer()));
        assert_eq!(comment.user_id, Some(7));
        assert_eq!(comment.username.as_deref(), Some("ada@technest.dev"));
        assert!(comment.can_modify(&viewer()));
    }

    #[test]
    fn server_author_fields_win_over_viewer() {
        let saved = CommunityComment {
            id: 11,
            content: "ok".into(),
            user_id: Some(3),
            username: None,
            created_at: None,
        };
        let filled = fill_author(saved, Some(&viewer()));
        assert_eq!(filled.user_id, Some(3));
        assert_eq!(filled.username.as_deref(), Some("ada@technest.dev"));
    }
}
