use crate::auth::use_auth;
use crate::components::common::{
    EmptyState, FormError, LoadGuard, bind_input, bind_textarea, confirm, use_cancel_token,
};
use crate::config::POSTS_PAGE_SIZE;
use crate::notify::use_notifier;
use crate::resource::{LikeAction, LikeToggle, ListState, LoadState};
use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;
use technest_shared::date::display_datetime;
use technest_shared::protocol::{
    CommentOnPost, DeletePost, LikePost, LikeStatus, ListPostComments, ListPosts, SharePost,
    UnlikePost,
};
use technest_shared::social::{CommentRequest, PostDraft};
use technest_shared::validation::PostForm;
use technest_shared::{ListScope, Owned, PageRequest, Post, PostComment, Viewer};
use web_sys::FileList;

/// 帖子文本与可选的媒体文件
type PostSubmission = (PostDraft, Option<FileList>);

/// 发帖请求返回前显示的占位帖子
fn placeholder_post(id: i64, draft: &PostDraft, viewer: Option<&Viewer>) -> Post {
    Post {
        id,
        title: draft.title.clone(),
        description: draft.description.clone(),
        media_urls: Vec::new(),
        author_id: viewer.and_then(|v| v.id),
        username: viewer.map(|v| v.email.clone()),
        created_at: None,
        like_count: 0,
        share_count: 0,
        comments: Vec::new(),
    }
}

fn placeholder_comment(id: i64, content: &str, viewer: Option<&Viewer>) -> PostComment {
    PostComment {
        id,
        content: content.to_string(),
        user_id: viewer.and_then(|v| v.id),
        username: viewer.map(|v| v.email.clone()),
        created_at: None,
    }
}

// =========================================================
// 发帖 / 编辑
// =========================================================

/// 发帖/编辑表单，只负责校验；请求与列表状态由页面处理
#[component]
fn PostEditor(
    post: Option<Post>,
    on_submit: Callback<PostSubmission>,
    #[prop(optional)] on_cancel: Option<Callback<()>>,
) -> impl IntoView {
    let post_id = post.as_ref().map(|p| p.id);
    let form = RwSignal::new(
        post.map(|p| PostForm {
            title: p.title,
            description: p.description,
        })
        .unwrap_or_default(),
    );
    let files_ref = NodeRef::<Input>::new();
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let draft = match form.with_untracked(PostForm::validate) {
            Ok(draft) => draft,
            Err(e) => {
                set_error_msg.set(Some(e.to_string()));
                return;
            }
        };
        set_error_msg.set(None);

        let input = files_ref.get_untracked();
        let files = input.as_ref().and_then(|i| i.files());
        on_submit.run((draft, files));
        if post_id.is_none() {
            form.set(PostForm::default());
            if let Some(input) = input {
                input.set_value("");
            }
        }
    };

    view! {
        <form class="card bg-base-100 shadow-xl" on:submit=on_submit>
            <div class="card-body">
                <h2 class="card-title">
                    {if post_id.is_some() { "Edit Post" } else { "Create New Post" }}
                </h2>
                <FormError message=error_msg />
                {bind_input!(form, title, "Title", "text")}
                {bind_textarea!(form, description, "Description")}
                <div class="form-control">
                    <label class="label">
                        <span class="label-text">"Images"</span>
                    </label>
                    <input
                        type="file"
                        multiple
                        accept="image/*"
                        class="file-input file-input-bordered file-input-sm w-full"
                        node_ref=files_ref
                    />
                </div>
                <div class="card-actions justify-end mt-2">
                    {on_cancel.map(|cancel| view! {
                        <button type="button" class="btn btn-ghost btn-sm" on:click=move |_| cancel.run(())>
                            "Cancel"
                        </button>
                    })}
                    <button class="btn btn-primary btn-sm">"Publish"</button>
                </div>
            </div>
        </form>
    }
}

// =========================================================
// 帖子卡片
// =========================================================

#[component]
fn PostCard(
    post: Post,
    #[prop(into)] can_modify: Signal<bool>,
    /// 服务端计数变化后刷新列表
    on_changed: Callback<()>,
    on_edit: Callback<Post>,
    on_delete: Callback<i64>,
) -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();
    let cancel = use_cancel_token();

    let id = post.id;
    let pending = id < 0;
    // 服务端点赞状态返回前不可点击
    let like = RwSignal::new(LikeToggle::unresolved());
    let comments = RwSignal::new(ListState::<PostComment>::default());
    let show_comments = RwSignal::new(false);
    let draft = RwSignal::new(String::new());

    let refresh_like = Callback::new({
        let cancel = cancel.clone();
        move |()| {
            let api = auth.api();
            let cancel = cancel.clone();
            spawn_local(async move {
                match api.send_with(&LikeStatus { id }, &cancel).await {
                    Ok(liked) => like.update(|l| l.reconcile(liked)),
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => {
                        log_warn!("[Posts] like status for {} unavailable: {}", id, e);
                        like.update(LikeToggle::settle);
                    }
                }
            });
        }
    });

    let load_comments = Callback::new({
        let cancel = cancel.clone();
        move |()| {
            let api = auth.api();
            let cancel = cancel.clone();
            spawn_local(async move {
                match api.send_with(&ListPostComments { id }, &cancel).await {
                    Ok(list) => comments.update(|c| c.replace_all(list)),
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => log_warn!("[Posts] comments for {} unavailable: {}", id, e),
                }
            });
        }
    });

    if !pending {
        refresh_like.run(());
        load_comments.run(());
    }

    let on_like = move |_| {
        let Some(Some(action)) = like.try_update(LikeToggle::begin) else {
            return;
        };
        let api = auth.api();
        spawn_local(async move {
            let result = match action {
                LikeAction::Like => api.send(&LikePost::new(id)).await,
                LikeAction::Unlike => api.send(&UnlikePost { id }).await,
            };
            match result {
                Ok(()) => like.update(LikeToggle::settle),
                Err(e) => {
                    notifier.api_error("like", &e);
                    refresh_like.run(());
                }
            }
            on_changed.run(());
        });
    };

    let on_comment = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let content = draft.get_untracked().trim().to_string();
        if content.is_empty() {
            return;
        }
        let viewer = auth.viewer();
        comments.update(|c| {
            let temp = c.temp_id();
            c.insert_optimistic(placeholder_comment(temp, &content, viewer.as_ref()));
        });
        draft.set(String::new());
        show_comments.set(true);

        let api = auth.api();
        spawn_local(async move {
            match api.send(&CommentOnPost { id, body: CommentRequest { content } }).await {
                Ok(()) => on_changed.run(()),
                Err(e) => notifier.api_error("comment", &e),
            }
            // 评论接口不返回实体，占位评论由服务端列表替换
            load_comments.run(());
        });
    };

    let on_share = move |_| {
        let api = auth.api();
        spawn_local(async move {
            match api.send(&SharePost::new(id)).await {
                Ok(()) => {
                    notifier.success("Post shared");
                    on_changed.run(());
                }
                Err(e) => notifier.api_error("share", &e),
            }
        });
    };

    let author = post.username.clone().unwrap_or_else(|| "Anonymous".into());
    let posted_at = post.created_at.as_deref().map(display_datetime).unwrap_or_default();
    let editable = post.clone();

    view! {
        <div class="card bg-base-100 shadow-xl" class:opacity-60=pending>
            <div class="card-body">
                <div class="flex items-center gap-3">
                    <div class="avatar placeholder">
                        <div class="bg-primary text-primary-content rounded-full w-10">
                            <span>{post.initial().to_string()}</span>
                        </div>
                    </div>
                    <div class="flex-1">
                        <p class="font-medium">{author}</p>
                        <p class="text-xs text-base-content/60">{posted_at}</p>
                    </div>
                    <Show when=move || !pending && can_modify.get()>
                        <button class="btn btn-ghost btn-xs" on:click={
                            let editable = editable.clone();
                            move |_| on_edit.run(editable.clone())
                        }>
                            "Edit"
                        </button>
                        <button class="btn btn-ghost btn-xs text-error" on:click=move |_| on_delete.run(id)>
                            "Delete"
                        </button>
                    </Show>
                </div>

                <h2 class="card-title">{post.title.clone()}</h2>
                <p class="whitespace-pre-line">{post.description.clone()}</p>

                {post
                    .media_urls
                    .iter()
                    .map(|url| view! {
                        <img src=url.clone() alt="Post media" loading="lazy" class="rounded-box w-full max-h-96 object-cover" />
                    })
                    .collect_view()}

                <div class="flex gap-4 items-center mt-2">
                    <button
                        class=move || if like.with(LikeToggle::liked) { "btn btn-sm btn-primary" } else { "btn btn-sm btn-ghost" }
                        disabled=move || like.with(LikeToggle::is_pending)
                        on:click=on_like
                    >
                        {move || if like.with(LikeToggle::liked) { "Liked" } else { "Like" }}
                        <span class="badge badge-sm">{post.like_count}</span>
                    </button>
                    <button class="btn btn-sm btn-ghost" on:click=move |_| show_comments.update(|s| *s = !*s)>
                        "Comments"
                        <span class="badge badge-sm">{move || comments.with(|c| c.items().len())}</span>
                    </button>
                    <button class="btn btn-sm btn-ghost" disabled=pending on:click=on_share>
                        "Share"
                        <span class="badge badge-sm">{post.share_count}</span>
                    </button>
                </div>

                <form class="join w-full" class:hidden=pending on:submit=on_comment>
                    <input
                        type="text"
                        placeholder="Add a comment..."
                        class="input input-bordered input-sm join-item flex-1"
                        prop:value=move || draft.get()
                        on:input=move |ev| draft.set(event_target_value(&ev))
                    />
                    <button class="btn btn-primary btn-sm join-item">"Post"</button>
                </form>

                <Show when=move || show_comments.get() && comments.with(|c| !c.is_empty())>
                    <div class="space-y-2">
                        {move || {
                            comments
                                .with(|c| c.items().to_vec())
                                .into_iter()
                                .map(|c| view! {
                                    <div class="bg-base-200 rounded-box p-3 text-sm" class:opacity-60=c.id < 0>
                                        <p>{c.content}</p>
                                        <p class="text-xs text-base-content/60 mt-1">
                                            {c.username.unwrap_or_else(|| "Anonymous".into())}
                                            {c.created_at.as_deref().map(|t| format!(" · {}", display_datetime(t)))}
                                        </p>
                                    </div>
                                })
                                .collect_view()
                        }}
                    </div>
                </Show>
            </div>
        </div>
    }
}

// =========================================================
// 列表页
// =========================================================

#[component]
pub fn PostsPage(scope: ListScope) -> impl IntoView {
    let auth = use_auth();
    let notifier = use_notifier();
    let cancel = use_cancel_token();

    let posts = RwSignal::new(ListState::<Post>::default());
    let page = RwSignal::new(PageRequest::first(POSTS_PAGE_SIZE));
    let total_pages = RwSignal::new(1u32);
    let is_last = RwSignal::new(true);
    let load_state = RwSignal::new(LoadState::Loading);
    let editing = RwSignal::new(Option::<Post>::None);

    let load = Callback::new(move |()| {
        let api = auth.api();
        let cancel = cancel.clone();
        let request = ListPosts {
            scope,
            page: page.get_untracked(),
        };
        if load_state.with_untracked(|s| s.error().is_some()) {
            load_state.set(LoadState::Loading);
        }
        spawn_local(async move {
            match api.send_with(&request, &cancel).await {
                Ok(result) => {
                    let result = result.into_page();
                    total_pages.set(result.total_pages.max(1));
                    is_last.set(result.last);
                    posts.update(|p| p.replace_all(result.content));
                    load_state.set(LoadState::Ready);
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    if load_state.get_untracked().is_loading() {
                        load_state.set(LoadState::Failed("Failed to fetch posts. Please try again.".into()));
                    }
                    notifier.api_error("posts", &e);
                }
            }
        });
    });
    load.run(());

    // 先插入占位帖子，成功后替换为服务端实体，失败则重新拉取列表
    let on_create = Callback::new(move |(draft, files): PostSubmission| {
        let viewer = auth.viewer();
        let temp = posts
            .try_update(|p| {
                let temp = p.temp_id();
                p.insert_optimistic(placeholder_post(temp, &draft, viewer.as_ref()));
                temp
            })
            .unwrap_or(-1);

        let api = auth.api();
        spawn_local(async move {
            match api.save_post(None, &draft, files).await {
                Ok(saved) => {
                    posts.update(|p| p.confirm(temp, saved));
                    notifier.success("Post created");
                }
                Err(e) => {
                    posts.update(|p| {
                        p.remove(temp);
                    });
                    notifier.api_error("create post", &e);
                    load.run(());
                }
            }
        });
    });

    let on_update = Callback::new(move |(draft, files): PostSubmission| {
        let Some(previous) = editing.get_untracked() else {
            return;
        };
        let id = previous.id;
        editing.set(None);
        posts.update(|p| {
            p.update(Post {
                title: draft.title.clone(),
                description: draft.description.clone(),
                ..previous
            });
        });

        let api = auth.api();
        spawn_local(async move {
            match api.save_post(Some(id), &draft, files).await {
                Ok(saved) => {
                    posts.update(|p| {
                        p.update(saved);
                    });
                    notifier.success("Post updated");
                }
                Err(e) => {
                    notifier.api_error("update post", &e);
                    load.run(());
                }
            }
        });
    });

    let on_delete = Callback::new(move |id: i64| {
        if !confirm("Are you sure you want to delete this post?") {
            return;
        }
        posts.update(|p| {
            p.remove(id);
        });
        let api = auth.api();
        spawn_local(async move {
            match api.send(&DeletePost { id }).await {
                Ok(()) => notifier.success("Post deleted"),
                Err(e) => {
                    notifier.api_error("delete post", &e);
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
        ListScope::All => "Feed",
        ListScope::Mine => "My Posts",
    };

    view! {
        <div class="max-w-3xl mx-auto p-4 md:p-8 space-y-6">
            <div class="flex justify-between items-center">
                <h1 class="text-3xl font-bold">{title}</h1>
                <span class="text-sm text-base-content/60">
                    {move || {
                        let count = posts.with(|p| p.items().len());
                        format!("{} {}", count, if count == 1 { "post" } else { "posts" })
                    }}
                </span>
            </div>

            {move || match editing.get() {
                Some(post) => view! {
                    <PostEditor
                        post=Some(post)
                        on_submit=on_update
                        on_cancel=Callback::new(move |_| editing.set(None))
                    />
                }
                .into_any(),
                None => view! { <PostEditor post=None on_submit=on_create /> }.into_any(),
            }}

            <LoadGuard state=load_state on_retry=load>
                <Show
                    when=move || posts.with(|p| !p.is_empty())
                    fallback=move || {
                        let message = match scope {
                            ListScope::All => "No posts yet. Be the first to share something!",
                            ListScope::Mine => "You haven't created any posts yet.",
                        };
                        view! { <EmptyState message=message /> }
                    }
                >
                    <div class="space-y-6">
                        <For
                            each=move || posts.with(|p| p.items().to_vec())
                            key=|p| (p.id, p.like_count, p.share_count, p.title.clone(), p.description.clone(), p.media_urls.clone())
                            children=move |post| {
                                let can_modify = {
                                    let post = post.clone();
                                    Signal::derive(move || auth.viewer().is_some_and(|v| post.can_modify(&v)))
                                };
                                view! {
                                    <PostCard
                                        post=post
                                        can_modify=can_modify
                                        on_changed=load
                                        on_edit=Callback::new(move |p| editing.set(Some(p)))
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
                        {move || format!("Page {} of {}", page.with(|p| p.page) + 1, total_pages.get())}
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

    fn saved_post(id: i64, title: &str) -> Post {
        Post {
            id,
            author_id: Some(7),
            like_count: 3,
            ..placeholder_post(
                id,
                &PostDraft {
                    title: title.into(),
                    description: "body".into(),
                },
                None,
            )
        }
    }

    #[test]
    fn new_post_shows_before_the_server_answers_and_is_then_replaced() {
        let mut posts = ListState::new(vec![saved_post(1, "older")]);
        let draft = PostDraft {
            title: "Hello".into(),
            description: "First post".into(),
        };

        let temp = posts.temp_id();
        posts.insert_optimistic(placeholder_post(temp, &draft, Some(&viewer())));
        assert_eq!(posts.items().len(), 2);
        let shown = &posts.items()[0];
        assert_eq!(shown.id, temp);
        assert_eq!(shown.title, "Hello");
        assert_eq!(shown.username.as_deref(), Some("ada@technest.dev"));
        assert!(shown.can_modify(&viewer()));

        posts.confirm(temp, saved_post(42, "Hello"));
        assert_eq!(posts.items().len(), 2);
        assert_eq!(posts.items()[0].id, 42);
        assert!(posts.get(temp).is_none());
    }

    #[test]
    fn failed_post_placeholder_can_be_dropped() {
        let mut posts = ListState::new(vec![saved_post(1, "older")]);
        let temp = posts.temp_id();
        posts.insert_optimistic(placeholder_post(temp, &PostDraft::default(), None));
        assert!(posts.remove(temp).is_some());
        assert_eq!(posts.items(), &[saved_post(1, "older")]);
    }

    #[test]
    fn comment_placeholder_is_attributed_to_viewer() {
        let comment = placeholder_comment(-1, "Nice", Some(&viewer()));
        assert_eq!(comment.user_id, Some(7));
        assert!(comment.can_modify(&viewer()));
    }
}
