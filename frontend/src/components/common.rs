//! 页面间复用的小组件

use crate::resource::{CancelToken, LoadState};
use leptos::prelude::*;

/// 创建与当前组件生命周期绑定的取消令牌，组件卸载时中止所有未完成请求
pub fn use_cancel_token() -> CancelToken {
    let token = CancelToken::new();
    on_cleanup({
        let token = token.clone();
        move || token.cancel()
    });
    token
}

/// 输入框绑定到 `RwSignal<表单>` 的一个字符串字段
macro_rules! bind_input {
    ($form:ident, $field:ident, $label:expr, $kind:expr) => {
        view! {
            <div class="form-control">
                <label class="label">
                    <span class="label-text">{$label}</span>
                </label>
                <input
                    type=$kind
                    class="input input-bordered"
                    prop:value=move || $form.with(|f| f.$field.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        $form.update(|f| f.$field = value);
                    }
                />
            </div>
        }
    };
}

macro_rules! bind_textarea {
    ($form:ident, $field:ident, $label:expr) => {
        view! {
            <div class="form-control">
                <label class="label">
                    <span class="label-text">{$label}</span>
                </label>
                <textarea
                    class="textarea textarea-bordered h-28"
                    prop:value=move || $form.with(|f| f.$field.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        $form.update(|f| f.$field = value);
                    }
                ></textarea>
            </div>
        }
    };
}

pub(crate) use bind_input;
pub(crate) use bind_textarea;

#[component]
pub fn Spinner() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center py-16">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

/// 表单内联错误
#[component]
pub fn FormError(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.with(Option::is_some)>
            <div role="alert" class="alert alert-error text-sm py-2">
                <span>{move || message.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}

/// 列表首次加载的三态外壳：加载中、失败可重试、就绪后渲染子内容
#[component]
pub fn LoadGuard(
    #[prop(into)] state: Signal<LoadState>,
    on_retry: Callback<()>,
    children: ChildrenFn,
) -> impl IntoView {
    move || match state.get() {
        LoadState::Loading => view! { <Spinner /> }.into_any(),
        LoadState::Failed(message) => view! {
            <div class="card bg-base-100 shadow max-w-lg mx-auto my-8">
                <div class="card-body items-center text-center">
                    <p class="text-error">{message}</p>
                    <button class="btn btn-primary btn-sm" on:click=move |_| on_retry.run(())>
                        "Try again"
                    </button>
                </div>
            </div>
        }
        .into_any(),
        LoadState::Ready => children().into_any(),
    }
}

/// 空列表提示
#[component]
pub fn EmptyState(#[prop(into)] message: String) -> impl IntoView {
    view! {
        <div class="text-center py-12 text-base-content/50">{message}</div>
    }
}

/// 危险操作前的浏览器确认框
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}
