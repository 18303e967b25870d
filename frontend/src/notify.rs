//! 全局通知
//!
//! 页面通过 [`use_notifier`] 发出成功/失败提示，`NotificationToast` 在根部统一渲染，
//! 3 秒后自动消失，也可手动关闭。

use crate::auth::AuthContext;
use crate::config::NOTIFICATION_TTL;
use crate::error::ApiError;
use gloo_timers::callback::Timeout;
use leptos::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

#[derive(Clone, Copy)]
pub struct Notifier {
    current: RwSignal<Option<Notification>>,
    auth: AuthContext,
}

impl Notifier {
    pub fn new(auth: AuthContext) -> Self {
        Self {
            current: RwSignal::new(None),
            auth,
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(NotificationKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(NotificationKind::Error, message.into());
    }

    fn show(&self, kind: NotificationKind, message: String) {
        self.current.set(Some(Notification { kind, message }));
    }

    pub fn dismiss(&self) {
        self.current.set(None);
    }

    /// 请求失败的统一处理
    ///
    /// 取消静默丢弃；401/403 结束会话（路由守卫随后跳转到登录页）；其余显示错误提示。
    pub fn api_error(&self, context: &str, err: &ApiError) {
        if err.is_cancelled() {
            return;
        }
        if err.is_unauthorized() {
            log_warn!("[Api] {}: unauthorized, ending session", context);
            self.auth.logout();
        } else {
            log_error!("[Api] {}: {}", context, err);
        }
        self.error(err.user_message());
    }
}

pub fn provide_notifier(auth: AuthContext) -> Notifier {
    let notifier = Notifier::new(auth);
    provide_context(notifier);
    notifier
}

pub fn use_notifier() -> Notifier {
    use_context::<Notifier>().expect("Notifier should be provided")
}

#[component]
pub fn NotificationToast() -> impl IntoView {
    let notifier = use_notifier();
    let current = notifier.current;

    // 3秒后清除通知
    Effect::new(move |_| {
        if let Some(shown) = current.get() {
            Timeout::new(NOTIFICATION_TTL.as_millis() as u32, move || {
                if current.get_untracked().as_ref() == Some(&shown) {
                    current.set(None);
                }
            })
            .forget();
        }
    });

    view! {
        {move || {
            current
                .get()
                .map(|n| {
                    let class = match n.kind {
                        NotificationKind::Success => "alert alert-success shadow-lg",
                        NotificationKind::Error => "alert alert-error shadow-lg",
                    };
                    view! {
                        <div class="toast toast-top toast-end z-50">
                            <div class=class>
                                <span>{n.message}</span>
                                <button
                                    class="btn btn-ghost btn-xs"
                                    on:click=move |_| notifier.dismiss()
                                >
                                    "✕"
                                </button>
                            </div>
                        </div>
                    }
                })
        }}
    }
}
