//! 资源列表视图的共享状态
//!
//! - [`CancelToken`]: 绑定视图生命周期的取消令牌，视图卸载时中止所有未完成请求
//! - [`ListState`]: 乐观更新的列表，失败时由视图重新拉取权威数据
//! - [`LikeToggle`]: 点赞状态的乐观切换与对账

use crate::error::{ApiError, ApiResult};
use futures::future::{AbortHandle, Abortable};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use technest_shared::Entity;

// =========================================================
// 取消令牌 (Cancellation)
// =========================================================

#[derive(Default)]
struct CancelInner {
    cancelled: bool,
    handles: Vec<AbortHandle>,
}

/// 视图级取消令牌
///
/// 克隆共享同一状态。取消后所有经由 [`run`](Self::run) 的请求返回
/// [`ApiError::Cancelled`]，之后发起的请求也会立即被取消。
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Mutex<CancelInner>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CancelInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    pub fn cancel(&self) {
        let mut inner = self.lock();
        inner.cancelled = true;
        for handle in inner.handles.drain(..) {
            handle.abort();
        }
    }

    /// 在令牌下执行请求
    pub async fn run<T, F>(&self, request: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        let registration = {
            let mut inner = self.lock();
            if inner.cancelled {
                return Err(ApiError::Cancelled);
            }
            inner.handles.retain(|h| !h.is_aborted());
            let (handle, registration) = AbortHandle::new_pair();
            inner.handles.push(handle);
            registration
        };

        Abortable::new(request, registration)
            .await
            .unwrap_or(Err(ApiError::Cancelled))
    }
}

// =========================================================
// 加载状态 (Load State)
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    /// 首次加载失败，界面提供 "Try again"
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

// =========================================================
// 乐观列表 (Optimistic List)
// =========================================================

/// 支持乐观增删改的实体列表
///
/// 新建条目先以负数临时 id 插入，服务端返回后由 [`confirm`](Self::confirm) 替换。
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    items: Vec<T>,
    next_temp_id: i64,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_temp_id: -1,
        }
    }
}

impl<T: Entity + Clone> ListState<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// 用服务端返回的权威数据整体替换
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// 为乐观插入分配临时 id（始终为负，不会与服务端 id 冲突）
    pub fn temp_id(&mut self) -> i64 {
        let id = self.next_temp_id;
        self.next_temp_id -= 1;
        id
    }

    /// 乐观插入到列表头部
    pub fn insert_optimistic(&mut self, item: T) {
        self.items.insert(0, item);
    }

    /// 服务端确认后用真实实体替换临时条目；临时条目已不在时追加到头部
    pub fn confirm(&mut self, temp_id: i64, item: T) {
        match self.items.iter_mut().find(|i| i.id() == temp_id) {
            Some(slot) => *slot = item,
            None => self.items.insert(0, item),
        }
    }

    /// 按 id 替换，返回旧值
    pub fn update(&mut self, item: T) -> Option<T> {
        let slot = self.items.iter_mut().find(|i| i.id() == item.id())?;
        Some(std::mem::replace(slot, item))
    }

    /// 按 id 删除，返回旧值
    pub fn remove(&mut self, id: i64) -> Option<T> {
        let index = self.items.iter().position(|i| i.id() == id)?;
        Some(self.items.remove(index))
    }
}

// =========================================================
// 点赞 (Likes)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    Like,
    Unlike,
}

/// 单个帖子的点赞状态
///
/// 点击时立即翻转本地状态并返回要发送的动作；请求进行中的点击被忽略。
/// 失败后以服务端查询到的状态为准。计数始终以服务端为准，不在本地加减。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LikeToggle {
    liked: bool,
    pending: bool,
}

impl LikeToggle {
    pub fn new(liked: bool) -> Self {
        Self {
            liked,
            pending: false,
        }
    }

    /// 服务端状态未知；在 `reconcile`/`settle` 之前忽略点击
    pub fn unresolved() -> Self {
        Self {
            liked: false,
            pending: true,
        }
    }

    pub fn liked(&self) -> bool {
        self.liked
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn begin(&mut self) -> Option<LikeAction> {
        if self.pending {
            return None;
        }
        self.pending = true;
        let action = if self.liked {
            LikeAction::Unlike
        } else {
            LikeAction::Like
        };
        self.liked = !self.liked;
        Some(action)
    }

    pub fn settle(&mut self) {
        self.pending = false;
    }

    /// 请求失败后用服务端状态对账
    pub fn reconcile(&mut self, server_liked: bool) {
        self.liked = server_liked;
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::pending;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: i64,
        title: &'static str,
    }

    impl Entity for Item {
        fn id(&self) -> i64 {
            self.id
        }
    }

    fn item(id: i64, title: &'static str) -> Item {
        Item { id, title }
    }

    #[test]
    fn optimistic_insert_is_replaced_by_server_entity() {
        let mut list = ListState::new(vec![item(1, "old")]);
        let temp = list.temp_id();
        assert!(temp < 0);
        list.insert_optimistic(item(temp, "draft"));
        assert_eq!(list.items()[0].title, "draft");

        list.confirm(temp, item(10, "saved"));
        assert_eq!(list.items().len(), 2);
        assert_eq!(list.items()[0], item(10, "saved"));
        assert!(list.get(temp).is_none());
    }

    #[test]
    fn temp_ids_are_unique() {
        let mut list: ListState<Item> = ListState::default();
        let a = list.temp_id();
        let b = list.temp_id();
        assert_ne!(a, b);
    }

    #[test]
    fn update_and_remove_by_id() {
        let mut list = ListState::new(vec![item(1, "a"), item(2, "b")]);
        assert_eq!(list.update(item(2, "B")), Some(item(2, "b")));
        assert_eq!(list.get(2).map(|i| i.title), Some("B"));
        assert_eq!(list.update(item(3, "c")), None);

        assert_eq!(list.remove(1), Some(item(1, "a")));
        assert_eq!(list.remove(1), None);
        assert_eq!(list.items().len(), 1);
    }

    #[test]
    fn like_toggle_flips_and_ignores_double_clicks() {
        let mut like = LikeToggle::new(false);
        assert_eq!(like.begin(), Some(LikeAction::Like));
        assert!(like.liked());
        assert_eq!(like.begin(), None);
        like.settle();
        assert_eq!(like.begin(), Some(LikeAction::Unlike));
        assert!(!like.liked());
    }

    #[test]
    fn failed_like_reconciles_with_server() {
        let mut like = LikeToggle::new(false);
        like.begin();
        like.reconcile(false);
        assert!(!like.liked());
        assert!(!like.is_pending());
    }

    #[test]
    fn unresolved_like_ignores_clicks_until_server_answers() {
        let mut like = LikeToggle::unresolved();
        assert!(like.is_pending());
        assert_eq!(like.begin(), None);
        assert!(!like.liked());

        like.reconcile(true);
        assert_eq!(like.begin(), Some(LikeAction::Unlike));
    }

        #[tokio::test]
    async fn cancelled_token_rejects_new_requests() {
        let token = CancelToken::new();
        assert_eq!(token.run(async { Ok(5) }).await, Ok(5));
        token.cancel();
        assert!(token.is_cancelled());
        assert_eq!(
            token.run(async { Ok(6) }).await,
            Err(ApiError::Cancelled)
        );
    }

    #[tokio::test]
    async fn cancel_aborts_in_flight_requests() {
        let token = CancelToken::new();
        let canceller = token.clone();
        let request = token.run(pending::<ApiResult<()>>());
        let (result, _) = futures::join!(request, async move { canceller.cancel() });
        assert_eq!(result, Err(ApiError::Cancelled));
    }
}
