//! LocalStorage 封装模块
//!
//! 会话层只依赖 [`KeyValueStore`] trait，测试中替换为内存实现。
//! 浏览器实现基于 `gloo-storage` 的原始 `web_sys::Storage`，
//! 按原样读写字符串而不做 JSON 编码。

use gloo_storage::{LocalStorage as BrowserStorage, Storage};

/// 同步键值存储
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// 写入失败（配额、隐私模式）时返回 `false`
    fn set(&self, key: &str, value: &str) -> bool;

    fn delete(&self, key: &str);
}

/// 浏览器 LocalStorage
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        BrowserStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        BrowserStorage::raw().set_item(key, value).is_ok()
    }

    fn delete(&self, key: &str) {
        BrowserStorage::delete(key);
    }
}
