//! 键值存储封装模块
//!
//! 使用 `web_sys::Storage` 提供简洁的本地存储接口，
//! 并抽象出 `KeyValueStore` 以便注入内存实现（测试替身）。
//! 所有操作都不会向调用方抛错：存储不可用时读取返回 `None`，写入静默失败。

#[cfg(test)]
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// 字符串键值存储
pub trait KeyValueStore {
    /// 获取存储的字符串值，键不存在或存储不可用时返回 `None`
    fn get(&self, key: &str) -> Option<String>;

    /// 设置存储值，返回操作是否成功
    fn set(&self, key: &str, value: &str) -> bool;

    /// 删除存储的键值对，返回操作是否成功
    fn delete(&self, key: &str) -> bool;
}

/// 浏览器 LocalStorage
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    /// 获取 LocalStorage 实例
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn delete(&self, key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

/// 内存存储（测试替身）
///
/// 克隆后共享同一份数据。`unavailable()` 模拟无法访问的存储介质。
#[cfg(test)]
#[derive(Clone, Debug)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
    available: bool,
    // 写入该键时失败（模拟配额耗尽）
    rejected_key: Option<&'static str>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            entries: Rc::default(),
            available: true,
            rejected_key: None,
        }
    }

    pub fn rejecting(key: &'static str) -> Self {
        Self {
            rejected_key: Some(key),
            ..Self::new()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            entries: Rc::default(),
            available: false,
            rejected_key: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        if !self.available {
            return None;
        }
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        if !self.available || self.rejected_key == Some(key) {
            return false;
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        if !self.available {
            return false;
        }
        self.entries.borrow_mut().remove(key);
        true
    }
}
