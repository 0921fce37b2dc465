//! 会话存储模块
//!
//! 持久化当前用户的 token / userId / roleId，页面刷新后依然有效。
//! 存储介质通过 `KeyValueStore` 注入，任何读写失败都不会传播给调用方：
//! 存储不可用时会话退化为"未登录"，由路由守卫引导到登录页。

use crate::web::guard::Access;
use crate::web::{KeyValueStore, LocalStorage};
use classhub_shared::{
    AuthResponse, Role, STORAGE_KEY_ROLE_ID, STORAGE_KEY_TOKEN, STORAGE_KEY_USER_ID,
};
use leptos::logging::warn;

/// 当前会话快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub role: Option<Role>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// 路由守卫所需的最小信息
    pub fn access(&self) -> Access {
        if self.is_authenticated() {
            Access::signed_in(self.role)
        } else {
            Access::anonymous()
        }
    }
}

/// 会话存储
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStore<S = LocalStorage> {
    storage: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// 写入完整会话；任一字段写入失败时整体回滚为未登录
    pub fn set(&self, token: &str, user_id: &str, role_id: &str) {
        let written = self.storage.set(STORAGE_KEY_TOKEN, token)
            && self.storage.set(STORAGE_KEY_USER_ID, user_id)
            && self.storage.set(STORAGE_KEY_ROLE_ID, role_id);
        if !written {
            self.clear();
            warn!("[Session] Storage unavailable, session not persisted.");
        }
    }

    /// 保存登录/注册接口返回的凭据，角色 ID 原样写入
    pub fn store(&self, auth: &AuthResponse) {
        let role_id = auth
            .role_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default();
        self.set(&auth.token, &auth.user_id, &role_id);
    }

    pub fn get(&self) -> Session {
        Session {
            token: self.token(),
            user_id: self.user_id(),
            role: self.role(),
        }
    }

    /// 清除会话（幂等）
    pub fn clear(&self) {
        self.storage.delete(STORAGE_KEY_TOKEN);
        self.storage.delete(STORAGE_KEY_USER_ID);
        self.storage.delete(STORAGE_KEY_ROLE_ID);
    }

    pub fn token(&self) -> Option<String> {
        non_empty(self.storage.get(STORAGE_KEY_TOKEN))
    }

    pub fn user_id(&self) -> Option<String> {
        non_empty(self.storage.get(STORAGE_KEY_USER_ID))
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// 解析存储的角色标识，缺失或非法时返回 `None`
    pub fn role(&self) -> Option<Role> {
        self.storage
            .get(STORAGE_KEY_ROLE_ID)
            .and_then(|raw| Role::parse_id(&raw))
    }
}

// 空字符串与缺失等价
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::MemoryStorage;
    use classhub_shared::RawRoleId;

    fn store() -> (SessionStore<MemoryStorage>, MemoryStorage) {
        let storage = MemoryStorage::new();
        (SessionStore::new(storage.clone()), storage)
    }

    #[test]
    fn test_set_then_role_is_teacher() {
        let (session, _) = store();
        session.set("t1", "u1", "3");
        assert_eq!(session.role(), Some(Role::Teacher));
        assert!(session.is_authenticated());
        assert_eq!(
            session.get(),
            Session {
                token: Some("t1".to_string()),
                user_id: Some("u1".to_string()),
                role: Some(Role::Teacher),
            }
        );
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (session, storage) = store();
        session.set("t1", "u1", "1");
        session.clear();
        assert!(!session.is_authenticated());
        assert_eq!(storage.len(), 0);

        session.clear();
        assert_eq!(session.get(), Session::default());
    }

    #[test]
    fn test_uses_wire_key_names() {
        let (session, storage) = store();
        session.set("t1", "u1", "2");
        assert_eq!(storage.get("token").as_deref(), Some("t1"));
        assert_eq!(storage.get("userId").as_deref(), Some("u1"));
        assert_eq!(storage.get("roleId").as_deref(), Some("2"));
    }

    #[test]
    fn test_malformed_role_is_absent() {
        let (session, storage) = store();
        session.set("t1", "u1", "admin");
        assert_eq!(session.role(), None);
        assert!(session.is_authenticated());

        storage.set("roleId", "7");
        assert_eq!(session.role(), None);
    }

    #[test]
    fn test_token_without_role_is_authenticated() {
        let (session, storage) = store();
        storage.set("token", "t1");
        let access = session.get().access();
        assert!(access.is_authenticated);
        assert_eq!(access.role, None);
    }

    #[test]
    fn test_empty_token_is_not_authenticated() {
        let (session, storage) = store();
        storage.set("token", "");
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_unavailable_storage_degrades_to_logged_out() {
        let session = SessionStore::new(MemoryStorage::unavailable());
        session.set("t1", "u1", "3");
        assert!(!session.is_authenticated());
        assert_eq!(session.role(), None);
        session.clear();
    }

    #[test]
    fn test_store_auth_response() {
        let (session, storage) = store();
        session.store(&AuthResponse {
            token: "abc".to_string(),
            user_id: "42".to_string(),
            role_id: Some(Role::Parent.into()),
        });
        assert_eq!(storage.get("roleId").as_deref(), Some("2"));
        assert_eq!(session.role(), Some(Role::Parent));
    }

    #[test]
    fn test_store_keeps_unknown_role_verbatim() {
        let (session, storage) = store();
        session.store(&AuthResponse {
            token: "abc".to_string(),
            user_id: "42".to_string(),
            role_id: Some(RawRoleId::Number(4)),
        });
        assert_eq!(storage.get("roleId").as_deref(), Some("4"));
        assert!(session.is_authenticated());
        assert_eq!(session.role(), None);
    }

    #[test]
    fn test_partial_write_rolls_back() {
        let storage = MemoryStorage::rejecting("roleId");
        let session = SessionStore::new(storage.clone());
        session.set("t1", "u1", "3");

        assert_eq!(storage.len(), 0);
        assert!(!session.is_authenticated());
        assert_eq!(session.get(), Session::default());
    }
}
