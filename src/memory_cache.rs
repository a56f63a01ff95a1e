use crate::cache::Cache;
use crate::model::{Permission, Role};
use crate::types::{PermissionId, RoleId};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// In-memory cache for role and permission rows.
///
/// This is a simple LRU cache bounded by entry count. Entries never expire on
/// their own; the engine invalidates them on write. Clones share state.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    inner: Arc<Mutex<CacheState>>,
    capacity: usize,
}

#[derive(Debug)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    order: VecDeque<CacheKey>,
}

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
enum CacheKey {
    Role(RoleId),
    Permission(PermissionId),
}

#[derive(Debug, Clone)]
enum CacheEntry {
    Role(Role),
    Permission(Permission),
}

impl MemoryCache {
    /// Creates a new cache with the given capacity.
    ///
    /// A capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheState {
                entries: HashMap::new(),
                order: VecDeque::new(),
            })),
            capacity,
        }
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("poisoned lock").entries.len()
    }

    /// Returns whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove_key(state: &mut CacheState, key: &CacheKey) {
        if state.entries.remove(key).is_some() {
            state.order.retain(|existing| existing != key);
        }
    }

    fn touch(state: &mut CacheState, key: &CacheKey) {
        state.order.retain(|existing| existing != key);
        state.order.push_back(key.clone());
    }

    fn evict_if_needed(state: &mut CacheState, capacity: usize) {
        while state.entries.len() > capacity {
            if let Some(key) = state.order.pop_front() {
                state.entries.remove(&key);
            } else {
                break;
            }
        }
    }

    fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        if self.capacity == 0 {
            return None;
        }

        let mut guard = self.inner.lock().expect("poisoned lock");
        let entry = guard.entries.get(key).cloned();
        if entry.is_some() {
            Self::touch(&mut guard, key);
        }
        entry
    }

    fn set(&self, key: CacheKey, entry: CacheEntry) {
        if self.capacity == 0 {
            return;
        }

        let mut guard = self.inner.lock().expect("poisoned lock");
        guard.entries.insert(key.clone(), entry);
        Self::touch(&mut guard, &key);
        Self::evict_if_needed(&mut guard, self.capacity);
    }

    fn invalidate(&self, key: &CacheKey) {
        let mut guard = self.inner.lock().expect("poisoned lock");
        Self::remove_key(&mut guard, key);
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get_role(&self, id: &RoleId) -> Option<Role> {
        match self.get(&CacheKey::Role(id.clone()))? {
            CacheEntry::Role(role) => Some(role),
            CacheEntry::Permission(_) => None,
        }
    }

    async fn set_role(&self, role: Role) {
        self.set(CacheKey::Role(role.id.clone()), CacheEntry::Role(role));
    }

    async fn get_permission(&self, id: &PermissionId) -> Option<Permission> {
        match self.get(&CacheKey::Permission(id.clone()))? {
            CacheEntry::Permission(permission) => Some(permission),
            CacheEntry::Role(_) => None,
        }
    }

    async fn set_permission(&self, permission: Permission) {
        self.set(
            CacheKey::Permission(permission.id.clone()),
            CacheEntry::Permission(permission),
        );
    }

    async fn invalidate_role(&self, id: &RoleId) {
        self.invalidate(&CacheKey::Role(id.clone()));
    }

    async fn invalidate_permission(&self, id: &PermissionId) {
        self.invalidate(&CacheKey::Permission(id.clone()));
    }

    async fn clear(&self) {
        let mut guard = self.inner.lock().expect("poisoned lock");
        guard.entries.clear();
        guard.order.clear();
    }
}
