use crate::model::{Permission, PermissionGrant, Role, RoleAssignment};
use crate::store::{AssignmentStore, PermissionStore, RoleStore};
use crate::types::{PermissionId, RoleId, UserId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// In-memory store implementation for tests and demos.
///
/// Every create runs its existence check and insert under one write lock.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    roles: RwLock<HashMap<RoleId, Role>>,
    permissions: RwLock<HashMap<PermissionId, Permission>>,
    user_roles: RwLock<HashMap<UserId, Vec<RoleId>>>,
    role_grants: RwLock<HashMap<RoleId, HashSet<PermissionId>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored role assignments.
    pub fn role_assignment_count(&self) -> usize {
        let guard = self.inner.user_roles.read().expect("poisoned lock");
        guard.values().map(Vec::len).sum()
    }

    /// Returns the number of stored permission grants.
    pub fn permission_grant_count(&self) -> usize {
        let guard = self.inner.role_grants.read().expect("poisoned lock");
        guard.values().map(HashSet::len).sum()
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn role(&self, id: &RoleId) -> std::result::Result<Option<Role>, crate::StoreError> {
        let guard = self.inner.roles.read().expect("poisoned lock");
        Ok(guard.get(id).cloned())
    }

    async fn create_role(&self, role: Role) -> std::result::Result<bool, crate::StoreError> {
        let mut guard = self.inner.roles.write().expect("poisoned lock");
        if guard.contains_key(&role.id) {
            return Ok(false);
        }
        guard.insert(role.id.clone(), role);
        Ok(true)
    }
}

#[async_trait]
impl PermissionStore for MemoryStore {
    async fn permission(
        &self,
        id: &PermissionId,
    ) -> std::result::Result<Option<Permission>, crate::StoreError> {
        let guard = self.inner.permissions.read().expect("poisoned lock");
        Ok(guard.get(id).cloned())
    }

    async fn create_permission(
        &self,
        permission: Permission,
    ) -> std::result::Result<bool, crate::StoreError> {
        let mut guard = self.inner.permissions.write().expect("poisoned lock");
        if guard.contains_key(&permission.id) {
            return Ok(false);
        }
        guard.insert(permission.id.clone(), permission);
        Ok(true)
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn user_roles(&self, user: &UserId) -> std::result::Result<Vec<RoleId>, crate::StoreError> {
        let guard = self.inner.user_roles.read().expect("poisoned lock");
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    async fn has_role_assignment(
        &self,
        user: &UserId,
        role: &RoleId,
    ) -> std::result::Result<bool, crate::StoreError> {
        let guard = self.inner.user_roles.read().expect("poisoned lock");
        Ok(guard
            .get(user)
            .is_some_and(|roles| roles.contains(role)))
    }

    async fn create_role_assignment(
        &self,
        assignment: RoleAssignment,
    ) -> std::result::Result<bool, crate::StoreError> {
        let mut guard = self.inner.user_roles.write().expect("poisoned lock");
        let roles = guard.entry(assignment.user).or_default();
        if roles.contains(&assignment.role) {
            return Ok(false);
        }
        roles.push(assignment.role);
        Ok(true)
    }

    async fn delete_role_assignment(
        &self,
        assignment: &RoleAssignment,
    ) -> std::result::Result<bool, crate::StoreError> {
        let mut guard = self.inner.user_roles.write().expect("poisoned lock");
        let Some(roles) = guard.get_mut(&assignment.user) else {
            return Ok(false);
        };
        let before = roles.len();
        roles.retain(|role| role != &assignment.role);
        Ok(roles.len() != before)
    }

    async fn role_grants(
        &self,
        role: &RoleId,
    ) -> std::result::Result<Vec<PermissionId>, crate::StoreError> {
        let guard = self.inner.role_grants.read().expect("poisoned lock");
        Ok(guard
            .get(role)
            .map(|perms| perms.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn has_permission_grant(
        &self,
        role: &RoleId,
        permission: &PermissionId,
    ) -> std::result::Result<bool, crate::StoreError> {
        let guard = self.inner.role_grants.read().expect("poisoned lock");
        Ok(guard
            .get(role)
            .is_some_and(|perms| perms.contains(permission)))
    }

    async fn create_permission_grant(
        &self,
        grant: PermissionGrant,
    ) -> std::result::Result<bool, crate::StoreError> {
        let mut guard = self.inner.role_grants.write().expect("poisoned lock");
        Ok(guard.entry(grant.role).or_default().insert(grant.permission))
    }

    async fn delete_permission_grant(
        &self,
        grant: &PermissionGrant,
    ) -> std::result::Result<bool, crate::StoreError> {
        let mut guard = self.inner.role_grants.write().expect("poisoned lock");
        Ok(guard
            .get_mut(&grant.role)
            .is_some_and(|perms| perms.remove(&grant.permission)))
    }
}
