use crate::model::{Permission, Role};
use crate::types::{PermissionId, RoleId};
use async_trait::async_trait;

/// Read-through cache for role and permission lookups.
///
/// Entries are keyed by entity kind and id. The cache is never authoritative:
/// a miss always falls back to the store.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a cached role.
    async fn get_role(&self, id: &RoleId) -> Option<Role>;

    /// Caches a role.
    async fn set_role(&self, role: Role);

    /// Gets a cached permission.
    async fn get_permission(&self, id: &PermissionId) -> Option<Permission>;

    /// Caches a permission.
    async fn set_permission(&self, permission: Permission);

    /// Invalidates a cached role.
    async fn invalidate_role(&self, id: &RoleId);

    /// Invalidates a cached permission.
    async fn invalidate_permission(&self, id: &PermissionId);

    /// Drops every entry.
    async fn clear(&self);
}

/// No-op cache implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

#[async_trait]
impl Cache for NoCache {
    async fn get_role(&self, _id: &RoleId) -> Option<Role> {
        None
    }

    async fn set_role(&self, _role: Role) {}

    async fn get_permission(&self, _id: &PermissionId) -> Option<Permission> {
        None
    }

    async fn set_permission(&self, _permission: Permission) {}

    async fn invalidate_role(&self, _id: &RoleId) {}

    async fn invalidate_permission(&self, _id: &PermissionId) {}

    async fn clear(&self) {}
}
