use crate::error::StoreError;
use crate::model::{Permission, PermissionGrant, Role, RoleAssignment};
use crate::types::{PermissionId, RoleId, UserId};
use async_trait::async_trait;

/// Store interface for roles.
#[async_trait]
pub trait RoleStore {
    /// Returns the role with the given id.
    async fn role(&self, id: &RoleId) -> std::result::Result<Option<Role>, StoreError>;

    /// Inserts a role unless one with the same id exists.
    ///
    /// Returns `false` without writing when the id is taken. The check and the
    /// insert must be atomic.
    async fn create_role(&self, role: Role) -> std::result::Result<bool, StoreError>;
}

/// Store interface for registered permissions.
#[async_trait]
pub trait PermissionStore {
    /// Returns the permission with the given id.
    async fn permission(
        &self,
        id: &PermissionId,
    ) -> std::result::Result<Option<Permission>, StoreError>;

    /// Inserts a permission unless one with the same id exists.
    async fn create_permission(
        &self,
        permission: Permission,
    ) -> std::result::Result<bool, StoreError>;
}

/// Store interface for user-role assignments and role-permission grants.
///
/// Create operations are insert-if-absent and must be atomic, so concurrent
/// callers never produce duplicate rows.
#[async_trait]
pub trait AssignmentStore {
    /// Returns roles assigned to a user, in assignment order.
    async fn user_roles(&self, user: &UserId) -> std::result::Result<Vec<RoleId>, StoreError>;

    /// Returns whether the user holds the role directly.
    async fn has_role_assignment(
        &self,
        user: &UserId,
        role: &RoleId,
    ) -> std::result::Result<bool, StoreError>;

    /// Records an assignment. Returns `false` if it already existed.
    async fn create_role_assignment(
        &self,
        assignment: RoleAssignment,
    ) -> std::result::Result<bool, StoreError>;

    /// Removes an assignment. Returns `false` if there was nothing to remove.
    async fn delete_role_assignment(
        &self,
        assignment: &RoleAssignment,
    ) -> std::result::Result<bool, StoreError>;

    /// Returns permissions granted directly to a role.
    async fn role_grants(&self, role: &RoleId)
    -> std::result::Result<Vec<PermissionId>, StoreError>;

    /// Returns whether the role was granted the permission directly.
    async fn has_permission_grant(
        &self,
        role: &RoleId,
        permission: &PermissionId,
    ) -> std::result::Result<bool, StoreError>;

    /// Records a grant. Returns `false` if it already existed.
    async fn create_permission_grant(
        &self,
        grant: PermissionGrant,
    ) -> std::result::Result<bool, StoreError>;

    /// Removes a grant. Returns `false` if there was nothing to remove.
    async fn delete_permission_grant(
        &self,
        grant: &PermissionGrant,
    ) -> std::result::Result<bool, StoreError>;
}

/// Composite store trait.
pub trait Store: RoleStore + PermissionStore + AssignmentStore + Send + Sync {}

impl<T> Store for T where T: RoleStore + PermissionStore + AssignmentStore + Send + Sync {}
