use crate::cache::{Cache, NoCache};
use crate::error::{Error, Result};
use crate::model::{Permission, Role};
use crate::store::Store;
use crate::types::{PermissionId, RoleId, UserId};
use tracing::debug;
use std::collections::HashSet;

/// RBAC engine with pluggable store and optional cache.
///
/// The engine owns no mutable state of its own; every decision is computed
/// from the store (through the cache, when one is configured). Share it
/// across threads behind an `Arc`.
#[derive(Debug)]
pub struct Engine<S, C = NoCache> {
    pub(crate) store: S,
    pub(crate) cache: C,
    pub(crate) max_inherit_depth: Option<usize>,
    super_admin_bypass: bool,
}

/// Builder for [`Engine`].
pub struct EngineBuilder<S, C = NoCache> {
    store: S,
    cache: C,
    max_inherit_depth: Option<usize>,
    super_admin_bypass: bool,
}

impl<S> EngineBuilder<S, NoCache> {
    /// Creates a new builder with default configuration.
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: NoCache,
            max_inherit_depth: None,
            super_admin_bypass: true,
        }
    }
}

impl<S, C> EngineBuilder<S, C> {
    /// Limits how many parent hops the ancestry walk follows from a role.
    ///
    /// Ancestors beyond the limit are not searched; the walk moves on to the
    /// next parent. Unlimited by default.
    pub fn max_inherit_depth(mut self, depth: usize) -> Self {
        self.max_inherit_depth = Some(depth);
        self
    }

    /// Enables or disables the `super_admin` short-circuit.
    ///
    /// When disabled, `super_admin` is evaluated like any other role.
    pub fn super_admin_bypass(mut self, on: bool) -> Self {
        self.super_admin_bypass = on;
        self
    }

    /// Sets the cache implementation.
    pub fn cache<C2: Cache>(self, cache: C2) -> EngineBuilder<S, C2> {
        EngineBuilder {
            store: self.store,
            cache,
            max_inherit_depth: self.max_inherit_depth,
            super_admin_bypass: self.super_admin_bypass,
        }
    }

    /// Builds the engine.
    pub fn build(self) -> Engine<S, C> {
        Engine {
            store: self.store,
            cache: self.cache,
            max_inherit_depth: self.max_inherit_depth,
            super_admin_bypass: self.super_admin_bypass,
        }
    }
}

impl<S, C> Engine<S, C> {
    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the configured cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }
}

impl<S, C> Engine<S, C>
where
    S: Store,
    C: Cache,
{
    /// Decides whether a principal may perform every action in `permissions`.
    ///
    /// `None` stands for an unauthenticated principal, evaluated through the
    /// reserved `guest` role. An authenticated user holding `super_admin` is
    /// allowed unconditionally. Otherwise the whole set must be satisfied by a
    /// single assigned role or one of its ancestors; grants are never unioned
    /// across roles.
    ///
    /// Returns `Ok(false)` for a plain denial. Unregistered permissions and
    /// dangling role references are reported as errors.
    pub async fn check(
        &self,
        principal: Option<&UserId>,
        permissions: &[PermissionId],
    ) -> Result<bool> {
        let required = self.required_permissions(permissions).await?;

        let Some(user) = principal else {
            let allowed = self.role_satisfies(&RoleId::guest(), &required).await?;
            debug!(principal = "guest", permissions = ?required, allowed, "checked permissions");
            return Ok(allowed);
        };

        let roles = self.effective_roles_of(user).await?;
        if self.super_admin_bypass && roles.iter().any(RoleId::is_super_admin) {
            debug!(user = %user, permissions = ?required, "super admin bypass");
            return Ok(true);
        }

        let allowed = self.satisfies_any(&roles, &required).await?;
        debug!(user = %user, permissions = ?required, allowed, "checked permissions");
        Ok(allowed)
    }

    /// Single-permission form of [`Engine::check`].
    pub async fn check_one(
        &self,
        principal: Option<&UserId>,
        permission: &PermissionId,
    ) -> Result<bool> {
        self.check(principal, std::slice::from_ref(permission)).await
    }

    /// Returns the roles directly assigned to a user, in assignment order.
    ///
    /// Ancestry is not expanded here; it is resolved lazily during the walk.
    pub async fn effective_roles_of(&self, user: &UserId) -> Result<Vec<RoleId>> {
        self.store.user_roles(user).await.map_err(Error::from)
    }

    /// Returns whether `role` was granted `permission` directly.
    pub async fn has_direct_permission(
        &self,
        role: &RoleId,
        permission: &PermissionId,
    ) -> Result<bool> {
        self.store
            .has_permission_grant(role, permission)
            .await
            .map_err(Error::from)
    }

    /// Returns whether `role` was granted every permission directly.
    ///
    /// Stops at the first missing grant. An empty set is satisfied.
    pub async fn has_direct_permissions(
        &self,
        role: &RoleId,
        permissions: &[PermissionId],
    ) -> Result<bool> {
        for permission in permissions {
            if !self.has_direct_permission(role, permission).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Deduplicates the requested set and rejects unregistered ids.
    async fn required_permissions(&self, permissions: &[PermissionId]) -> Result<Vec<PermissionId>> {
        let mut seen = HashSet::with_capacity(permissions.len());
        let mut required = Vec::with_capacity(permissions.len());
        for permission in permissions {
            if !seen.insert(permission) {
                continue;
            }
            if self.load_permission(permission).await?.is_none() {
                return Err(Error::UnknownPermission(permission.clone()));
            }
            required.push(permission.clone());
        }
        Ok(required)
    }

    pub(crate) async fn load_role(&self, id: &RoleId) -> Result<Option<Role>> {
        if let Some(role) = self.cache.get_role(id).await {
            return Ok(Some(role));
        }
        let role = self.store.role(id).await.map_err(Error::from)?;
        if let Some(role) = &role {
            self.cache.set_role(role.clone()).await;
        }
        Ok(role)
    }

    pub(crate) async fn load_permission(&self, id: &PermissionId) -> Result<Option<Permission>> {
        if let Some(permission) = self.cache.get_permission(id).await {
            return Ok(Some(permission));
        }
        let permission = self.store.permission(id).await.map_err(Error::from)?;
        if let Some(permission) = &permission {
            self.cache.set_permission(permission.clone()).await;
        }
        Ok(permission)
    }
}
