//! Idempotent registration of roles and permissions.
//!
//! Registration runs at startup or migration time and is safe to repeat:
//! every operation is "get or create", never "create or fail".

use crate::cache::Cache;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::model::{Permission, Role};
use crate::store::Store;
use crate::types::{PermissionId, RoleId};
use tracing::info;

impl<S, C> Engine<S, C>
where
    S: Store,
    C: Cache,
{
    /// Returns the role `id`, creating it first if it does not exist.
    ///
    /// On the existing-row path `name` and `parents` are ignored. Creating a
    /// role requires a `name`, and every parent must already exist; parents
    /// are never created implicitly.
    pub async fn ensure_role(
        &self,
        id: &RoleId,
        name: Option<&str>,
        parents: &[RoleId],
    ) -> Result<Role> {
        if let Some(existing) = self.load_role(id).await? {
            return Ok(existing);
        }

        let Some(name) = name else {
            return Err(Error::Configuration(format!(
                "role {id} does not exist; a name is required to create it"
            )));
        };
        for parent in parents {
            if self.load_role(parent).await?.is_none() {
                return Err(Error::InvalidReference {
                    role: id.clone(),
                    parent: parent.clone(),
                });
            }
        }

        let role = Role::new(id.clone(), name, parents.to_vec());
        let created = self
            .store
            .create_role(role.clone())
            .await
            .map_err(Error::from)?;
        self.cache.invalidate_role(id).await;
        if created {
            info!(role = %id, parents = ?parents, "role created");
            return Ok(role);
        }

        // Another writer created it between our read and insert.
        self.load_role(id)
            .await?
            .ok_or_else(|| Error::RoleNotFound(id.clone()))
    }

    /// Registers a permission unless one with the same id exists.
    ///
    /// Returns the stored row; an existing description is left untouched.
    pub async fn register_permission(
        &self,
        id: &PermissionId,
        description: &str,
    ) -> Result<Permission> {
        if let Some(existing) = self.load_permission(id).await? {
            return Ok(existing);
        }

        let permission = Permission::new(id.clone(), description);
        let created = self
            .store
            .create_permission(permission.clone())
            .await
            .map_err(Error::from)?;
        self.cache.invalidate_permission(id).await;
        if created {
            info!(permission = %id, "permission registered");
            return Ok(permission);
        }

        self.load_permission(id)
            .await?
            .ok_or_else(|| Error::PermissionNotFound(id.clone()))
    }

    /// Creates the reserved `super_admin` and `guest` roles if missing.
    ///
    /// Run once per startup, before the first unauthenticated check.
    pub async fn install(&self) -> Result<()> {
        self.ensure_role(&RoleId::super_admin(), Some("Super admin"), &[])
            .await?;
        self.ensure_role(&RoleId::guest(), Some("Guest"), &[]).await?;
        Ok(())
    }

    /// Returns the role `id`, if registered.
    pub async fn role(&self, id: &RoleId) -> Result<Option<Role>> {
        self.load_role(id).await
    }

    /// Returns the permission `id`, if registered.
    pub async fn permission(&self, id: &PermissionId) -> Result<Option<Permission>> {
        self.load_permission(id).await
    }
}
