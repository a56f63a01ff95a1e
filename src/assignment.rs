//! Role assignment and permission grants.

use crate::cache::Cache;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::model::{PermissionGrant, RoleAssignment};
use crate::store::Store;
use crate::types::{PermissionId, RoleId, UserId};
use tracing::info;

impl<S, C> Engine<S, C>
where
    S: Store,
    C: Cache,
{
    /// Assigns `role` to `user`.
    ///
    /// Returns `true` if a new assignment was recorded and `false` if the user
    /// already held the role.
    pub async fn grant_role(&self, user: &UserId, role: &RoleId) -> Result<bool> {
        self.require_role(role).await?;
        let created = self
            .store
            .create_role_assignment(RoleAssignment {
                user: user.clone(),
                role: role.clone(),
            })
            .await
            .map_err(Error::from)?;
        if created {
            info!(user = %user, role = %role, "role granted");
        }
        Ok(created)
    }

    /// Grants `permission` directly to `role`.
    ///
    /// Returns `true` if a new grant was recorded.
    pub async fn grant_permission(&self, role: &RoleId, permission: &PermissionId) -> Result<bool> {
        self.require_role(role).await?;
        self.require_permission(permission).await?;
        let created = self
            .store
            .create_permission_grant(PermissionGrant {
                role: role.clone(),
                permission: permission.clone(),
            })
            .await
            .map_err(Error::from)?;
        if created {
            info!(role = %role, permission = %permission, "permission granted");
        }
        Ok(created)
    }

    /// Grants several permissions to `role`, returning how many were new.
    ///
    /// Every id is validated before anything is written.
    pub async fn grant_permissions(
        &self,
        role: &RoleId,
        permissions: &[PermissionId],
    ) -> Result<usize> {
        self.require_role(role).await?;
        for permission in permissions {
            self.require_permission(permission).await?;
        }
        let mut created = 0;
        for permission in permissions {
            if self.grant_permission(role, permission).await? {
                created += 1;
            }
        }
        Ok(created)
    }

    /// Removes `role` from `user`. Returns `false` if it was not assigned.
    pub async fn revoke_role(&self, user: &UserId, role: &RoleId) -> Result<bool> {
        self.require_role(role).await?;
        let removed = self
            .store
            .delete_role_assignment(&RoleAssignment {
                user: user.clone(),
                role: role.clone(),
            })
            .await
            .map_err(Error::from)?;
        if removed {
            info!(user = %user, role = %role, "role revoked");
        }
        Ok(removed)
    }

    /// Removes a direct grant. Returns `false` if it was not granted.
    pub async fn revoke_permission(
        &self,
        role: &RoleId,
        permission: &PermissionId,
    ) -> Result<bool> {
        self.require_role(role).await?;
        self.require_permission(permission).await?;
        let removed = self
            .store
            .delete_permission_grant(&PermissionGrant {
                role: role.clone(),
                permission: permission.clone(),
            })
            .await
            .map_err(Error::from)?;
        if removed {
            info!(role = %role, permission = %permission, "permission revoked");
        }
        Ok(removed)
    }

    /// Returns whether `user` holds `role` directly.
    pub async fn holds_role(&self, user: &UserId, role: &RoleId) -> Result<bool> {
        self.store
            .has_role_assignment(user, role)
            .await
            .map_err(Error::from)
    }

    /// Returns the permissions granted directly to `role`.
    pub async fn grants_of(&self, role: &RoleId) -> Result<Vec<PermissionId>> {
        self.require_role(role).await?;
        self.store.role_grants(role).await.map_err(Error::from)
    }

    async fn require_role(&self, role: &RoleId) -> Result<()> {
        match self.load_role(role).await? {
            Some(_) => Ok(()),
            None => Err(Error::RoleNotFound(role.clone())),
        }
    }

    async fn require_permission(&self, permission: &PermissionId) -> Result<()> {
        match self.load_permission(permission).await? {
            Some(_) => Ok(()),
            None => Err(Error::PermissionNotFound(permission.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::EngineBuilder;
    use crate::error::Error;
    use crate::test_support::{TestStore, perm, role, user};
    use futures::executor::block_on;

    fn seeded() -> TestStore {
        let store = TestStore::default();
        store.add_role("editor", &[]);
        store.add_permission("edit");
        store.add_permission("view");
        store
    }

    #[test]
    fn grant_role_should_be_idempotent() {
        let engine = EngineBuilder::new(seeded()).build();
        let alice = user("alice");

        assert!(block_on(engine.grant_role(&alice, &role("editor"))).unwrap());
        assert!(!block_on(engine.grant_role(&alice, &role("editor"))).unwrap());

        let roles = block_on(engine.effective_roles_of(&alice)).unwrap();
        assert_eq!(roles, vec![role("editor")]);
        assert!(block_on(engine.holds_role(&alice, &role("editor"))).unwrap());
    }

    #[test]
    fn grant_role_should_reject_unknown_role() {
        let engine = EngineBuilder::new(seeded()).build();

        let result = block_on(engine.grant_role(&user("alice"), &role("ghost")));

        assert!(matches!(result, Err(Error::RoleNotFound(_))));
    }

    #[test]
    fn grant_permission_should_be_idempotent() {
        let engine = EngineBuilder::new(seeded()).build();

        assert!(block_on(engine.grant_permission(&role("editor"), &perm("edit"))).unwrap());
        assert!(!block_on(engine.grant_permission(&role("editor"), &perm("edit"))).unwrap());

        let grants = block_on(engine.grants_of(&role("editor"))).unwrap();
        assert_eq!(grants, vec![perm("edit")]);
    }

    #[test]
    fn grant_permission_should_reject_unknown_permission() {
        let engine = EngineBuilder::new(seeded()).build();

        let result = block_on(engine.grant_permission(&role("editor"), &perm("delete")));

        assert!(matches!(result, Err(Error::PermissionNotFound(id)) if id.as_str() == "delete"));
    }

    #[test]
    fn grant_permissions_should_validate_before_writing() {
        let engine = EngineBuilder::new(seeded()).build();

        let result = block_on(engine.grant_permissions(
            &role("editor"),
            &[perm("edit"), perm("delete")],
        ));

        assert!(matches!(result, Err(Error::PermissionNotFound(_))));
        assert!(block_on(engine.grants_of(&role("editor"))).unwrap().is_empty());
    }

    #[test]
    fn grant_permissions_should_count_new_rows() {
        let engine = EngineBuilder::new(seeded()).build();
        block_on(engine.grant_permission(&role("editor"), &perm("edit"))).unwrap();

        let created = block_on(engine.grant_permissions(
            &role("editor"),
            &[perm("edit"), perm("view")],
        ))
        .unwrap();

        assert_eq!(created, 1);
    }

    #[test]
    fn revoke_should_remove_and_report() {
        let engine = EngineBuilder::new(seeded()).build();
        let alice = user("alice");
        block_on(engine.grant_role(&alice, &role("editor"))).unwrap();
        block_on(engine.grant_permission(&role("editor"), &perm("edit"))).unwrap();

        assert!(block_on(engine.check(Some(&alice), &[perm("edit")])).unwrap());
        assert!(block_on(engine.revoke_permission(&role("editor"), &perm("edit"))).unwrap());
        assert!(!block_on(engine.revoke_permission(&role("editor"), &perm("edit"))).unwrap());
        assert!(!block_on(engine.check(Some(&alice), &[perm("edit")])).unwrap());

        assert!(block_on(engine.revoke_role(&alice, &role("editor"))).unwrap());
        assert!(!block_on(engine.revoke_role(&alice, &role("editor"))).unwrap());
        assert!(block_on(engine.effective_roles_of(&alice)).unwrap().is_empty());
    }
}
