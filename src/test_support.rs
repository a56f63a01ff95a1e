use crate::model::{Permission, PermissionGrant, Role, RoleAssignment};
use crate::store::{AssignmentStore, PermissionStore, RoleStore};
use crate::types::{PermissionId, RoleId, UserId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) fn role(value: &str) -> RoleId {
    RoleId::try_from(value).unwrap()
}

pub(crate) fn perm(value: &str) -> PermissionId {
    PermissionId::try_from(value).unwrap()
}

pub(crate) fn user(value: &str) -> UserId {
    UserId::try_from(value).unwrap()
}

#[derive(Default)]
struct State {
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, Permission>,
    user_roles: HashMap<UserId, Vec<RoleId>>,
    grants: HashSet<(RoleId, PermissionId)>,
}

/// Store that writes rows verbatim (no parent validation) and counts reads.
#[derive(Default)]
pub(crate) struct TestStore {
    state: Mutex<State>,
    role_reads: AtomicUsize,
    permission_reads: AtomicUsize,
    grant_reads: AtomicUsize,
}

impl TestStore {
    pub(crate) fn add_role(&self, id: &str, parents: &[&str]) {
        let parents = parents.iter().map(|parent| role(parent)).collect();
        let mut state = self.state.lock().unwrap();
        state.roles.insert(role(id), Role::new(role(id), id, parents));
    }

    pub(crate) fn add_permission(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .permissions
            .insert(perm(id), Permission::new(perm(id), id));
    }

    pub(crate) fn add_grant(&self, role_id: &str, permission: &str) {
        let mut state = self.state.lock().unwrap();
        state.grants.insert((role(role_id), perm(permission)));
    }

    pub(crate) fn add_assignment(&self, user_id: &str, role_id: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .user_roles
            .entry(user(user_id))
            .or_default()
            .push(role(role_id));
    }

    pub(crate) fn role_reads(&self) -> usize {
        self.role_reads.load(Ordering::SeqCst)
    }

    pub(crate) fn permission_reads(&self) -> usize {
        self.permission_reads.load(Ordering::SeqCst)
    }

    pub(crate) fn grant_reads(&self) -> usize {
        self.grant_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleStore for TestStore {
    async fn role(&self, id: &RoleId) -> std::result::Result<Option<Role>, crate::StoreError> {
        self.role_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().roles.get(id).cloned())
    }

    async fn create_role(&self, role: Role) -> std::result::Result<bool, crate::StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.roles.contains_key(&role.id) {
            return Ok(false);
        }
        state.roles.insert(role.id.clone(), role);
        Ok(true)
    }
}

#[async_trait]
impl PermissionStore for TestStore {
    async fn permission(
        &self,
        id: &PermissionId,
    ) -> std::result::Result<Option<Permission>, crate::StoreError> {
        self.permission_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().permissions.get(id).cloned())
    }

    async fn create_permission(
        &self,
        permission: Permission,
    ) -> std::result::Result<bool, crate::StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.permissions.contains_key(&permission.id) {
            return Ok(false);
        }
        state.permissions.insert(permission.id.clone(), permission);
        Ok(true)
    }
}

#[async_trait]
impl AssignmentStore for TestStore {
    async fn user_roles(&self, user: &UserId) -> std::result::Result<Vec<RoleId>, crate::StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .user_roles
            .get(user)
            .cloned()
            .unwrap_or_default())
    }

    async fn has_role_assignment(
        &self,
        user: &UserId,
        role: &RoleId,
    ) -> std::result::Result<bool, crate::StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .user_roles
            .get(user)
            .is_some_and(|roles| roles.contains(role)))
    }

    async fn create_role_assignment(
        &self,
        assignment: RoleAssignment,
    ) -> std::result::Result<bool, crate::StoreError> {
        let mut state = self.state.lock().unwrap();
        let roles = state.user_roles.entry(assignment.user).or_default();
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
        let mut state = self.state.lock().unwrap();
        let Some(roles) = state.user_roles.get_mut(&assignment.user) else {
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
        let state = self.state.lock().unwrap();
        let mut grants: Vec<PermissionId> = state
            .grants
            .iter()
            .filter(|(granted, _)| granted == role)
            .map(|(_, permission)| permission.clone())
            .collect();
        grants.sort();
        Ok(grants)
    }

    async fn has_permission_grant(
        &self,
        role: &RoleId,
        permission: &PermissionId,
    ) -> std::result::Result<bool, crate::StoreError> {
        self.grant_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .state
            .lock()
            .unwrap()
            .grants
            .contains(&(role.clone(), permission.clone())))
    }

    async fn create_permission_grant(
        &self,
        grant: PermissionGrant,
    ) -> std::result::Result<bool, crate::StoreError> {
        let mut state = self.state.lock().unwrap();
        Ok(state.grants.insert((grant.role, grant.permission)))
    }

    async fn delete_permission_grant(
        &self,
        grant: &PermissionGrant,
    ) -> std::result::Result<bool, crate::StoreError> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .grants
            .remove(&(grant.role.clone(), grant.permission.clone())))
    }
}
