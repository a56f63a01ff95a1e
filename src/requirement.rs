use crate::cache::Cache;
use crate::engine::Engine;
use crate::error::Result;
use crate::store::Store;
use crate::types::{PermissionId, UserId};

/// Access requirement declared by a request handler.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Requirement {
    /// No check; everyone passes.
    #[default]
    Unrestricted,
    /// A single permission.
    Permission(PermissionId),
    /// Every listed permission, satisfied by one role or ancestor.
    AllOf(Vec<PermissionId>),
}

impl Requirement {
    /// Returns the permissions this requirement asks for.
    pub fn permissions(&self) -> &[PermissionId] {
        match self {
            Self::Unrestricted => &[],
            Self::Permission(permission) => std::slice::from_ref(permission),
            Self::AllOf(permissions) => permissions,
        }
    }
}

impl From<PermissionId> for Requirement {
    fn from(permission: PermissionId) -> Self {
        Self::Permission(permission)
    }
}

impl From<Vec<PermissionId>> for Requirement {
    fn from(permissions: Vec<PermissionId>) -> Self {
        Self::AllOf(permissions)
    }
}

impl<S, C> Engine<S, C>
where
    S: Store,
    C: Cache,
{
    /// Evaluates a single requirement for a principal.
    pub async fn check_requirement(
        &self,
        principal: Option<&UserId>,
        requirement: &Requirement,
    ) -> Result<bool> {
        match requirement {
            Requirement::Unrestricted => Ok(true),
            _ => self.check(principal, requirement.permissions()).await,
        }
    }

    /// Evaluates a chain of requirements; every one must pass.
    ///
    /// Each requirement is checked on its own, so two links may be satisfied
    /// by different roles.
    pub async fn check_requirements(
        &self,
        principal: Option<&UserId>,
        requirements: &[Requirement],
    ) -> Result<bool> {
        for requirement in requirements {
            if !self.check_requirement(principal, requirement).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
