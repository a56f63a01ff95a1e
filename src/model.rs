use crate::types::{PermissionId, RoleId, UserId};

/// A node in the role graph.
///
/// `parents` keeps insertion order; the ancestry walk visits parents in
/// exactly this order.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Role {
    /// Stable identifier.
    pub id: RoleId,
    /// Human-readable name.
    pub name: String,
    /// Direct parent roles.
    pub parents: Vec<RoleId>,
}

impl Role {
    /// Creates a role.
    pub fn new(id: RoleId, name: impl Into<String>, parents: Vec<RoleId>) -> Self {
        Self {
            id,
            name: name.into(),
            parents,
        }
    }
}

/// A registered capability.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permission {
    /// Stable identifier.
    pub id: PermissionId,
    /// Free-form description.
    pub description: String,
}

impl Permission {
    /// Creates a permission.
    pub fn new(id: PermissionId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
        }
    }
}

/// The fact that a user holds a role.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoleAssignment {
    pub user: UserId,
    pub role: RoleId,
}

/// The fact that a role was granted a permission directly.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PermissionGrant {
    pub role: RoleId,
    pub permission: PermissionId,
}
