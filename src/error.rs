use crate::types::{PermissionId, RoleId};
use thiserror::Error;

/// Store-layer error type.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by this crate.
///
/// Every variant describes a misconfigured deployment or a failing store.
/// A plain "access denied" is never an error; `check` returns `false` for it.
#[derive(Debug, Error)]
pub enum Error {
    /// Store error wrapper.
    #[error("store error: {0}")]
    Store(#[source] StoreError),
    /// Invalid identifier input.
    #[error("invalid id: {0}")]
    InvalidId(String),
    /// A check referenced a permission that was never registered.
    #[error("permission {0} does not exist")]
    UnknownPermission(PermissionId),
    /// A referenced role does not exist.
    #[error("role {0} does not exist")]
    RoleNotFound(RoleId),
    /// A referenced permission does not exist.
    #[error("permission {0} not found")]
    PermissionNotFound(PermissionId),
    /// A role was created with a parent that does not exist.
    #[error("role {role} references missing parent role {parent}")]
    InvalidReference { role: RoleId, parent: RoleId },
    /// Registration input was incomplete.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<StoreError> for Error {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}
