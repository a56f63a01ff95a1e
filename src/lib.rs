//! Hierarchical RBAC evaluation library.
//!
//! Roles form a directed graph in which each role may have several parents.
//! Permissions are registered once and granted directly to roles; users hold
//! roles. [`Engine::check`] decides whether a user may perform a set of
//! actions by searching each assigned role and its ancestors for a single
//! node that was granted the whole set.
//!
//! Two role ids are part of the contract and must be documented to
//! integrators:
//!
//! - [`SUPER_ADMIN_ROLE`] (`"super_admin"`): holders pass every check.
//! - [`GUEST_ROLE`] (`"guest"`): evaluated for unauthenticated principals.
//!
//! Access denial is a plain `false`. Errors are reserved for configuration
//! mistakes such as checking a permission that was never registered.
//!
//! # Examples
//!
//! Registering roles and checking access with the in-memory store (enable
//! `memory-store`):
//! ```no_run
//! use rs_rbac::{EngineBuilder, PermissionId, RoleId, UserId};
//! # #[cfg(feature = "memory-store")]
//! # {
//! use rs_rbac::MemoryStore;
//! # futures::executor::block_on(async {
//! let engine = EngineBuilder::new(MemoryStore::new()).build();
//! engine.install().await.unwrap();
//!
//! let view = PermissionId::try_from("view").unwrap();
//! let viewer = RoleId::try_from("viewer").unwrap();
//! engine.register_permission(&view, "View pages").await.unwrap();
//! engine.ensure_role(&viewer, Some("Viewer"), &[]).await.unwrap();
//! engine.grant_permission(&viewer, &view).await.unwrap();
//!
//! let alice = UserId::try_from("alice").unwrap();
//! engine.grant_role(&alice, &viewer).await.unwrap();
//! assert!(engine.check(Some(&alice), &[view]).await.unwrap());
//! # });
//! # }
//! ```
//!
//! Putting a process-local cache in front of the store (enable
//! `memory-cache`):
//! ```no_run
//! # #[cfg(all(feature = "memory-store", feature = "memory-cache"))]
//! # {
//! use rs_rbac::{EngineBuilder, MemoryCache, MemoryStore};
//! let engine = EngineBuilder::new(MemoryStore::new())
//!     .cache(MemoryCache::new(1024))
//!     .build();
//! # let _ = engine;
//! # }
//! ```
#![forbid(unsafe_code)]

mod assignment;
mod cache;
mod engine;
mod error;
mod graph;
mod model;
mod registry;
mod requirement;
mod store;
mod types;

#[cfg(feature = "memory-cache")]
mod memory_cache;

#[cfg(feature = "memory-store")]
mod memory_store;

#[cfg(feature = "axum")]
pub mod axum;

#[cfg(test)]
mod test_support;

pub use crate::cache::{Cache, NoCache};
pub use crate::engine::{Engine, EngineBuilder};
pub use crate::error::{Error, Result, StoreError};
pub use crate::model::{Permission, PermissionGrant, Role, RoleAssignment};
pub use crate::requirement::Requirement;
pub use crate::store::{AssignmentStore, PermissionStore, RoleStore, Store};
pub use crate::types::{GUEST_ROLE, PermissionId, RoleId, SUPER_ADMIN_ROLE, UserId};

#[cfg(feature = "memory-store")]
pub use crate::memory_store::MemoryStore;

#[cfg(feature = "memory-cache")]
pub use crate::memory_cache::MemoryCache;
