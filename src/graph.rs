//! Role ancestry resolution.
//!
//! A role satisfies a permission set when the role itself, or one of its
//! ancestors, holds every permission of the set through direct grants. Sets
//! are never assembled from several nodes.

use crate::cache::Cache;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{PermissionId, RoleId};
use tracing::{debug, warn};
use std::collections::HashMap;

/// Roles already expanded during a walk, with the shallowest depth seen.
type Visited = HashMap<RoleId, usize>;

impl<S, C> Engine<S, C>
where
    S: Store,
    C: Cache,
{
    /// Returns the direct parents of a role, in stored order.
    pub async fn parents_of(&self, role: &RoleId) -> Result<Vec<RoleId>> {
        self.load_role(role)
            .await?
            .map(|role| role.parents)
            .ok_or_else(|| Error::RoleNotFound(role.clone()))
    }

    /// Returns whether `role` or one of its ancestors holds every permission
    /// in `permissions`.
    ///
    /// Parents are searched depth-first in stored order and the first
    /// satisfying node wins. A role reached twice is skipped, so a cycle in
    /// the graph ends the branch with no result instead of looping. With a
    /// configured depth limit, ancestors past the limit are left unsearched
    /// and the walk continues with the next parent.
    pub async fn role_satisfies(
        &self,
        role: &RoleId,
        permissions: &[PermissionId],
    ) -> Result<bool> {
        let mut visited = Visited::new();
        self.walk_from(role, permissions, &mut visited).await
    }

    /// Runs [`Engine::role_satisfies`] for each root in order.
    ///
    /// The visited set is shared: a role that failed under one root fails
    /// under every other.
    pub(crate) async fn satisfies_any(
        &self,
        roots: &[RoleId],
        permissions: &[PermissionId],
    ) -> Result<bool> {
        let mut visited = Visited::new();
        for root in roots {
            if self.walk_from(root, permissions, &mut visited).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Records `role` as expanded at `depth`.
    ///
    /// Returns false when it was already expanded. Under a depth limit a role
    /// reached again closer to the root is expanded once more, since its
    /// ancestors may have been cut off the first time.
    fn mark_visited(&self, visited: &mut Visited, role: &RoleId, depth: usize) -> bool {
        match visited.get_mut(role) {
            None => {
                visited.insert(role.clone(), depth);
                true
            }
            Some(seen) if self.max_inherit_depth.is_some() && depth < *seen => {
                *seen = depth;
                true
            }
            Some(_) => false,
        }
    }

    async fn walk_from(
        &self,
        root: &RoleId,
        permissions: &[PermissionId],
        visited: &mut Visited,
    ) -> Result<bool> {
        if !self.mark_visited(visited, root, 0) {
            return Ok(false);
        }
        if self.has_direct_permissions(root, permissions).await? {
            return Ok(true);
        }

        let parents = self.parents_of(root).await?;
        let mut stack: Vec<(RoleId, usize, std::vec::IntoIter<RoleId>)> =
            vec![(root.clone(), 0, parents.into_iter())];

        while let Some((current, depth, mut iter)) = stack.pop() {
            let Some(parent) = iter.next() else {
                continue;
            };
            stack.push((current, depth, iter));

            if stack.iter().any(|(on_path, _, _)| on_path == &parent) {
                warn!(role = %parent, root = %root, "role inheritance cycle; edge skipped");
                continue;
            }

            let next_depth = depth + 1;
            if self.max_inherit_depth.is_some_and(|limit| next_depth > limit) {
                debug!(
                    role = %parent,
                    root = %root,
                    depth = next_depth,
                    "inheritance depth limit reached; branch pruned"
                );
                continue;
            }

            if !self.mark_visited(visited, &parent, next_depth) {
                continue;
            }
            if self.has_direct_permissions(&parent, permissions).await? {
                return Ok(true);
            }
            let grandparents = self.parents_of(&parent).await?;
            stack.push((parent, next_depth, grandparents.into_iter()));
        }

        Ok(false)
    }
}
