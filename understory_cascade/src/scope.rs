// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scope tree: publishing overrides down a tree of scopes.
//!
//! Every scope owns the overrides it declares and the node visible to its
//! descendants, which is its parent's visible node merged with its own
//! declarations. Scopes are explicit handles rather than ambient lookups, so
//! any code that holds a [`ScopeId`] can read exactly what is visible there.

use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashMap;

use crate::error::CascadeError;
use crate::node::ConfigNode;

/// Handle to a scope in a [`ScopeTree`].
///
/// Ids are never reused within one tree.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The implicit root scope.
    pub const ROOT: Self = Self(0);

    /// Returns the underlying index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScopeId").field(&self.0).finish()
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    declared: ConfigNode,
    visible: ConfigNode,
}

/// A tree of override scopes rooted at [`ScopeId::ROOT`].
///
/// # Example
///
/// ```rust
/// use understory_cascade::{ConfigNode, ScopeId, ScopeTree};
/// use understory_props::PropValue;
///
/// let mut tree = ScopeTree::new();
/// tree.publish_root(ConfigNode::builder().set("Select", "size", "small").build());
///
/// let dialog = tree
///     .publish_scoped(ScopeId::ROOT, ConfigNode::builder().set("Select", "size", "large").build())
///     .unwrap();
///
/// let at = |scope| tree.visible(scope).unwrap().named("Select", "size").cloned();
/// assert_eq!(at(ScopeId::ROOT), Some(PropValue::from("small")));
/// assert_eq!(at(dialog), Some(PropValue::from("large")));
/// ```
#[derive(Debug)]
pub struct ScopeTree {
    scopes: HashMap<ScopeId, Scope>,
    next: u32,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Creates a tree holding only an empty root scope.
    #[must_use]
    pub fn new() -> Self {
        let mut scopes = HashMap::new();
        scopes.insert(
            ScopeId::ROOT,
            Scope {
                parent: None,
                children: Vec::new(),
                declared: ConfigNode::empty(),
                visible: ConfigNode::empty(),
            },
        );
        Self { scopes, next: 1 }
    }

    /// Returns the number of live scopes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Always `false`: the root scope cannot be removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns `true` if `scope` is live.
    #[must_use]
    pub fn contains(&self, scope: ScopeId) -> bool {
        self.scopes.contains_key(&scope)
    }

    /// Returns the parent of `scope`; `None` for the root or unknown scopes.
    #[must_use]
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.get(&scope).and_then(|s| s.parent)
    }

    /// Returns the children of `scope` in creation order.
    #[must_use]
    pub fn children(&self, scope: ScopeId) -> &[ScopeId] {
        self.scopes
            .get(&scope)
            .map(|s| s.children.as_slice())
            .unwrap_or_default()
    }

    /// Returns the node visible to descendants of `scope`.
    #[must_use]
    pub fn visible(&self, scope: ScopeId) -> Option<&ConfigNode> {
        self.scopes.get(&scope).map(|s| &s.visible)
    }

    /// Returns the overrides `scope` itself declares.
    #[must_use]
    pub fn declared(&self, scope: ScopeId) -> Option<&ConfigNode> {
        self.scopes.get(&scope).map(|s| &s.declared)
    }

    /// Declares the root overrides and refreshes the whole tree.
    pub fn publish_root(&mut self, overrides: ConfigNode) {
        if let Some(root) = self.scopes.get_mut(&ScopeId::ROOT) {
            root.declared = overrides;
        }
        self.refresh_from(ScopeId::ROOT);
    }

    /// Creates a child of `parent` declaring `overrides`.
    ///
    /// The new scope sees `parent`'s visible node merged with `overrides`,
    /// nearer keys winning.
    pub fn publish_scoped(
        &mut self,
        parent: ScopeId,
        overrides: ConfigNode,
    ) -> Result<ScopeId, CascadeError> {
        let parent_scope = self
            .scopes
            .get_mut(&parent)
            .ok_or(CascadeError::UnknownScope(parent))?;
        let id = ScopeId(self.next);
        self.next += 1;
        parent_scope.children.push(id);
        let visible = ConfigNode::merged(&parent_scope.visible, &overrides);
        self.scopes.insert(
            id,
            Scope {
                parent: Some(parent),
                children: Vec::new(),
                declared: overrides,
                visible,
            },
        );
        Ok(id)
    }

    /// Replaces the overrides `scope` declares, returning the previous ones.
    ///
    /// Nothing is refreshed; call [`refresh_subtree`](Self::refresh_subtree)
    /// (or let the driver do it) to propagate the change.
    pub fn set_declared(
        &mut self,
        scope: ScopeId,
        overrides: ConfigNode,
    ) -> Result<ConfigNode, CascadeError> {
        let entry = self
            .scopes
            .get_mut(&scope)
            .ok_or(CascadeError::UnknownScope(scope))?;
        Ok(core::mem::replace(&mut entry.declared, overrides))
    }

    /// Recomputes the visible node of `scope` from its parent's current one.
    ///
    /// Always publishes a new node; the previous one is left as it was.
    pub fn refresh(&mut self, scope: ScopeId) -> Result<(), CascadeError> {
        let entry = self
            .scopes
            .get(&scope)
            .ok_or(CascadeError::UnknownScope(scope))?;
        let visible = match entry.parent.and_then(|p| self.scopes.get(&p)) {
            Some(parent) => ConfigNode::merged(&parent.visible, &entry.declared),
            None => ConfigNode::merged(&ConfigNode::empty(), &entry.declared),
        };
        if let Some(entry) = self.scopes.get_mut(&scope) {
            entry.visible = visible;
        }
        Ok(())
    }

    /// Refreshes `scope` and all of its descendants, parents first.
    ///
    /// Returns the refreshed scopes in the order they were refreshed.
    pub fn refresh_subtree(&mut self, scope: ScopeId) -> Result<Vec<ScopeId>, CascadeError> {
        if !self.contains(scope) {
            return Err(CascadeError::UnknownScope(scope));
        }
        Ok(self.refresh_from(scope))
    }

    fn refresh_from(&mut self, scope: ScopeId) -> Vec<ScopeId> {
        let order = self.subtree(scope);
        for &id in &order {
            self.refresh(id).expect("ids come from the live tree");
        }
        order
    }

    /// Returns `scope` and its descendants, parents before children.
    fn subtree(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut order = Vec::new();
        if !self.contains(scope) {
            return order;
        }
        order.push(scope);
        let mut next = 0;
        while next < order.len() {
            order.extend_from_slice(self.children(order[next]));
            next += 1;
        }
        order
    }

    /// Tears down `scope` and its whole subtree.
    ///
    /// Returns the removed scopes, parents first.
    pub fn remove(&mut self, scope: ScopeId) -> Result<Vec<ScopeId>, CascadeError> {
        if scope == ScopeId::ROOT {
            return Err(CascadeError::RootScope);
        }
        let parent = self
            .scopes
            .get(&scope)
            .ok_or(CascadeError::UnknownScope(scope))?
            .parent;
        if let Some(parent) = parent.and_then(|p| self.scopes.get_mut(&p)) {
            parent.children.retain(|&c| c != scope);
        }
        let removed = self.subtree(scope);
        for id in &removed {
            self.scopes.remove(id);
        }
        Ok(removed)
    }
}
