// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reactive driver tying scopes, instances, and recomputation together.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashMap;

use understory_props::{
    ComponentDefinition, ComponentName, ComponentRegistry, InstanceValues, PropKey, PropSpec,
    PropValue,
};
use understory_reactive::{CycleHandling, ReactiveTracker};

use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::CascadeError;
use crate::node::ConfigNode;
use crate::resolve::{Resolution, ResolveCx, ResolvedProps};
use crate::scope::{ScopeId, ScopeTree};
use crate::validate::ValidatorRunner;

/// Handle to a mounted component instance.
///
/// Ids are never reused within one [`Cascade`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u32);

impl InstanceId {
    /// Returns the underlying index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InstanceId").field(&self.0).finish()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the dependency graph.
///
/// The derived order puts scopes before instances, which makes the drain
/// order deterministic among independent nodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Node {
    Scope(ScopeId),
    Instance(InstanceId),
}

#[derive(Debug)]
struct Instance {
    definition: Arc<ComponentDefinition>,
    scope: ScopeId,
    values: InstanceValues,
    resolved: ResolvedProps,
    validator: ValidatorRunner,
}

/// What a [`Cascade::flush`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlushReport {
    /// Scopes whose visible node was republished.
    pub scopes_refreshed: usize,
    /// Instances whose props were resolved again.
    pub instances_recomputed: usize,
    /// Diagnostics emitted during the flush, in emission order.
    pub diagnostics: Vec<Diagnostic>,
}

impl FlushReport {
    /// Returns `true` if the flush had nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes_refreshed == 0 && self.instances_recomputed == 0
    }
}

/// Builder for a [`Cascade`] with non-default options.
///
/// # Example
///
/// ```rust
/// use understory_cascade::{Cascade, MemorySink};
///
/// let sink = MemorySink::new();
/// let cascade = Cascade::builder().diagnostics(sink.clone()).validate(true).build();
/// assert!(!cascade.has_pending());
/// ```
pub struct CascadeBuilder {
    sink: Box<dyn DiagnosticSink>,
    validate: bool,
}

impl fmt::Debug for CascadeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CascadeBuilder")
            .field("validate", &self.validate)
            .finish_non_exhaustive()
    }
}

impl Default for CascadeBuilder {
    fn default() -> Self {
        Self {
            sink: Box::new(TracingSink),
            validate: true,
        }
    }
}

impl CascadeBuilder {
    /// Creates a builder with the default options: validators on, diagnostics
    /// logged through [`TracingSink`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets where diagnostics go.
    #[must_use]
    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Enables or disables validators.
    #[must_use]
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Builds the cascade.
    #[must_use]
    pub fn build(self) -> Cascade {
        Cascade {
            components: ComponentRegistry::new(),
            scopes: ScopeTree::new(),
            instances: HashMap::new(),
            next_instance: 0,
            tracker: ReactiveTracker::with_cycle_handling(CycleHandling::DebugAssert),
            sink: self.sink,
            validate: self.validate,
        }
    }
}

/// The prop cascade for a whole component tree.
///
/// Components are defined once, scopes publish overrides, and instances are
/// mounted into scopes. Every change marks what depends on it; [`flush`]
/// recomputes the affected scopes and instances in dependency order. Until
/// then, readers keep seeing the previous results.
///
/// A child scope depends on its parent and an instance depends on its scope.
///
/// [`flush`]: Self::flush
///
/// # Example
///
/// ```rust
/// use understory_cascade::{Cascade, ConfigNode, ScopeId};
/// use understory_props::{InstanceValues, PropSpec, PropValue};
///
/// let mut cascade = Cascade::new();
/// cascade.define("Button", [("size", PropSpec::from("medium"))]);
///
/// let button = cascade
///     .mount("Button", ScopeId::ROOT, InstanceValues::new())
///     .unwrap();
/// assert_eq!(cascade.get(button, "size"), Some(&PropValue::from("medium")));
///
/// cascade.publish_root(ConfigNode::builder().default("size", "small").build());
/// assert_eq!(cascade.get(button, "size"), Some(&PropValue::from("medium")));
///
/// let report = cascade.flush();
/// assert_eq!(report.instances_recomputed, 1);
/// assert_eq!(cascade.get(button, "size"), Some(&PropValue::from("small")));
/// ```
pub struct Cascade {
    components: ComponentRegistry,
    scopes: ScopeTree,
    instances: HashMap<InstanceId, Instance>,
    next_instance: u32,
    tracker: ReactiveTracker<Node>,
    sink: Box<dyn DiagnosticSink>,
    validate: bool,
}

impl fmt::Debug for Cascade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cascade")
            .field("components", &self.components)
            .field("scopes", &self.scopes)
            .field("instances", &self.instances.len())
            .field("pending", &self.tracker.dirty().len())
            .field("validate", &self.validate)
            .finish_non_exhaustive()
    }
}

impl Default for Cascade {
    fn default() -> Self {
        Self::new()
    }
}

impl Cascade {
    /// Creates a cascade with validators on and diagnostics logged through
    /// [`TracingSink`].
    #[must_use]
    pub fn new() -> Self {
        CascadeBuilder::new().build()
    }

    /// Returns a builder for a cascade with non-default options.
    #[must_use]
    pub fn builder() -> CascadeBuilder {
        CascadeBuilder::new()
    }

    /// Defines (or redefines) a component.
    ///
    /// Instances mounted before a redefinition keep the definition they were
    /// mounted with.
    pub fn define<N, K, S, I>(&mut self, name: N, props: I) -> Arc<ComponentDefinition>
    where
        N: Into<ComponentName>,
        K: Into<PropKey>,
        S: Into<PropSpec>,
        I: IntoIterator<Item = (K, S)>,
    {
        let definition = self.components.register(name, props);
        tracing::debug!(
            component = %definition.name(),
            props = definition.len(),
            "defined component"
        );
        definition
    }

    /// Returns the current definition of `name`.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&Arc<ComponentDefinition>> {
        self.components.get(name)
    }

    /// Returns the scope tree.
    #[must_use]
    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    /// Declares the root overrides.
    pub fn publish_root(&mut self, overrides: ConfigNode) {
        self.scopes
            .set_declared(ScopeId::ROOT, overrides)
            .expect("the root scope always exists");
        let marked = self.tracker.mark(Node::Scope(ScopeId::ROOT));
        tracing::debug!(marked, "published root overrides");
    }

    /// Creates a child scope of `parent` declaring `overrides`.
    pub fn publish_scoped(
        &mut self,
        parent: ScopeId,
        overrides: ConfigNode,
    ) -> Result<ScopeId, CascadeError> {
        let scope = self.scopes.publish_scoped(parent, overrides)?;
        self.depend(Node::Scope(scope), Node::Scope(parent));
        if self.tracker.is_dirty(Node::Scope(parent)) {
            self.tracker.mark(Node::Scope(scope));
        }
        tracing::debug!(%scope, %parent, "published scoped overrides");
        Ok(scope)
    }

    /// Replaces the overrides `scope` declares.
    pub fn update_scope(
        &mut self,
        scope: ScopeId,
        overrides: ConfigNode,
    ) -> Result<(), CascadeError> {
        self.scopes.set_declared(scope, overrides)?;
        let marked = self.tracker.mark(Node::Scope(scope));
        tracing::debug!(%scope, marked, "updated scope overrides");
        Ok(())
    }

    /// Tears down `scope`, its descendant scopes, and every instance mounted
    /// in any of them.
    ///
    /// Returns the unmounted instances.
    pub fn remove_scope(&mut self, scope: ScopeId) -> Result<Vec<InstanceId>, CascadeError> {
        let removed = self.scopes.remove(scope)?;
        let mut unmounted = Vec::new();
        for &id in &removed {
            let node = Node::Scope(id);
            let instances = self
                .tracker
                .graph()
                .dependents(node)
                .filter_map(|n| match n {
                    Node::Instance(instance) => Some(instance),
                    Node::Scope(_) => None,
                });
            unmounted.extend(instances);
            self.tracker.remove_key(node);
        }
        unmounted.sort_unstable();
        for &instance in &unmounted {
            self.instances.remove(&instance);
            self.tracker.remove_key(Node::Instance(instance));
        }
        tracing::debug!(
            %scope,
            scopes = removed.len(),
            instances = unmounted.len(),
            "removed scope"
        );
        Ok(unmounted)
    }

    /// Mounts an instance of `component` in `scope`.
    ///
    /// Props are resolved and validated immediately against what `scope`
    /// currently shows. If that is stale, the instance is recomputed on the
    /// next [`flush`](Self::flush).
    pub fn mount(
        &mut self,
        component: &str,
        scope: ScopeId,
        values: InstanceValues,
    ) -> Result<InstanceId, CascadeError> {
        let definition = self
            .components
            .get(component)
            .cloned()
            .ok_or_else(|| CascadeError::UnknownComponent(component.into()))?;
        let node = self
            .scopes
            .visible(scope)
            .ok_or(CascadeError::UnknownScope(scope))?;

        let resolved = ResolveCx::new(node).resolve_all(&definition, &values);
        let mut validator = ValidatorRunner::new();
        if self.validate {
            let sink = &mut self.sink;
            validator.check(&definition, &values, |d| sink.emit(&d));
        }

        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        self.instances.insert(
            id,
            Instance {
                definition,
                scope,
                values,
                resolved,
                validator,
            },
        );
        self.depend(Node::Instance(id), Node::Scope(scope));
        if self.tracker.is_dirty(Node::Scope(scope)) {
            self.tracker.mark(Node::Instance(id));
        }
        tracing::trace!(instance = %id, component, %scope, "mounted");
        Ok(id)
    }

    /// Removes an instance.
    pub fn unmount(&mut self, instance: InstanceId) -> Result<(), CascadeError> {
        self.instances
            .remove(&instance)
            .ok_or(CascadeError::UnknownInstance(instance))?;
        self.tracker.remove_key(Node::Instance(instance));
        Ok(())
    }

    /// Sets a raw prop value on `instance`; `Null` removes it.
    ///
    /// Returns `false`, and marks nothing, if the value is the same as the
    /// current one.
    pub fn set_prop(
        &mut self,
        instance: InstanceId,
        key: impl Into<PropKey>,
        value: impl Into<PropValue>,
    ) -> Result<bool, CascadeError> {
        let entry = self
            .instances
            .get_mut(&instance)
            .ok_or(CascadeError::UnknownInstance(instance))?;
        let key = key.into();
        let value = value.into();
        let unchanged = match entry.values.get_provided(key.as_str()) {
            Some(current) => current.same(&value),
            None => value.is_null(),
        };
        if unchanged {
            return Ok(false);
        }
        entry.values.set(key, value);
        self.tracker.mark(Node::Instance(instance));
        Ok(true)
    }

    /// Removes a raw prop value from `instance`.
    pub fn remove_prop(&mut self, instance: InstanceId, key: &str) -> Result<bool, CascadeError> {
        self.set_prop(instance, key, PropValue::Null)
    }

    /// Forces `instance` to recompute on the next flush.
    ///
    /// Use this when state captured by a factory changed.
    pub fn invalidate(&mut self, instance: InstanceId) -> Result<(), CascadeError> {
        if !self.instances.contains_key(&instance) {
            return Err(CascadeError::UnknownInstance(instance));
        }
        self.tracker.mark(Node::Instance(instance));
        Ok(())
    }

    /// Returns `true` if some scope or instance waits for a flush.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.tracker.has_dirty()
    }

    /// Recomputes everything marked since the last flush.
    ///
    /// Scopes are refreshed before anything that reads them, then instances
    /// are resolved again and their validators run. Diagnostics go to the
    /// sink and are also returned in the report.
    pub fn flush(&mut self) -> FlushReport {
        let mut report = FlushReport::default();
        let order: Vec<Node> = self.tracker.drain_sorted().collect();

        for node in order {
            match node {
                Node::Scope(scope) => {
                    if self.scopes.refresh(scope).is_ok() {
                        report.scopes_refreshed += 1;
                    }
                }
                Node::Instance(id) => {
                    let Some(instance) = self.instances.get_mut(&id) else {
                        continue;
                    };
                    let Some(visible) = self.scopes.visible(instance.scope) else {
                        continue;
                    };
                    instance.resolved =
                        ResolveCx::new(visible).resolve_all(&instance.definition, &instance.values);
                    if self.validate {
                        let sink = &mut self.sink;
                        let diagnostics = &mut report.diagnostics;
                        instance
                            .validator
                            .check(&instance.definition, &instance.values, |d| {
                                sink.emit(&d);
                                diagnostics.push(d);
                            });
                    }
                    report.instances_recomputed += 1;
                    tracing::trace!(
                        instance = %id,
                        component = %instance.definition.name(),
                        "recomputed"
                    );
                }
            }
        }

        tracing::debug!(
            scopes = report.scopes_refreshed,
            instances = report.instances_recomputed,
            diagnostics = report.diagnostics.len(),
            "flushed"
        );
        report
    }

    /// Returns the resolved props of `instance`.
    #[must_use]
    pub fn props(&self, instance: InstanceId) -> Option<&ResolvedProps> {
        self.instances.get(&instance).map(|i| &i.resolved)
    }

    /// Returns the resolved value of one prop.
    #[must_use]
    pub fn get(&self, instance: InstanceId, key: &str) -> Option<&PropValue> {
        self.props(instance)?.get(key)
    }

    /// Returns which resolution step produced one prop.
    #[must_use]
    pub fn explain(&self, instance: InstanceId, key: &str) -> Option<Resolution> {
        self.props(instance)?.resolution(key)
    }

    /// Returns the raw values passed to `instance`.
    #[must_use]
    pub fn values(&self, instance: InstanceId) -> Option<&InstanceValues> {
        self.instances.get(&instance).map(|i| &i.values)
    }

    /// Returns the scope `instance` is mounted in.
    #[must_use]
    pub fn scope_of(&self, instance: InstanceId) -> Option<ScopeId> {
        self.instances.get(&instance).map(|i| i.scope)
    }

    /// Returns the node visible in `scope`.
    #[must_use]
    pub fn visible(&self, scope: ScopeId) -> Option<&ConfigNode> {
        self.scopes.visible(scope)
    }

    /// Records that `from` reads `to`. Scope and instance edges always point
    /// up the tree, so they cannot form cycles.
    fn depend(&mut self, from: Node, to: Node) {
        self.tracker
            .add_dependency(from, to)
            .expect("scope and instance edges point up the tree");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySink;
    use alloc::vec;
    use understory_props::PropDefinitionBuilder;

    #[test]
    fn drain_puts_scopes_before_instances() {
        let mut cascade = Cascade::new();
        cascade.define("Tag", [("type", PropSpec::from("info"))]);
        let a = cascade
            .publish_scoped(ScopeId::ROOT, ConfigNode::empty())
            .unwrap();
        let tag = cascade.mount("Tag", a, InstanceValues::new()).unwrap();

        cascade.publish_root(ConfigNode::builder().default("type", "danger").build());
        assert!(cascade.has_pending());
        let order: Vec<Node> = cascade.tracker.drain_sorted().collect();
        assert_eq!(
            order,
            vec![
                Node::Scope(ScopeId::ROOT),
                Node::Scope(a),
                Node::Instance(tag),
            ]
        );
    }

    #[test]
    fn mount_into_dirty_scope_is_recomputed() {
        let mut cascade = Cascade::new();
        cascade.define("Tag", [("type", PropSpec::from("info"))]);
        cascade.publish_root(ConfigNode::builder().default("type", "danger").build());

        let tag = cascade
            .mount("Tag", ScopeId::ROOT, InstanceValues::new())
            .unwrap();
        assert_eq!(cascade.get(tag, "type"), Some(&PropValue::from("info")));

        let report = cascade.flush();
        assert_eq!(report.scopes_refreshed, 1);
        assert_eq!(report.instances_recomputed, 1);
        assert_eq!(cascade.get(tag, "type"), Some(&PropValue::from("danger")));
        assert!(!cascade.has_pending());
    }

    #[test]
    fn same_value_writes_are_ignored() {
        let mut cascade = Cascade::new();
        cascade.define("Tag", [("type", PropSpec::from("info"))]);
        let values: InstanceValues = [("type", "info")].into_iter().collect();
        let tag = cascade.mount("Tag", ScopeId::ROOT, values).unwrap();

        assert!(!cascade.set_prop(tag, "type", "info").unwrap());
        assert!(!cascade.remove_prop(tag, "closable").unwrap());
        assert!(!cascade.has_pending());

        assert!(cascade.set_prop(tag, "type", "warning").unwrap());
        assert!(cascade.has_pending());
    }

    #[test]
    fn validation_can_be_disabled() {
        let sink = MemorySink::new();
        let mut cascade = Cascade::builder()
            .diagnostics(sink.clone())
            .validate(false)
            .build();
        cascade.define(
            "Tag",
            [("type", PropDefinitionBuilder::new().validator(|_| false))],
        );
        let values: InstanceValues = [("type", "bogus")].into_iter().collect();
        let tag = cascade.mount("Tag", ScopeId::ROOT, values).unwrap();
        cascade.set_prop(tag, "type", "other").unwrap();
        assert!(cascade.flush().diagnostics.is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn unmount_drops_instance_and_its_dependency() {
        let sink = MemorySink::new();
        let mut cascade = Cascade::builder().diagnostics(sink.clone()).build();
        cascade.define(
            "Tag",
            [(
                "type",
                PropDefinitionBuilder::new()
                    .default_value("info")
                    .validator(|v| matches!(v.as_str(), Some("info" | "warning"))),
            )],
        );
        let values: InstanceValues = [("type", "bogus")].into_iter().collect();
        let tag = cascade.mount("Tag", ScopeId::ROOT, values).unwrap();
        assert_eq!(sink.take().len(), 1);
        assert_eq!(cascade.scope_of(tag), Some(ScopeId::ROOT));
        assert_eq!(
            cascade.values(tag).and_then(|v| v.get_provided("type")),
            Some(&PropValue::from("bogus"))
        );

        cascade.unmount(tag).unwrap();
        assert!(cascade.props(tag).is_none());
        assert!(cascade.values(tag).is_none());
        assert_eq!(cascade.scope_of(tag), None);
        assert_eq!(cascade.get(tag, "type"), None);
        assert_eq!(
            cascade.unmount(tag),
            Err(CascadeError::UnknownInstance(tag))
        );
        assert_eq!(
            cascade.set_prop(tag, "type", "info"),
            Err(CascadeError::UnknownInstance(tag))
        );

        cascade.publish_root(ConfigNode::builder().default("type", "warning").build());
        let report = cascade.flush();
        assert_eq!(report.scopes_refreshed, 1);
        assert_eq!(report.instances_recomputed, 0);
        assert!(report.diagnostics.is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn unmount_discards_a_pending_recompute() {
        let mut cascade = Cascade::new();
        cascade.define("Tag", [("type", PropSpec::from("info"))]);
        let tag = cascade
            .mount("Tag", ScopeId::ROOT, InstanceValues::new())
            .unwrap();
        cascade.set_prop(tag, "type", "warning").unwrap();
        assert!(cascade.has_pending());

        cascade.unmount(tag).unwrap();
        assert!(!cascade.has_pending());
        assert!(cascade.flush().is_empty());
    }

    #[test]
    fn remove_scope_unmounts_instances_below() {
        let mut cascade = Cascade::new();
        cascade.define("Tag", [("type", PropSpec::from("info"))]);
        let a = cascade
            .publish_scoped(ScopeId::ROOT, ConfigNode::empty())
            .unwrap();
        let b = cascade.publish_scoped(a, ConfigNode::empty()).unwrap();
        let in_a = cascade.mount("Tag", a, InstanceValues::new()).unwrap();
        let in_b = cascade.mount("Tag", b, InstanceValues::new()).unwrap();
        let in_root = cascade
            .mount("Tag", ScopeId::ROOT, InstanceValues::new())
            .unwrap();

        assert_eq!(cascade.remove_scope(a).unwrap(), vec![in_a, in_b]);
        assert!(cascade.props(in_b).is_none());
        assert!(cascade.props(in_root).is_some());
        assert_eq!(
            cascade.invalidate(in_a),
            Err(CascadeError::UnknownInstance(in_a))
        );
        assert_eq!(
            cascade.remove_scope(ScopeId::ROOT),
            Err(CascadeError::RootScope)
        );

        cascade.publish_root(ConfigNode::empty());
        assert_eq!(cascade.flush().instances_recomputed, 1);
    }

    #[test]
    fn unknown_handles() {
        let mut cascade = Cascade::new();
        assert_eq!(
            cascade.mount("Missing", ScopeId::ROOT, InstanceValues::new()),
            Err(CascadeError::UnknownComponent("Missing".into()))
        );
        cascade.define("Tag", [("type", PropSpec::Null)]);
        let a = cascade
            .publish_scoped(ScopeId::ROOT, ConfigNode::empty())
            .unwrap();
        cascade.remove_scope(a).unwrap();
        assert_eq!(
            cascade.mount("Tag", a, InstanceValues::new()),
            Err(CascadeError::UnknownScope(a))
        );
        assert_eq!(
            cascade.update_scope(a, ConfigNode::empty()),
            Err(CascadeError::UnknownScope(a))
        );
    }
}
