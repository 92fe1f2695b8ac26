//! Reconciliation Engine
//!
//! The engine turns two revisions of a tree into an ordered patch list.
//!
//! # Cases
//!
//! Every call is one of four cases, picked by which side is present:
//!
//! - **mount** (`None -> Some`): emit `AddNode`s (elements) or expand the
//!   render function and mount the expansion (components).
//! - **update** (`Some -> Some`): if the identities differ, unmount then
//!   mount. Otherwise diff attributes and children (elements) or re-expand
//!   and diff against the stored expansion (components).
//! - **unmount** (`Some -> None`): the mirror image of mount.
//! - **no-op** (`None -> None`): nothing.
//!
//! # Lifecycle Ordering
//!
//! `beforecreate` comes before every `AddNode` of a mount and `created`
//! after the last one; `beforedestroy`/`destroyed` bracket the `RemoveNode`s
//! of an unmount the same way. An element update can carry two
//! `beforeupdate`/`updated` pairs: one around its attribute patches and
//! one around its children's patches.
//!
//! # Component Slots
//!
//! A component's expansion is reconciled at the same positional identifier
//! as the component itself, one level deeper in the chain (see
//! [`SlotKey`]). The expansion is stored in the instance table so the next
//! update can diff against it.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use super::diff::{bracketed, diff_attrs};
use super::instance::{Instance, InstanceTable, StateArena, StateCell};
use crate::error::{Error, Result};
use crate::id::{PositionalId, SlotKey};
use crate::node::{AttrValue, Attrs, Callback, Hook, NodeKind, Render, State, StatefulOptions, VNode};
use crate::patch::Patch;

/// Host callback that re-renders one stateful slot and applies the result.
///
/// Stateful handlers call it after updating their slot's state.
pub type Trigger = Arc<dyn Fn(&SlotKey) -> Result<()> + Send + Sync>;

/// Diffs tree revisions for one render root.
///
/// An engine owns the instance table of its root. Calls must be strictly
/// sequential, each passing the tree the previous call rendered as `prev`.
pub struct ReconcilerEngine {
    instances: InstanceTable,
    arena: StateArena,
    trigger: Option<Trigger>,
}

impl ReconcilerEngine {
    /// Engine without a host. Stateful handlers still update their state
    /// but nothing re-renders until [`rerender`](Self::rerender) is called.
    pub fn new() -> Self {
        Self {
            instances: InstanceTable::new(),
            arena: StateArena::new(),
            trigger: None,
        }
    }

    /// Engine whose stateful handlers call `trigger` after each update.
    pub fn with_trigger(trigger: Trigger) -> Self {
        Self {
            trigger: Some(trigger),
            ..Self::new()
        }
    }

    /// Diff `prev` against `next` at `id`.
    pub fn reconcile(&mut self, prev: Option<&VNode>, next: Option<&VNode>, id: &PositionalId) -> Vec<Patch> {
        let patches = self.diff(prev, next, &SlotKey::new(id.clone()));
        debug!(id = %id, patches = patches.len(), "reconciled");
        patches
    }

    /// Re-expand the stateful node at `slot` with its current state and
    /// diff the result against its previous expansion.
    pub fn rerender(&mut self, slot: &SlotKey) -> Result<Vec<Patch>> {
        let instance = self
            .instances
            .get(slot)
            .ok_or_else(|| Error::UnknownSlot(slot.clone()))?;
        let component = instance.component().clone();
        let handlers = instance.handlers().clone();

        let NodeKind::Stateful { render, .. } = component.kind() else {
            return Err(Error::UnknownSlot(slot.clone()));
        };
        let state = self
            .arena
            .state(slot)
            .ok_or_else(|| Error::UnknownSlot(slot.clone()))?;

        let expansion = render.call(&props(component.attrs(), &state, &handlers));
        let patches = self.reexpand(slot, &component, expansion, handlers);
        debug!(slot = %slot, patches = patches.len(), "re-rendered stateful slot");
        Ok(patches)
    }

    /// Component instances by slot.
    pub fn instances(&self) -> &InstanceTable {
        &self.instances
    }

    /// State cells of stateful slots.
    pub fn state_arena(&self) -> &StateArena {
        &self.arena
    }

    /// Current state of the stateful slot.
    pub fn state(&self, slot: &SlotKey) -> Option<State> {
        self.arena.state(slot)
    }

    fn diff(&mut self, prev: Option<&VNode>, next: Option<&VNode>, slot: &SlotKey) -> Vec<Patch> {
        match (prev, next) {
            (None, None) => Vec::new(),
            (None, Some(next)) => self.mount(next, slot),
            (Some(prev), None) => self.unmount(prev, slot),
            (Some(prev), Some(next)) => self.update(prev, next, slot),
        }
    }

    fn mount(&mut self, node: &VNode, slot: &SlotKey) -> Vec<Patch> {
        let id = slot.id();
        let mut patches: Vec<Patch> = Patch::node_hook(node, Hook::BeforeCreate, id).into_iter().collect();

        match node.kind() {
            NodeKind::Default { .. } | NodeKind::Text => {
                patches.push(Patch::AddNode {
                    node: node.clone(),
                    id: id.clone(),
                });
                for (index, child) in node.children().iter().enumerate() {
                    patches.extend(self.mount(child, &slot.child(index)));
                }
            }
            NodeKind::Component { render } | NodeKind::Pure { render, .. } => {
                let expansion = render.call(node.attrs());
                self.instances.insert(
                    slot.clone(),
                    Instance::new(node.clone(), expansion.clone(), IndexMap::new()),
                );
                patches.extend(self.mount(&expansion, &slot.nested()));
            }
            NodeKind::Stateful { render, options } => {
                let state = options.initial_state.resolve(node.attrs());
                self.arena.insert(
                    slot.clone(),
                    StateCell {
                        state: state.clone(),
                        attrs: node.attrs().clone(),
                    },
                );
                let handlers = self.wrap_handlers(options, slot);
                let expansion = render.call(&props(node.attrs(), &state, &handlers));
                self.instances.insert(
                    slot.clone(),
                    Instance::new(node.clone(), expansion.clone(), handlers),
                );
                patches.extend(self.mount(&expansion, &slot.nested()));
            }
        }

        patches.extend(Patch::node_hook(node, Hook::Created, id));
        patches
    }

    fn update(&mut self, prev: &VNode, next: &VNode, slot: &SlotKey) -> Vec<Patch> {
        if prev.identity() != next.identity() {
            return self.replace(prev, next, slot);
        }

        match (prev.kind(), next.kind()) {
            (NodeKind::Component { .. }, NodeKind::Component { render }) => {
                self.update_component(next, render, slot)
            }
            (NodeKind::Pure { .. }, NodeKind::Pure { render, compare }) => {
                if compare(prev.attrs(), next.attrs()) {
                    trace!(slot = %slot, "pure node unchanged; skipping expansion");
                    Vec::new()
                } else {
                    self.update_component(next, render, slot)
                }
            }
            (NodeKind::Stateful { .. }, NodeKind::Stateful { render, options }) => {
                self.update_stateful(next, render, options, slot)
            }
            (NodeKind::Default { .. }, NodeKind::Default { .. }) | (NodeKind::Text, NodeKind::Text) => {
                self.update_element(prev, next, slot)
            }
            // Same render function wrapped as a different kind.
            _ => self.replace(prev, next, slot),
        }
    }

    fn replace(&mut self, prev: &VNode, next: &VNode, slot: &SlotKey) -> Vec<Patch> {
        let mut patches = self.unmount(prev, slot);
        patches.extend(self.mount(next, slot));
        patches
    }

    fn update_component(&mut self, next: &VNode, render: &Render, slot: &SlotKey) -> Vec<Patch> {
        let expansion = render.call(next.attrs());
        let patches = self.reexpand(slot, next, expansion, IndexMap::new());

        if patches.is_empty() {
            return patches;
        }
        bracketed(
            patches,
            Patch::node_hook(next, Hook::BeforeUpdate, slot.id()),
            Patch::node_hook(next, Hook::Updated, slot.id()),
        )
    }

    fn update_stateful(
        &mut self,
        next: &VNode,
        render: &Render,
        options: &StatefulOptions,
        slot: &SlotKey,
    ) -> Vec<Patch> {
        if !self.arena.set_attrs(slot, next.attrs().clone()) {
            warn!(slot = %slot, "stateful slot has no state cell; starting from initial state");
            self.arena.insert(
                slot.clone(),
                StateCell {
                    state: options.initial_state.resolve(next.attrs()),
                    attrs: next.attrs().clone(),
                },
            );
        }
        let state = self.arena.state(slot).unwrap_or_default();
        let handlers = match self.instances.get(slot) {
            Some(instance) => instance.handlers().clone(),
            None => self.wrap_handlers(options, slot),
        };

        let expansion = render.call(&props(next.attrs(), &state, &handlers));
        self.reexpand(slot, next, expansion, handlers)
    }

    /// Diff a fresh expansion against the one stored for `slot`, then store
    /// the fresh one.
    fn reexpand(
        &mut self,
        slot: &SlotKey,
        component: &VNode,
        expansion: VNode,
        handlers: IndexMap<String, Callback>,
    ) -> Vec<Patch> {
        let previous = self.instances.get(slot).map(|instance| instance.expansion().clone());
        if previous.is_none() {
            warn!(slot = %slot, "no instance recorded for component slot; mounting expansion");
        }

        let patches = self.diff(previous.as_ref(), Some(&expansion), &slot.nested());
        self.instances
            .insert(slot.clone(), Instance::new(component.clone(), expansion, handlers));
        patches
    }

    fn update_element(&mut self, prev: &VNode, next: &VNode, slot: &SlotKey) -> Vec<Patch> {
        let id = slot.id();
        let mut patches = diff_attrs(prev, next, id);

        let count = prev.children().len().max(next.children().len());
        let mut children = Vec::new();
        for index in 0..count {
            children.extend(self.diff(
                prev.children().get(index),
                next.children().get(index),
                &slot.child(index),
            ));
        }

        if !children.is_empty() {
            patches.extend(bracketed(
                children,
                Patch::transition_hook(prev, next, Hook::BeforeUpdate, id),
                Patch::transition_hook(prev, next, Hook::Updated, id),
            ));
        }
        patches
    }

    fn unmount(&mut self, node: &VNode, slot: &SlotKey) -> Vec<Patch> {
        let id = slot.id();
        let mut patches: Vec<Patch> = Patch::node_hook(node, Hook::BeforeDestroy, id).into_iter().collect();

        if node.kind().is_component() {
            match self.instances.remove(slot) {
                Some(instance) => patches.extend(self.unmount(instance.expansion(), &slot.nested())),
                None => warn!(slot = %slot, "no instance recorded for unmounted component slot"),
            }
            self.arena.remove(slot);
        } else {
            for (index, child) in node.children().iter().enumerate() {
                patches.extend(self.unmount(child, &slot.child(index)));
            }
            patches.push(Patch::RemoveNode {
                node: node.clone(),
                id: id.clone(),
            });
        }

        patches.extend(Patch::node_hook(node, Hook::Destroyed, id));
        patches
    }

    /// Wrap each declared handler into a callback bound to `slot`.
    ///
    /// Invoking the callback merges the handler's partial state into the
    /// slot's cell and then asks the host to re-render the slot.
    fn wrap_handlers(&self, options: &StatefulOptions, slot: &SlotKey) -> IndexMap<String, Callback> {
        options
            .handlers
            .iter()
            .map(|(name, handler)| {
                let handler = Arc::clone(handler);
                let arena = self.arena.clone();
                let trigger = self.trigger.clone();
                let slot = slot.clone();

                let callback = Callback::event(move |args| {
                    if !arena.update(&slot, |state, attrs| handler(state, attrs, args)) {
                        return Err(Error::UnknownSlot(slot.clone()).into());
                    }
                    if let Some(trigger) = &trigger {
                        trigger(&slot)?;
                    }
                    Ok(())
                });
                (name.clone(), callback)
            })
            .collect()
    }
}

impl Default for ReconcilerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReconcilerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconcilerEngine")
            .field("instances", &self.instances.len())
            .field("stateful_slots", &self.arena.len())
            .field("has_trigger", &self.trigger.is_some())
            .finish()
    }
}

/// Render props of a stateful node: attributes, then state, then handlers.
fn props(attrs: &Attrs, state: &State, handlers: &IndexMap<String, Callback>) -> Attrs {
    let mut props = attrs.clone();
    for (key, value) in state {
        props.insert(key.clone(), value.clone());
    }
    for (name, callback) in handlers {
        props.insert(name.clone(), AttrValue::Callback(callback.clone()));
    }
    props
}
