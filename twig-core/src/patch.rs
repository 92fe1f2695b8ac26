//! Patch List
//!
//! The reconciler's output: an ordered list of mutation instructions for a
//! render target. Order is part of the contract. Lifecycle patches are
//! positioned so that a target applying the list front to back fires
//! `beforecreate` before a node's `AddNode`s and `created` after the last
//! of them, and symmetrically for updates and removal.

use std::fmt;

use crate::id::PositionalId;
use crate::node::{AttrValue, Callback, Hook, VNode};

/// One mutation instruction.
#[derive(Debug, Clone)]
pub enum Patch {
    /// Materialise `node` (without its children) at `id`.
    AddNode { node: VNode, id: PositionalId },

    /// Remove the live node at `id`.
    RemoveNode { node: VNode, id: PositionalId },

    /// Set an attribute that was absent.
    AddAttr(AttrChange),

    /// Replace an attribute value.
    UpdateAttr(AttrChange),

    /// Remove an attribute. `value` is `None`.
    RemoveAttr(AttrChange),

    /// Invoke a lifecycle hook.
    Lifecycle(LifecycleCall),
}

/// Payload of the attribute patches.
#[derive(Debug, Clone)]
pub struct AttrChange {
    pub key: String,
    pub value: Option<AttrValue>,
    pub prev: VNode,
    pub next: VNode,
    pub id: PositionalId,
}

/// Payload of a lifecycle patch.
#[derive(Debug, Clone)]
pub struct LifecycleCall {
    pub hook: Hook,
    pub target: HookTarget,
    pub id: PositionalId,
}

/// The node(s) a lifecycle hook concerns.
#[derive(Debug, Clone)]
pub enum HookTarget {
    /// Creation and destruction hooks, and component update hooks.
    Node(VNode),

    /// Update hooks of an element: the node before and after.
    Transition { prev: VNode, next: VNode },
}

impl HookTarget {
    /// The node whose lifecycle map declares the hook.
    pub fn node(&self) -> &VNode {
        match self {
            HookTarget::Node(node) => node,
            HookTarget::Transition { next, .. } => next,
        }
    }

    /// The hook's callback on the target node.
    pub fn callback(&self, hook: Hook) -> Option<&Callback> {
        self.node().hook(hook)
    }
}

/// Plain patch discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchKind {
    AddNode,
    RemoveNode,
    AddAttr,
    UpdateAttr,
    RemoveAttr,
    Lifecycle,
}

impl Patch {
    /// Lifecycle patch for `hook` on `node`, if the node declares it.
    pub fn node_hook(node: &VNode, hook: Hook, id: &PositionalId) -> Option<Patch> {
        node.lifecycle().contains(hook).then(|| {
            Patch::Lifecycle(LifecycleCall {
                hook,
                target: HookTarget::Node(node.clone()),
                id: id.clone(),
            })
        })
    }

    /// Update-hook patch for an element transition, if `next` declares it.
    pub fn transition_hook(prev: &VNode, next: &VNode, hook: Hook, id: &PositionalId) -> Option<Patch> {
        next.lifecycle().contains(hook).then(|| {
            Patch::Lifecycle(LifecycleCall {
                hook,
                target: HookTarget::Transition {
                    prev: prev.clone(),
                    next: next.clone(),
                },
                id: id.clone(),
            })
        })
    }

    /// Which kind of patch this is.
    pub fn kind(&self) -> PatchKind {
        match self {
            Patch::AddNode { .. } => PatchKind::AddNode,
            Patch::RemoveNode { .. } => PatchKind::RemoveNode,
            Patch::AddAttr(_) => PatchKind::AddAttr,
            Patch::UpdateAttr(_) => PatchKind::UpdateAttr,
            Patch::RemoveAttr(_) => PatchKind::RemoveAttr,
            Patch::Lifecycle(_) => PatchKind::Lifecycle,
        }
    }

    /// Slot the patch applies to.
    pub fn id(&self) -> &PositionalId {
        match self {
            Patch::AddNode { id, .. } | Patch::RemoveNode { id, .. } => id,
            Patch::AddAttr(change) | Patch::UpdateAttr(change) | Patch::RemoveAttr(change) => &change.id,
            Patch::Lifecycle(call) => &call.id,
        }
    }

    /// The hook, for lifecycle patches.
    pub fn hook(&self) -> Option<Hook> {
        match self {
            Patch::Lifecycle(call) => Some(call.hook),
            _ => None,
        }
    }
}

/// Compact one-line form, e.g. `add 0.1 li` or `update-attr 0 lang=pt`.
impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Patch::AddNode { node, id } => write!(f, "add {id} {}", node.label()),
            Patch::RemoveNode { node, id } => write!(f, "remove {id} {}", node.label()),
            Patch::AddAttr(change) => write!(f, "add-attr {} {}={}", change.id, change.key, value_text(change)),
            Patch::UpdateAttr(change) => {
                write!(f, "update-attr {} {}={}", change.id, change.key, value_text(change))
            }
            Patch::RemoveAttr(change) => write!(f, "remove-attr {} {}", change.id, change.key),
            Patch::Lifecycle(call) => write!(f, "{} {}", call.hook, call.id),
        }
    }
}

fn value_text(change: &AttrChange) -> String {
    match &change.value {
        Some(AttrValue::Callback(_)) => "<callback>".to_string(),
        Some(value) => value.to_text(),
        None => String::new(),
    }
}
