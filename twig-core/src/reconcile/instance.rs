//! Instance Table and State Arena
//!
//! Component-kind slots keep two pieces of bookkeeping between passes:
//!
//! - The **instance table** remembers, per slot, the component node that
//!   was last reconciled there and the tree its render function expanded
//!   to. The next update diffs against that expansion.
//! - The **state arena** holds the local state and latest attributes of
//!   each mounted stateful slot. Handlers read and write it directly and
//!   then ask the host to re-render the slot.
//!
//! The instance table is owned by one engine. The arena is shared with the
//! handler callbacks the engine hands out, so it sits behind a lock.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::id::SlotKey;
use crate::node::{Attrs, Callback, State, VNode};

/// Bookkeeping for one mounted component slot.
#[derive(Debug, Clone)]
pub struct Instance {
    component: VNode,
    expansion: VNode,
    handlers: IndexMap<String, Callback>,
}

impl Instance {
    /// Record a component node with its current expansion.
    pub fn new(component: VNode, expansion: VNode, handlers: IndexMap<String, Callback>) -> Self {
        Self {
            component,
            expansion,
            handlers,
        }
    }

    /// The unexpanded node last reconciled at the slot.
    pub fn component(&self) -> &VNode {
        &self.component
    }

    /// What the component's render function last produced.
    pub fn expansion(&self) -> &VNode {
        &self.expansion
    }

    /// Wrapped handlers of a stateful slot. Empty for other kinds.
    pub fn handlers(&self) -> &IndexMap<String, Callback> {
        &self.handlers
    }
}

/// Slot -> most recent expansion.
#[derive(Debug, Default)]
pub struct InstanceTable {
    entries: HashMap<SlotKey, Instance>,
}

impl InstanceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the instance at a slot.
    pub fn get(&self, slot: &SlotKey) -> Option<&Instance> {
        self.entries.get(slot)
    }

    /// Record (or overwrite) the instance at `slot`.
    pub fn insert(&mut self, slot: SlotKey, instance: Instance) -> Option<Instance> {
        self.entries.insert(slot, instance)
    }

    /// Remove the instance at a slot.
    pub fn remove(&mut self, slot: &SlotKey) -> Option<Instance> {
        self.entries.remove(slot)
    }

    /// Whether a slot has an instance.
    pub fn contains(&self, slot: &SlotKey) -> bool {
        self.entries.contains_key(slot)
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Local state of one stateful slot.
#[derive(Debug, Clone)]
pub struct StateCell {
    pub state: State,

    /// Attributes of the stateful node as last reconciled. Handlers see
    /// these, not the attributes the slot was first mounted with.
    pub attrs: Attrs,
}

/// Per-slot state cells shared between an engine and its handlers.
#[derive(Debug, Clone, Default)]
pub struct StateArena {
    cells: Arc<Mutex<HashMap<SlotKey, StateCell>>>,
}

impl StateArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the state cell for a slot, replacing any previous one.
    pub fn insert(&self, slot: SlotKey, cell: StateCell) {
        self.cells.lock().insert(slot, cell);
    }

    /// Drop a slot's state cell.
    pub fn remove(&self, slot: &SlotKey) -> Option<StateCell> {
        self.cells.lock().remove(slot)
    }

    /// Copy of the cell at `slot`.
    pub fn get(&self, slot: &SlotKey) -> Option<StateCell> {
        self.cells.lock().get(slot).cloned()
    }

    /// Copy of the state at `slot`.
    pub fn state(&self, slot: &SlotKey) -> Option<State> {
        self.cells.lock().get(slot).map(|cell| cell.state.clone())
    }

    /// Replace the attributes recorded for `slot`. Returns `false` if the
    /// slot has no cell.
    pub fn set_attrs(&self, slot: &SlotKey, attrs: Attrs) -> bool {
        match self.cells.lock().get_mut(slot) {
            Some(cell) => {
                cell.attrs = attrs;
                true
            }
            None => false,
        }
    }

    /// Compute a partial state from the current cell and merge it in.
    ///
    /// `f` runs without the arena locked, so it may itself read the arena.
    /// Returns `false` if the slot has no cell.
    pub fn update<F>(&self, slot: &SlotKey, f: F) -> bool
    where
        F: FnOnce(&State, &Attrs) -> State,
    {
        let Some(cell) = self.get(slot) else {
            return false;
        };
        let partial = f(&cell.state, &cell.attrs);

        match self.cells.lock().get_mut(slot) {
            Some(cell) => {
                cell.state.extend(partial);
                true
            }
            None => false,
        }
    }

    /// Number of stateful slots.
    pub fn len(&self) -> usize {
        self.cells.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::PositionalId;
    use crate::node::AttrValue;

    fn slot() -> SlotKey {
        SlotKey::new(PositionalId::root())
    }

    #[test]
    fn update_merges_partial_state() {
        let arena = StateArena::new();
        arena.insert(
            slot(),
            StateCell {
                state: State::from([
                    ("count".to_string(), AttrValue::Int(1)),
                    ("label".to_string(), AttrValue::from("clicks")),
                ]),
                attrs: crate::attrs! { "step" => 2 },
            },
        );

        let updated = arena.update(&slot(), |state, attrs| {
            let count = state.get("count").and_then(AttrValue::as_int).unwrap_or(0);
            let step = attrs.get("step").and_then(AttrValue::as_int).unwrap_or(1);
            State::from([("count".to_string(), AttrValue::Int(count + step))])
        });

        assert!(updated);
        let state = arena.state(&slot()).unwrap();
        assert_eq!(state.get("count"), Some(&AttrValue::Int(3)));
        assert_eq!(state.get("label"), Some(&AttrValue::from("clicks")));
    }

    #[test]
    fn update_on_missing_slot_is_rejected() {
        let arena = StateArena::new();
        assert!(!arena.update(&slot(), |_, _| State::new()));
        assert!(!arena.set_attrs(&slot(), Attrs::new()));
    }

    #[test]
    fn clones_share_cells() {
        let arena = StateArena::new();
        let shared = arena.clone();
        arena.insert(
            slot(),
            StateCell {
                state: State::new(),
                attrs: Attrs::new(),
            },
        );

        assert_eq!(shared.len(), 1);
        shared.remove(&slot());
        assert!(arena.is_empty());
    }
}
