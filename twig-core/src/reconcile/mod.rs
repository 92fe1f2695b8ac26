//! Reconciliation
//!
//! Given the tree rendered last time and the tree to render now, the
//! reconciler produces the ordered list of [`Patch`](crate::patch::Patch)es
//! that transforms one into the other.
//!
//! # Architecture
//!
//! - [`diff`]: attribute diffing between two nodes of the same identity.
//! - [`instance`]: per-slot bookkeeping for component kinds: the last
//!   expansion of each component and the local state of stateful ones.
//! - [`engine`]: the recursive tree walk tying the two together.
//!
//! Children are matched by position only. There are no keys.

pub mod diff;
pub mod engine;
pub mod instance;

pub use diff::diff_attrs;
pub use engine::{ReconcilerEngine, Trigger};
pub use instance::{Instance, InstanceTable, StateArena, StateCell};
