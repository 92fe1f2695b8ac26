//! Render Targets
//!
//! A render target is whatever applies patches: an in-memory element tree,
//! a real DOM behind an FFI boundary, a terminal. The reconciler never
//! talks to one directly; the [`Renderer`](super::Renderer) feeds it patch
//! lists in order.

use crate::error::Result;
use crate::id::PositionalId;
use crate::node::Callback;
use crate::patch::Patch;

/// Opaque handle to a live element owned by a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub(crate) usize);

impl ElementHandle {
    /// Position in the target's element storage.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Applies patches to live elements.
pub trait RenderTarget {
    /// Apply one patch. Patches arrive in the order the reconciler emitted
    /// them; an error aborts the rest of the pass.
    fn apply(&mut self, patch: &Patch) -> Result<()>;

    /// Listener registered for `event` on the element at `id`.
    fn listener(&self, _id: &PositionalId, _event: &str) -> Option<Callback> {
        None
    }
}
