//! Renderer
//!
//! Ties a [`ReconcilerEngine`] to a [`RenderTarget`]: reconcile, then apply
//! the patches in order.
//!
//! # Stateful Re-renders
//!
//! The renderer is the host of its engine's stateful handlers. A handler
//! updates its slot's state and then calls the engine's trigger, which
//! re-renders that one slot and applies the resulting patches.
//!
//! Engine and target share one lock, and a pass moves through two phases
//! while it holds it. During the diff, render functions run; a handler
//! called from one fails with [`Error::Reentrant`], because the engine is
//! mid-walk. During patch application the engine is idle, so a handler
//! called from a lifecycle hook queues its slot. Queued slots re-render
//! one at a time after the patch loop, each as its own pass. Listeners
//! dispatched through [`Renderer::dispatch`] run with the lock released.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::target::RenderTarget;
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::id::{PositionalId, SlotKey};
use crate::node::{AttrValue, VNode};
use crate::patch::Patch;
use crate::reconcile::{ReconcilerEngine, Trigger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Diffing,
    Applying,
}

/// Pass phase and queued slots, shared with the trigger outside the core lock.
#[derive(Debug, Default)]
struct PassState {
    phase: Phase,
    queued: VecDeque<SlotKey>,
}

type SharedPass = Arc<Mutex<PassState>>;

struct RenderCore<T> {
    engine: ReconcilerEngine,
    target: T,
    config: RenderConfig,
    pass: SharedPass,
}

impl<T: RenderTarget> RenderCore<T> {
    fn enter(&self, phase: Phase) {
        self.pass.lock().phase = phase;
    }

    fn apply_all(&mut self, patches: &[Patch]) -> Result<()> {
        for patch in patches {
            if self.config.trace_patches {
                trace!(patch = %patch, "applying patch");
            }
            self.target.apply(patch)?;
        }
        Ok(())
    }

    fn reconcile(&mut self, prev: Option<&VNode>, next: Option<&VNode>, id: &PositionalId) -> Result<usize> {
        self.enter(Phase::Diffing);
        let patches = self.engine.reconcile(prev, next, id);
        self.finish(&patches)?;
        Ok(patches.len())
    }

    fn rerender(&mut self, slot: &SlotKey) -> Result<usize> {
        self.enter(Phase::Diffing);
        let patches = match self.engine.rerender(slot) {
            Ok(patches) => patches,
            Err(err) => {
                self.enter(Phase::Idle);
                return Err(err);
            }
        };
        self.finish(&patches)?;
        Ok(patches.len())
    }

    /// Apply `patches`, then drain the slots hooks queued meanwhile.
    fn finish(&mut self, patches: &[Patch]) -> Result<()> {
        let result = self.apply_all_then_drain(patches);
        let mut pass = self.pass.lock();
        pass.phase = Phase::Idle;
        if result.is_err() {
            pass.queued.clear();
        }
        result
    }

    fn apply_all_then_drain(&mut self, patches: &[Patch]) -> Result<()> {
        self.enter(Phase::Applying);
        self.apply_all(patches)?;

        loop {
            let slot = {
                let mut pass = self.pass.lock();
                match pass.queued.pop_front() {
                    Some(slot) => {
                        pass.phase = Phase::Diffing;
                        slot
                    }
                    None => return Ok(()),
                }
            };
            let patches = self.engine.rerender(&slot)?;
            self.enter(Phase::Applying);
            self.apply_all(&patches)?;
            debug!(slot = %slot, patches = patches.len(), "queued handler render");
        }
    }
}

/// Reconciles trees into a render target.
pub struct Renderer<T> {
    core: Arc<Mutex<RenderCore<T>>>,
    root: PositionalId,
}

impl<T: RenderTarget + Send + 'static> Renderer<T> {
    /// Renderer with the default configuration.
    pub fn new(target: T) -> Self {
        Self::with_config(target, RenderConfig::default())
    }

    /// Renderer whose root and event prefix come from `config`.
    pub fn with_config(target: T, config: RenderConfig) -> Self {
        let root = config.root_id();
        let pass = SharedPass::default();
        let core = Arc::new_cyclic(|weak: &Weak<Mutex<RenderCore<T>>>| {
            let weak = weak.clone();
            let shared = pass.clone();
            let trigger: Trigger = Arc::new(move |slot: &SlotKey| -> Result<()> {
                {
                    let mut pass = shared.lock();
                    match pass.phase {
                        Phase::Diffing => return Err(Error::Reentrant { id: slot.id().clone() }),
                        Phase::Applying => {
                            trace!(slot = %slot, "handler render queued");
                            pass.queued.push_back(slot.clone());
                            return Ok(());
                        }
                        Phase::Idle => {}
                    }
                }
                let core = weak.upgrade().ok_or_else(|| Error::UnknownSlot(slot.clone()))?;
                let mut core = core.try_lock().ok_or_else(|| Error::Reentrant {
                    id: slot.id().clone(),
                })?;
                let patches = core.rerender(slot)?;
                debug!(slot = %slot, patches, "handler-triggered render");
                Ok(())
            });

            Mutex::new(RenderCore {
                engine: ReconcilerEngine::with_trigger(trigger),
                target,
                config,
                pass,
            })
        });

        Self { core, root }
    }

    /// Render `next` over `prev` at the configured root.
    ///
    /// Returns the tree that is now current: `next` if anything changed,
    /// `prev` otherwise.
    pub fn render(&self, prev: Option<&VNode>, next: Option<&VNode>) -> Result<Option<VNode>> {
        let root = self.root.clone();
        self.render_at(prev, next, &root)
    }

    /// Like [`render`](Self::render), at an explicit root.
    pub fn render_at(&self, prev: Option<&VNode>, next: Option<&VNode>, id: &PositionalId) -> Result<Option<VNode>> {
        let mut core = self
            .core
            .try_lock()
            .ok_or_else(|| Error::Reentrant { id: id.clone() })?;

        let patches = core.reconcile(prev, next, id)?;

        if patches == 0 {
            Ok(prev.cloned())
        } else {
            Ok(next.cloned())
        }
    }

    /// Re-render one stateful slot.
    pub fn rerender(&self, slot: &SlotKey) -> Result<()> {
        let mut core = self.core.try_lock().ok_or_else(|| Error::Reentrant {
            id: slot.id().clone(),
        })?;
        core.rerender(slot).map(|_| ())
    }

    /// Invoke the listener for `event` on the live node at `id`.
    pub fn dispatch(&self, id: &PositionalId, event: &str, args: &[AttrValue]) -> Result<()> {
        let listener = {
            let core = self
                .core
                .try_lock()
                .ok_or_else(|| Error::Reentrant { id: id.clone() })?;
            core.target.listener(id, event)
        };
        let listener = listener.ok_or_else(|| Error::NoListener {
            event: event.to_string(),
            id: id.clone(),
        })?;

        listener.emit(args).map_err(|source| Error::Callback {
            event: event.to_string(),
            id: id.clone(),
            source,
        })
    }

    /// Run `f` against the render target.
    pub fn with_target<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        let core = self.core.try_lock().ok_or_else(|| Error::Reentrant {
            id: self.root.clone(),
        })?;
        Ok(f(&core.target))
    }

    /// Run `f` against the engine, e.g. to inspect stateful slots.
    pub fn with_engine<R>(&self, f: impl FnOnce(&ReconcilerEngine) -> R) -> Result<R> {
        let core = self.core.try_lock().ok_or_else(|| Error::Reentrant {
            id: self.root.clone(),
        })?;
        Ok(f(&core.engine))
    }

    /// Root id trees are rendered at.
    pub fn root(&self) -> &PositionalId {
        &self.root
    }
}

impl<T> fmt::Debug for Renderer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer").field("root", &self.root).finish_non_exhaustive()
    }
}
