//! Frame Scheduler
//!
//! Coalesces render requests into frames. Any number of requests between
//! two frames result in one render pass, of the most recently requested
//! tree, against the tree the previous frame left current.
//!
//! # Flow
//!
//! 1. `request(tree)` stores `tree` as pending. If no frame is scheduled
//!    yet, it asks the [`FrameSource`] for one.
//! 2. Further requests only overwrite the pending tree.
//! 3. The host calls `on_frame()` when the frame fires. The pending tree
//!    is rendered and becomes the previous tree for the next frame.

use tracing::{debug, warn};

use super::renderer::Renderer;
use super::target::RenderTarget;
use crate::error::Result;
use crate::node::VNode;

/// Something that can be asked to fire a frame later, e.g. a display-refresh
/// callback or an event loop tick.
pub trait FrameSource {
    /// Ask for one call to [`FrameScheduler::on_frame`].
    fn request_frame(&mut self);
}

/// Frame source driven by hand. Counts requests; the owner fires frames.
#[derive(Debug, Default)]
pub struct ManualFrames {
    requested: usize,
}

impl ManualFrames {
    /// Frame source that records requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many frames have been requested so far.
    pub fn requested(&self) -> usize {
        self.requested
    }
}

impl FrameSource for ManualFrames {
    fn request_frame(&mut self) {
        self.requested += 1;
    }
}

/// Frame-coalescing front end of a [`Renderer`].
#[derive(Debug)]
pub struct FrameScheduler<T, F> {
    renderer: Renderer<T>,
    frames: F,
    previous: Option<VNode>,
    pending: Option<VNode>,
    scheduled: bool,
}

impl<T, F> FrameScheduler<T, F>
where
    T: RenderTarget + Send + 'static,
    F: FrameSource,
{
    /// Scheduler with nothing rendered yet.
    pub fn new(renderer: Renderer<T>, frames: F) -> Self {
        Self {
            renderer,
            frames,
            previous: None,
            pending: None,
            scheduled: false,
        }
    }

    /// Schedule `tree` for the next frame.
    pub fn request(&mut self, tree: VNode) {
        self.pending = Some(tree);
        if !self.scheduled {
            self.scheduled = true;
            self.frames.request_frame();
        }
    }

    /// Render the pending tree.
    ///
    /// If the pass fails the pending tree still becomes the previous tree,
    /// since some of its patches may already be applied.
    pub fn on_frame(&mut self) -> Result<()> {
        self.scheduled = false;
        let Some(next) = self.pending.take() else {
            warn!("frame fired with nothing pending");
            return Ok(());
        };

        match self.renderer.render(self.previous.as_ref(), Some(&next)) {
            Ok(current) => {
                debug!(changed = current.as_ref().is_some_and(|c| c.ptr_eq(&next)), "frame rendered");
                self.previous = current;
                Ok(())
            }
            Err(err) => {
                self.previous = Some(next);
                Err(err)
            }
        }
    }

    /// The tree the last frame left current.
    pub fn previous(&self) -> Option<&VNode> {
        self.previous.as_ref()
    }

    /// Whether a frame is pending.
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// The renderer passes run through.
    pub fn renderer(&self) -> &Renderer<T> {
        &self.renderer
    }

    /// The frame source.
    pub fn frames(&self) -> &F {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::h;
    use crate::render::MemoryDom;
    use crate::{attrs, children};

    fn scheduler() -> FrameScheduler<MemoryDom, ManualFrames> {
        FrameScheduler::new(Renderer::new(MemoryDom::new()), ManualFrames::new())
    }

    #[test]
    fn coalesces_requests_into_one_frame() {
        let mut scheduler = scheduler();

        scheduler.request(h("p", attrs! {}, children!["first"]));
        scheduler.request(h("p", attrs! {}, children!["second"]));
        assert_eq!(scheduler.frames().requested(), 1);
        assert!(scheduler.is_scheduled());

        scheduler.on_frame().unwrap();

        assert!(!scheduler.is_scheduled());
        let markup = scheduler.renderer().with_target(MemoryDom::to_markup).unwrap();
        assert_eq!(markup, "<p>second</p>");
    }

    #[test]
    fn unchanged_tree_keeps_previous() {
        let mut scheduler = scheduler();
        let first = h("p", attrs! {}, children!["same"]);

        scheduler.request(first.clone());
        scheduler.on_frame().unwrap();
        scheduler.request(h("p", attrs! {}, children!["same"]));
        scheduler.on_frame().unwrap();

        assert_eq!(scheduler.frames().requested(), 2);
        assert!(scheduler.previous().unwrap().ptr_eq(&first));
    }

    #[test]
    fn empty_frame_is_harmless() {
        let mut scheduler = scheduler();
        scheduler.on_frame().unwrap();
        assert!(scheduler.previous().is_none());
    }
}
