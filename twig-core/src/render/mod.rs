//! Rendering Pipeline
//!
//! This module turns patch lists into live elements.
//!
//! - [`RenderTarget`]: the trait every surface implements.
//! - [`MemoryDom`]: an in-memory retained tree, used for tests and
//!   server-side markup.
//! - [`Renderer`]: engine plus target behind one lock, and the host of
//!   stateful re-renders.
//! - [`FrameScheduler`]: coalesces render requests into frames.

mod memory;
mod renderer;
mod scheduler;
mod target;

pub use memory::{Element, ElementKind, MemoryDom};
pub use renderer::Renderer;
pub use scheduler::{FrameScheduler, FrameSource, ManualFrames};
pub use target::{ElementHandle, RenderTarget};
