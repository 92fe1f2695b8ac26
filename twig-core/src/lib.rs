//! Twig Core
//!
//! This crate provides the core of the Twig virtual-DOM UI library.
//! It implements:
//!
//! - An immutable virtual node model with five node kinds
//! - A reconciler that diffs two trees into an ordered patch list
//! - Component expansion, pure components and stateful components
//! - Lifecycle hooks positioned around the patches they concern
//! - An in-memory render target and a frame-coalescing scheduler
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `node`: virtual nodes, attributes and callbacks
//! - `builder`: factories for building trees
//! - `reconcile`: attribute differ, instance table and the engine
//! - `patch`: the patch list the engine emits
//! - `render`: render targets, the renderer and the frame scheduler
//! - `config`: renderer configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use twig_core::builder::h;
//! use twig_core::render::{MemoryDom, Renderer};
//! use twig_core::{attrs, children};
//!
//! let renderer = Renderer::new(MemoryDom::new());
//!
//! let first = h("main", attrs! {}, children!["Hello, world"]);
//! let current = renderer.render(None, Some(&first))?;
//!
//! let second = h("main", attrs! { "class" => "greeting" }, children!["Hello, world"]);
//! renderer.render(current.as_ref(), Some(&second))?;
//!
//! let markup = renderer.with_target(MemoryDom::to_markup)?;
//! // <main class="greeting">Hello, world</main>
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod id;
pub mod node;
pub mod patch;
pub mod reconcile;
pub mod render;

pub use config::RenderConfig;
pub use error::{CallbackError, CallbackResult, Error, Result};
pub use id::{PositionalId, SlotKey};
pub use node::{AttrValue, Attrs, Callback, Hook, NodeKind, Render, VNode};
pub use patch::Patch;
pub use reconcile::ReconcilerEngine;
pub use render::{MemoryDom, RenderTarget, Renderer};
