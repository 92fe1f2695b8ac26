//! Virtual Node Model
//!
//! This module defines the description of a UI tree that application code
//! produces and the reconciler consumes.
//!
//! # Overview
//!
//! - [`VNode`]: one immutable node: kind, identity, attributes, children and
//!   declared lifecycle callbacks.
//! - [`Attrs`]: ordered attribute map; children live beside it, never in it.
//! - [`AttrValue`]: null, booleans, numbers, strings and [`Callback`]s.
//! - [`NodeKind`]: the five node kinds as a sum type. Component kinds carry
//!   their [`Render`] function and kind-specific options.
//!
//! Nodes are values. Nothing in the reconciler mutates a node after it is
//! created; runtime state for stateful components lives in the engine's
//! state arena instead.

mod attrs;
mod value;
mod vnode;

pub use attrs::Attrs;
pub use value::{state_from_json, AttrValue, Callback, HookContext, Invocation, State};
pub use vnode::{
    ComparePredicate, Handler, Hook, Identity, InitialState, Kind, Lifecycle, NodeKind, Render,
    StatefulOptions, VNode, TEXT_VALUE,
};
