//! Error Types
//!
//! The reconciler itself does not fail: malformed trees are programmer
//! errors and are not validated. Errors come from the edges, i.e. from
//! applying patches to a render target, from caller-owned callbacks and
//! from configuration.

use thiserror::Error;

use crate::id::{PositionalId, SlotKey};
use crate::node::Hook;

/// Error type returned by caller-owned callbacks.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by caller-owned callbacks.
pub type CallbackResult = std::result::Result<(), CallbackError>;

/// Errors raised while rendering.
#[derive(Debug, Error)]
pub enum Error {
    /// A lifecycle hook returned an error. The remaining patches of the
    /// pass were not applied.
    #[error("lifecycle hook `{hook}` failed at {id}")]
    Hook {
        hook: Hook,
        id: PositionalId,
        #[source]
        source: CallbackError,
    },

    /// An event listener returned an error.
    #[error("listener for `{event}` failed at {id}")]
    Callback {
        event: String,
        id: PositionalId,
        #[source]
        source: CallbackError,
    },

    /// A handler asked for a render pass while another pass was diffing,
    /// e.g. from inside a render function.
    #[error("render requested at {id} while a render pass is in progress")]
    Reentrant { id: PositionalId },

    /// A patch addressed a slot that has no live node.
    #[error("no live node at {0}")]
    MissingElement(PositionalId),

    /// An added node's parent slot has no live node.
    #[error("no live parent for {0}")]
    MissingParent(PositionalId),

    /// A node was added on a slot that is already live. Two siblings
    /// resolving to the same identifier is a misuse of the tree API.
    #[error("slot {0} is already occupied")]
    SlotOccupied(PositionalId),

    /// A node with a render-function identity reached the render target.
    #[error("node at {0} is a component and cannot be materialised")]
    Unrenderable(PositionalId),

    /// A stateful slot was addressed that is not mounted.
    #[error("no mounted stateful instance at {0}")]
    UnknownSlot(SlotKey),

    /// No listener is registered for the dispatched event.
    #[error("no listener for `{event}` at {id}")]
    NoListener { event: String, id: PositionalId },

    /// The configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The configuration parsed but is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
