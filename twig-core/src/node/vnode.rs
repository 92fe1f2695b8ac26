//! Virtual Nodes
//!
//! A [`VNode`] describes one node of the tree: what kind of node it is, its
//! identity, its attributes and children, and the lifecycle callbacks it
//! declares.
//!
//! # Kinds
//!
//! | Kind        | Identity          | Reconciled by                          |
//! |-------------|-------------------|----------------------------------------|
//! | `Default`   | tag name          | attribute diff + positional children   |
//! | `Text`      | text marker       | attribute diff on `nodeValue`          |
//! | `Component` | render function   | re-expansion on every update           |
//! | `Stateful`  | render function   | re-expansion with per-slot state       |
//! | `Pure`      | render function   | re-expansion unless the predicate says |
//! |             |                   | the attributes are unchanged           |
//!
//! Nodes are immutable once created and share their body, so cloning a node
//! (which every patch does) is a reference-count bump.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::warn;

use super::attrs::Attrs;
use super::value::{AttrValue, Callback, State};

/// Attribute key holding the content of a text node.
pub const TEXT_VALUE: &str = "nodeValue";

/// Lifecycle hooks a node may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    BeforeCreate,
    Created,
    BeforeUpdate,
    Updated,
    BeforeDestroy,
    Destroyed,
}

impl Hook {
    /// Every hook, in the order they can fire over a node's life.
    pub const ALL: [Hook; 6] = [
        Hook::BeforeCreate,
        Hook::Created,
        Hook::BeforeUpdate,
        Hook::Updated,
        Hook::BeforeDestroy,
        Hook::Destroyed,
    ];

    /// Attribute name under which the hook is declared.
    pub fn name(self) -> &'static str {
        match self {
            Hook::BeforeCreate => "beforecreate",
            Hook::Created => "created",
            Hook::BeforeUpdate => "beforeupdate",
            Hook::Updated => "updated",
            Hook::BeforeDestroy => "beforedestroy",
            Hook::Destroyed => "destroyed",
        }
    }

    /// Hook declared under attribute `name`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|hook| hook.name() == name)
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared lifecycle callbacks. Undeclared hooks are simply absent.
#[derive(Debug, Clone, Default)]
pub struct Lifecycle(IndexMap<Hook, Callback>);

impl Lifecycle {
    /// Get the callback for a hook.
    pub fn get(&self, hook: Hook) -> Option<&Callback> {
        self.0.get(&hook)
    }

    /// Whether a hook is declared.
    pub fn contains(&self, hook: Hook) -> bool {
        self.0.contains_key(&hook)
    }

    /// Declare a hook, replacing any earlier callback.
    pub fn insert(&mut self, hook: Hook, callback: Callback) {
        self.0.insert(hook, callback);
    }

    /// Number of declared hooks.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Declared hooks, in declaration order.
    pub fn hooks(&self) -> impl Iterator<Item = Hook> + '_ {
        self.0.keys().copied()
    }
}

/// A named render function: props in, tree out.
///
/// Two render functions are the same identity only if they are clones of
/// the same `Render`; the name is for diagnostics.
#[derive(Clone)]
pub struct Render {
    name: Arc<str>,
    f: Arc<dyn Fn(&Attrs) -> VNode + Send + Sync>,
}

impl Render {
    /// Name a render function. Clones share identity.
    pub fn new<F>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(&Attrs) -> VNode + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    /// Name used in labels and logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expand the render function with the given props.
    pub fn call(&self, props: &Attrs) -> VNode {
        (self.f)(props)
    }

    /// Whether both refer to the same render function.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl fmt::Debug for Render {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Render({})", self.name)
    }
}

/// Predicate deciding that a pure node's attributes are "equal enough" to
/// skip re-expansion. Called as `compare(prev_attrs, next_attrs)`.
pub type ComparePredicate = Arc<dyn Fn(&Attrs, &Attrs) -> bool + Send + Sync>;

/// A stateful handler: `(state, attrs, args) -> partial state`.
pub type Handler = Arc<dyn Fn(&State, &Attrs, &[AttrValue]) -> State + Send + Sync>;

/// Where a stateful node's initial state comes from.
#[derive(Clone)]
pub enum InitialState {
    Value(State),
    Factory(Arc<dyn Fn(&Attrs) -> State + Send + Sync>),
}

impl InitialState {
    /// A fixed initial state.
    pub fn value(state: State) -> Self {
        InitialState::Value(state)
    }

    /// Initial state computed from the node's attributes.
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn(&Attrs) -> State + Send + Sync + 'static,
    {
        InitialState::Factory(Arc::new(f))
    }

    /// Initial state from a JSON object.
    pub fn from_json(value: serde_json::Value) -> Self {
        InitialState::Value(super::value::state_from_json(value))
    }

    /// Produce the state for a node mounted with `attrs`.
    pub fn resolve(&self, attrs: &Attrs) -> State {
        match self {
            InitialState::Value(state) => state.clone(),
            InitialState::Factory(f) => f(attrs),
        }
    }
}

impl Default for InitialState {
    fn default() -> Self {
        InitialState::Value(State::new())
    }
}

impl fmt::Debug for InitialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitialState::Value(state) => f.debug_tuple("Value").field(state).finish(),
            InitialState::Factory(_) => f.write_str("Factory"),
        }
    }
}

/// Extra options carried by a stateful node.
#[derive(Clone, Default)]
pub struct StatefulOptions {
    pub initial_state: InitialState,
    pub handlers: IndexMap<String, Handler>,
}

impl StatefulOptions {
    /// Options with no handlers.
    pub fn new(initial_state: InitialState) -> Self {
        Self {
            initial_state,
            handlers: IndexMap::new(),
        }
    }

    /// Add a named handler.
    pub fn handler<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&State, &Attrs, &[AttrValue]) -> State + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(f));
        self
    }
}

impl fmt::Debug for StatefulOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatefulOptions")
            .field("initial_state", &self.initial_state)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The kind of a node, with the data only that kind carries.
#[derive(Clone)]
pub enum NodeKind {
    /// An element with a tag name.
    Default { tag: Arc<str> },

    /// A text leaf. Its content lives in the `nodeValue` attribute.
    Text,

    /// A component, re-expanded on every update.
    Component { render: Render },

    /// A component with local state and handlers.
    Stateful {
        render: Render,
        options: StatefulOptions,
    },

    /// A component that skips re-expansion when `compare` says so.
    Pure {
        render: Render,
        compare: ComparePredicate,
    },
}

impl NodeKind {
    /// The plain discriminant.
    pub fn kind(&self) -> Kind {
        match self {
            NodeKind::Default { .. } => Kind::Default,
            NodeKind::Text => Kind::Text,
            NodeKind::Component { .. } => Kind::Component,
            NodeKind::Stateful { .. } => Kind::Stateful,
            NodeKind::Pure { .. } => Kind::Pure,
        }
    }

    /// Whether nodes of this kind expand through a render function and own
    /// an instance-table entry.
    pub fn is_component(&self) -> bool {
        !matches!(self, NodeKind::Default { .. } | NodeKind::Text)
    }

    /// Render function, for component kinds.
    pub fn render(&self) -> Option<&Render> {
        match self {
            NodeKind::Component { render }
            | NodeKind::Stateful { render, .. }
            | NodeKind::Pure { render, .. } => Some(render),
            NodeKind::Default { .. } | NodeKind::Text => None,
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Default { tag } => write!(f, "Default({tag})"),
            NodeKind::Text => f.write_str("Text"),
            NodeKind::Component { render } => write!(f, "Component({})", render.name()),
            NodeKind::Stateful { render, .. } => write!(f, "Stateful({})", render.name()),
            NodeKind::Pure { render, .. } => write!(f, "Pure({})", render.name()),
        }
    }
}

/// Plain node-kind discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Default,
    Text,
    Component,
    Stateful,
    Pure,
}

/// Borrowed view of a node's identity.
///
/// Tags compare by name; render functions compare by reference.
#[derive(Debug, Clone, Copy)]
pub enum Identity<'a> {
    Tag(&'a str),
    Text,
    Render(&'a Render),
}

impl PartialEq for Identity<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Identity::Tag(a), Identity::Tag(b)) => a == b,
            (Identity::Text, Identity::Text) => true,
            (Identity::Render(a), Identity::Render(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

struct NodeBody {
    kind: NodeKind,
    attrs: Attrs,
    lifecycle: Lifecycle,
}

/// An immutable node description.
#[derive(Clone)]
pub struct VNode(Arc<NodeBody>);

impl VNode {
    /// Create a node.
    ///
    /// Attributes named after a lifecycle hook whose value is a callback are
    /// moved out of `attrs` into the node's lifecycle map. `children`
    /// replaces whatever children `attrs` carried.
    pub fn create(kind: NodeKind, mut attrs: Attrs, children: Vec<VNode>) -> Self {
        let mut lifecycle = Lifecycle::default();

        for hook in Hook::ALL {
            match attrs.get(hook.name()) {
                Some(AttrValue::Callback(callback)) => {
                    lifecycle.insert(hook, callback.clone());
                    attrs.remove(hook.name());
                }
                Some(other) => {
                    warn!(hook = %hook, value = ?other, "lifecycle attribute is not a callback");
                }
                None => {}
            }
        }

        attrs.set_children(children);

        Self(Arc::new(NodeBody {
            kind,
            attrs,
            lifecycle,
        }))
    }

    /// What sort of node this is.
    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    /// Identity used to decide update versus replace.
    pub fn identity(&self) -> Identity<'_> {
        match &self.0.kind {
            NodeKind::Default { tag } => Identity::Tag(&**tag),
            NodeKind::Text => Identity::Text,
            NodeKind::Component { render }
            | NodeKind::Stateful { render, .. }
            | NodeKind::Pure { render, .. } => Identity::Render(render),
        }
    }

    /// Attributes, without lifecycle hooks.
    pub fn attrs(&self) -> &Attrs {
        &self.0.attrs
    }

    /// Child nodes.
    pub fn children(&self) -> &[VNode] {
        self.0.attrs.children()
    }

    /// Declared lifecycle hooks.
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.0.lifecycle
    }

    /// Get the callback for one hook.
    pub fn hook(&self, hook: Hook) -> Option<&Callback> {
        self.0.lifecycle.get(hook)
    }

    /// Tag name, for `Default` nodes.
    pub fn tag(&self) -> Option<&str> {
        match &self.0.kind {
            NodeKind::Default { tag } => Some(&**tag),
            _ => None,
        }
    }

    /// Short human-readable label: tag, `#text`, or render function name.
    pub fn label(&self) -> &str {
        match self.identity() {
            Identity::Tag(tag) => tag,
            Identity::Text => "#text",
            Identity::Render(render) => render.name(),
        }
    }

    /// Whether both handles share the same node body.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VNode")
            .field("kind", &self.0.kind)
            .field("attrs", &self.0.attrs.iter().collect::<Vec<_>>())
            .field("hooks", &self.0.lifecycle.hooks().collect::<Vec<_>>())
            .field("children", &self.children())
            .finish()
    }
}
