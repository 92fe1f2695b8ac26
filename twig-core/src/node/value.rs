//! Attribute Values and Callbacks
//!
//! Attribute values are the leaves of a node description: null, booleans,
//! numbers, strings and callbacks. Callbacks compare by reference, so a
//! callback carried over from one render to the next produces no patch.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::CallbackResult;
use crate::id::PositionalId;
use crate::render::ElementHandle;

use super::attrs::Attrs;
use super::vnode::Hook;

/// Local state of a stateful node, merged into its render props.
pub type State = IndexMap<String, AttrValue>;

/// A single attribute value.
#[derive(Clone)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Callback(Callback),
}

impl AttrValue {
    /// Whether the value counts as present for diffing.
    ///
    /// `Null` and `false` are treated exactly like a missing key, which is
    /// how boolean attributes get removed.
    pub fn is_present(&self) -> bool {
        !matches!(self, AttrValue::Null | AttrValue::Bool(false))
    }

    /// The string, for `Str` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, for `Int` values.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The flag, for `Bool` values.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The callback, for `Callback` values.
    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            AttrValue::Callback(cb) => Some(cb),
            _ => None,
        }
    }

    /// Textual form used for text content and serialized attributes.
    /// Callbacks and null have no text.
    pub fn to_text(&self) -> String {
        match self {
            AttrValue::Null | AttrValue::Callback(_) => String::new(),
            AttrValue::Bool(b) => b.to_string(),
            AttrValue::Int(i) => i.to_string(),
            AttrValue::Float(x) => x.to_string(),
            AttrValue::Str(s) => s.clone(),
        }
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Null, AttrValue::Null) => true,
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            (AttrValue::Int(a), AttrValue::Int(b)) => a == b,
            // NaN matches NaN so an unchanged attribute stays unchanged.
            (AttrValue::Float(a), AttrValue::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (AttrValue::Str(a), AttrValue::Str(b)) => a == b,
            (AttrValue::Callback(a), AttrValue::Callback(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => f.write_str("Null"),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Int(i) => write!(f, "{i}"),
            AttrValue::Float(x) => write!(f, "{x}"),
            AttrValue::Str(s) => write!(f, "{s:?}"),
            AttrValue::Callback(cb) => cb.fmt(f),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(i64::from(value))
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<Callback> for AttrValue {
    fn from(value: Callback) -> Self {
        AttrValue::Callback(value)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttrValue::Null, Into::into)
    }
}

/// Scalars map onto their counterparts. Arrays and objects have no
/// attribute form and are kept as their JSON text.
impl From<serde_json::Value> for AttrValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => AttrValue::Null,
            Value::Bool(b) => AttrValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AttrValue::Int(i),
                None => AttrValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => AttrValue::Str(s),
            other @ (Value::Array(_) | Value::Object(_)) => AttrValue::Str(other.to_string()),
        }
    }
}

/// Build a state map from a JSON object. Anything other than an object
/// yields an empty state.
pub fn state_from_json(value: serde_json::Value) -> State {
    match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| (key, AttrValue::from(value)))
            .collect(),
        _ => State::new(),
    }
}

/// What a callback is being invoked for.
#[derive(Debug)]
pub enum Invocation<'a> {
    /// An event listener or a stateful handler, with its arguments.
    Event(&'a [AttrValue]),

    /// A lifecycle hook.
    Hook(HookContext<'a>),
}

/// Arguments passed to a lifecycle hook.
#[derive(Debug)]
pub struct HookContext<'a> {
    /// Which hook fired.
    pub hook: Hook,

    /// Slot of the node.
    pub id: &'a PositionalId,

    /// Live node at the slot, if there is one yet (or still).
    pub element: Option<ElementHandle>,

    /// Attributes of the node (the next node for update hooks).
    pub attrs: &'a Attrs,

    /// Attributes before the update. Only set for update hooks.
    pub prev_attrs: Option<&'a Attrs>,
}

/// A caller-owned callback stored in an attribute or lifecycle map.
///
/// Clones share the same function; equality is reference equality.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn(Invocation<'_>) -> CallbackResult + Send + Sync>);

impl Callback {
    /// Wrap a function that handles every invocation kind.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Invocation<'_>) -> CallbackResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap an event listener. Hook invocations are ignored.
    pub fn event<F>(f: F) -> Self
    where
        F: Fn(&[AttrValue]) -> CallbackResult + Send + Sync + 'static,
    {
        Self::new(move |invocation| match invocation {
            Invocation::Event(args) => f(args),
            Invocation::Hook(_) => Ok(()),
        })
    }

    /// Wrap a lifecycle hook. Event invocations are ignored.
    pub fn hook<F>(f: F) -> Self
    where
        F: Fn(&HookContext<'_>) -> CallbackResult + Send + Sync + 'static,
    {
        Self::new(move |invocation| match invocation {
            Invocation::Hook(context) => f(&context),
            Invocation::Event(_) => Ok(()),
        })
    }

    /// Invoke the callback.
    pub fn call(&self, invocation: Invocation<'_>) -> CallbackResult {
        (self.0)(invocation)
    }

    /// Invoke the callback as an event listener.
    pub fn emit(&self, args: &[AttrValue]) -> CallbackResult {
        self.call(Invocation::Event(args))
    }

    /// Whether both callbacks share the same function.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Arc::as_ptr(&self.0).cast::<()>())
    }
}
