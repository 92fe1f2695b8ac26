//! Tree Construction
//!
//! Factories for the five node kinds and the [`Child`] conversions that let
//! strings, numbers, options and nested vectors sit in a children list.
//!
//! ```rust,ignore
//! use twig_core::builder::{component, h, with_state};
//! use twig_core::{attrs, children};
//!
//! let list = h("ul", attrs! { "class" => "todo" }, children![
//!     h("li", attrs! {}, children!["write tests"]),
//!     done.then(|| h("li", attrs! {}, children!["ship"])),
//! ]);
//! ```

use std::sync::Arc;

use crate::node::{AttrValue, Attrs, ComparePredicate, NodeKind, Render, StatefulOptions, VNode, TEXT_VALUE};

/// One entry of a children list before flattening.
#[derive(Debug, Clone)]
pub enum Child {
    Node(VNode),
    Many(Vec<Child>),
    Empty,
}

impl Child {
    fn flatten_into(self, out: &mut Vec<VNode>) {
        match self {
            Child::Node(node) => out.push(node),
            Child::Many(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
            Child::Empty => {}
        }
    }
}

impl From<VNode> for Child {
    fn from(node: VNode) -> Self {
        Child::Node(node)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Node(text(value))
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Node(text(value))
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Node(text(value))
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Child::Node(text(value))
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Child::Node(text(value))
    }
}

/// Null, booleans and callbacks render nothing.
impl From<AttrValue> for Child {
    fn from(value: AttrValue) -> Self {
        match value {
            AttrValue::Null | AttrValue::Bool(_) | AttrValue::Callback(_) => Child::Empty,
            value => Child::Node(text(value)),
        }
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Child::Empty, Into::into)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(values: Vec<T>) -> Self {
        Child::Many(values.into_iter().map(Into::into).collect())
    }
}

/// Build a `Vec<Child>` from anything convertible into [`Child`].
#[macro_export]
macro_rules! children {
    () => {
        ::std::vec::Vec::<$crate::builder::Child>::new()
    };
    ($($child:expr),+ $(,)?) => {
        ::std::vec![$($crate::builder::Child::from($child)),+]
    };
}

/// Flatten a children list into nodes, dropping empty entries.
pub fn flatten(children: Vec<Child>) -> Vec<VNode> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        child.flatten_into(&mut out);
    }
    out
}

/// An element node.
pub fn h(tag: impl Into<Arc<str>>, attrs: Attrs, children: Vec<Child>) -> VNode {
    VNode::create(NodeKind::Default { tag: tag.into() }, attrs, flatten(children))
}

/// A text node.
pub fn text(value: impl Into<AttrValue>) -> VNode {
    let mut attrs = Attrs::new();
    attrs.insert(TEXT_VALUE, value);
    VNode::create(NodeKind::Text, attrs, Vec::new())
}

/// A component node. `children` reach the render function as
/// `props.children()`.
pub fn component(render: Render, attrs: Attrs, children: Vec<Child>) -> VNode {
    VNode::create(NodeKind::Component { render }, attrs, flatten(children))
}

/// Wrap `render` so it only re-renders when its attributes change.
///
/// Without a predicate nothing counts as a change: the wrapped render
/// function runs once on mount.
pub fn pure(render: Render) -> Render {
    pure_with(|_, _| true, render)
}

/// Wrap `render` so it re-renders only when `compare(prev, next)` is false.
pub fn pure_with<F>(compare: F, render: Render) -> Render
where
    F: Fn(&Attrs, &Attrs) -> bool + Send + Sync + 'static,
{
    let compare: ComparePredicate = Arc::new(compare);
    let name = format!("pure({})", render.name());

    Render::new(name, move |props| {
        VNode::create(
            NodeKind::Pure {
                render: render.clone(),
                compare: Arc::clone(&compare),
            },
            props.clone(),
            props.children().to_vec(),
        )
    })
}

/// Wrap `render` with local state and handlers.
///
/// The wrapped function sees the node's attributes, then its state, then
/// its handlers as props.
pub fn with_state(options: StatefulOptions, render: Render) -> Render {
    let name = format!("stateful({})", render.name());

    Render::new(name, move |props| {
        VNode::create(
            NodeKind::Stateful {
                render: render.clone(),
                options: options.clone(),
            },
            props.clone(),
            props.children().to_vec(),
        )
    })
}
