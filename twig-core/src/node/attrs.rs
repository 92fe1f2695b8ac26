//! Attribute Maps
//!
//! Attributes keep insertion order: the differ walks keys in order and the
//! patch order it produces is part of the output contract.
//!
//! `children` is not an ordinary key. It is a dedicated field, always
//! present (possibly empty), and never visited by the attribute differ.

use indexmap::IndexMap;

use super::value::AttrValue;
use super::vnode::VNode;

/// Ordered attribute map plus the node's children.
#[derive(Debug, Clone, Default)]
pub struct Attrs {
    values: IndexMap<String, AttrValue>,
    children: Vec<VNode>,
}

impl Attrs {
    /// Empty attributes without children.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an attribute value.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.values.get(key)
    }

    /// Whether `key` is set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Insert or replace a value, keeping the key's original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Option<AttrValue> {
        self.values.insert(key.into(), value.into())
    }

    /// Remove a key, preserving the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.values.shift_remove(key)
    }

    /// Iterate attributes in insertion order. Children are not included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of attributes, not counting children.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Children handed to a component.
    pub fn children(&self) -> &[VNode] {
        &self.children
    }

    /// Replace the component children.
    pub fn set_children(&mut self, children: Vec<VNode>) {
        self.children = children;
    }

    /// Copy of these attributes with `entries` layered on top.
    pub fn merged<I, K, V>(&self, entries: I) -> Attrs
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttrValue>,
    {
        let mut merged = self.clone();
        merged.extend(entries);
        merged
    }
}

impl<K, V> Extend<(K, V)> for Attrs
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Attrs
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attrs::new();
        attrs.extend(iter);
        attrs
    }
}

/// Build an [`Attrs`] map from `key => value` pairs.
///
/// ```rust,ignore
/// let attrs = attrs! { "id" => "main", "tabindex" => 0, "hidden" => false };
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::node::Attrs::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut attrs = $crate::node::Attrs::new();
        $(attrs.insert($key, $value);)+
        attrs
    }};
}
