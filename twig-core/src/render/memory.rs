//! In-Memory Render Target
//!
//! [`MemoryDom`] keeps a retained tree of elements in an arena, indexed by
//! positional identifier. It is the reference target: everything a real
//! surface has to do with a patch list, it does, minus the pixels.
//!
//! # Mount Point
//!
//! The tree hangs off a mount point element that sits at the parent path
//! of the configured root. With the default root `[0]` that is the empty
//! path, so the root element is the mount point's first child.
//!
//! # Listeners
//!
//! Attributes whose key starts with the event prefix (`on` by default) and
//! whose value is a callback are not stored as attributes. They register a
//! listener for the event named by the rest of the key, e.g. `onclick`
//! registers `click`.

use std::collections::HashMap;
use std::fmt::Write as _;

use indexmap::IndexMap;
use tracing::trace;

use super::target::{ElementHandle, RenderTarget};
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::id::PositionalId;
use crate::node::{AttrValue, Callback, HookContext, Invocation, NodeKind, VNode, TEXT_VALUE};
use crate::patch::{HookTarget, LifecycleCall, Patch};

/// What a live element is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    MountPoint,
    Element(String),
    Text(String),
}

/// A live element.
#[derive(Debug, Clone)]
pub struct Element {
    kind: ElementKind,
    attrs: IndexMap<String, AttrValue>,
    parent: Option<ElementHandle>,
    children: Vec<ElementHandle>,
}

impl Element {
    fn new(kind: ElementKind, parent: Option<ElementHandle>) -> Self {
        Self {
            kind,
            attrs: IndexMap::new(),
            parent,
            children: Vec::new(),
        }
    }

    /// Element, text or mount point.
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Tag name, for ordinary elements.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Element(tag) => Some(tag),
            _ => None,
        }
    }

    /// Content, for text elements.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Current value of attribute `key`.
    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Enclosing element; `None` for the mount point.
    pub fn parent(&self) -> Option<ElementHandle> {
        self.parent
    }

    /// Child handles in document order.
    pub fn children(&self) -> &[ElementHandle] {
        &self.children
    }
}

/// Retained element tree applying patches in memory.
#[derive(Debug)]
pub struct MemoryDom {
    elements: Vec<Option<Element>>,
    /// Vacated slots in `elements`, reused before the storage grows.
    free: Vec<ElementHandle>,
    live: HashMap<PositionalId, ElementHandle>,
    listeners: HashMap<PositionalId, IndexMap<String, Callback>>,
    mount: ElementHandle,
    event_prefix: String,
}

impl MemoryDom {
    /// Empty tree with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&RenderConfig::default())
    }

    /// Empty tree mounted at the parent of the configured root.
    pub fn with_config(config: &RenderConfig) -> Self {
        let mount_id = config.root_id().parent().unwrap_or_default();
        let mount = ElementHandle(0);

        Self {
            elements: vec![Some(Element::new(ElementKind::MountPoint, None))],
            free: Vec::new(),
            live: HashMap::from([(mount_id, mount)]),
            listeners: HashMap::new(),
            mount,
            event_prefix: config.event_prefix.clone(),
        }
    }

    /// The element the tree is mounted into.
    pub fn mount_point(&self) -> ElementHandle {
        self.mount
    }

    /// Handle of the live element at `id`.
    pub fn handle(&self, id: &PositionalId) -> Option<ElementHandle> {
        self.live.get(id).copied()
    }

    /// The element behind `handle`, if it is still live.
    pub fn element(&self, handle: ElementHandle) -> Option<&Element> {
        self.elements.get(handle.0).and_then(Option::as_ref)
    }

    /// The live element at `id`.
    pub fn element_at(&self, id: &PositionalId) -> Option<&Element> {
        self.handle(id).and_then(|handle| self.element(handle))
    }

    /// Number of live elements, not counting the mount point.
    pub fn live_count(&self) -> usize {
        self.live.len() - 1
    }

    /// Element slots allocated so far, live or vacant.
    pub fn slot_count(&self) -> usize {
        self.elements.len()
    }

    /// Invoke the listener for `event` on the element at `id`.
    pub fn dispatch(&self, id: &PositionalId, event: &str, args: &[AttrValue]) -> Result<()> {
        let listener = self.listener(id, event).ok_or_else(|| Error::NoListener {
            event: event.to_string(),
            id: id.clone(),
        })?;
        listener.emit(args).map_err(|source| Error::Callback {
            event: event.to_string(),
            id: id.clone(),
            source,
        })
    }

    /// Serialize everything under the mount point as markup.
    ///
    /// Boolean `true` attributes are written bare; text is escaped.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        if let Some(mount) = self.element(self.mount) {
            for child in mount.children() {
                self.write_markup(*child, &mut out);
            }
        }
        out
    }

    fn write_markup(&self, handle: ElementHandle, out: &mut String) {
        let Some(element) = self.element(handle) else {
            return;
        };
        match &element.kind {
            ElementKind::Text(text) => out.push_str(&escape(text)),
            ElementKind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in element.attributes() {
                    match value {
                        AttrValue::Bool(true) => {
                            let _ = write!(out, " {key}");
                        }
                        other => {
                            let _ = write!(out, " {key}=\"{}\"", escape(&other.to_text()));
                        }
                    }
                }
                out.push('>');
                for child in element.children() {
                    self.write_markup(*child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
            ElementKind::MountPoint => {
                for child in element.children() {
                    self.write_markup(*child, out);
                }
            }
        }
    }

    fn live_handle(&self, id: &PositionalId) -> Result<ElementHandle> {
        self.handle(id).ok_or_else(|| Error::MissingElement(id.clone()))
    }

    fn element_mut(&mut self, handle: ElementHandle, id: &PositionalId) -> Result<&mut Element> {
        self.elements
            .get_mut(handle.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::MissingElement(id.clone()))
    }

    fn add_node(&mut self, node: &VNode, id: &PositionalId) -> Result<()> {
        if self.live.contains_key(id) {
            return Err(Error::SlotOccupied(id.clone()));
        }
        let parent = id
            .parent()
            .and_then(|parent| self.handle(&parent))
            .ok_or_else(|| Error::MissingParent(id.clone()))?;

        let kind = match node.kind() {
            NodeKind::Default { tag } => ElementKind::Element(tag.to_string()),
            NodeKind::Text => ElementKind::Text(String::new()),
            _ => return Err(Error::Unrenderable(id.clone())),
        };

        // Replacements land between live siblings.
        let before = id
            .next_sibling()
            .and_then(|sibling| self.handle(&sibling))
            .filter(|sibling| self.element(*sibling).and_then(Element::parent) == Some(parent));

        let element = Some(Element::new(kind, Some(parent)));
        let handle = match self.free.pop() {
            Some(handle) => {
                self.elements[handle.0] = element;
                handle
            }
            None => {
                self.elements.push(element);
                ElementHandle(self.elements.len() - 1)
            }
        };

        let siblings = &mut self.element_mut(parent, id)?.children;
        match before.and_then(|before| siblings.iter().position(|h| *h == before)) {
            Some(position) => siblings.insert(position, handle),
            None => siblings.push(handle),
        }
        self.live.insert(id.clone(), handle);
        trace!(id = %id, label = node.label(), handle = handle.0, "created element");

        for (key, value) in node.attrs().iter() {
            self.set_attribute(handle, id, key, Some(value))?;
        }
        Ok(())
    }

    fn remove_node(&mut self, id: &PositionalId) -> Result<()> {
        let handle = self.live.remove(id).ok_or_else(|| Error::MissingElement(id.clone()))?;
        let element = self
            .elements
            .get_mut(handle.0)
            .and_then(Option::take)
            .ok_or_else(|| Error::MissingElement(id.clone()))?;

        if let Some(parent) = element.parent {
            self.element_mut(parent, id)?.children.retain(|child| *child != handle);
        }
        self.listeners.remove(id);
        self.free.push(handle);
        trace!(id = %id, handle = handle.0, "removed element");
        Ok(())
    }

    fn set_attribute(
        &mut self,
        handle: ElementHandle,
        id: &PositionalId,
        key: &str,
        value: Option<&AttrValue>,
    ) -> Result<()> {
        let value = value.filter(|value| value.is_present());

        if let Some(event) = key.strip_prefix(self.event_prefix.as_str()) {
            match value {
                Some(AttrValue::Callback(callback)) => {
                    self.listeners
                        .entry(id.clone())
                        .or_default()
                        .insert(event.to_string(), callback.clone());
                    return Ok(());
                }
                _ => {
                    if let Some(listeners) = self.listeners.get_mut(id) {
                        listeners.shift_remove(event);
                    }
                }
            }
        }

        let element = self.element_mut(handle, id)?;
        if let ElementKind::Text(text) = &mut element.kind {
            if key == TEXT_VALUE {
                *text = value.map(AttrValue::to_text).unwrap_or_default();
                return Ok(());
            }
        }
        match value {
            Some(AttrValue::Callback(_)) | None => {
                element.attrs.shift_remove(key);
            }
            Some(value) => {
                element.attrs.insert(key.to_string(), value.clone());
            }
        }
        Ok(())
    }

    fn run_hook(&self, call: &LifecycleCall) -> Result<()> {
        let Some(callback) = call.target.callback(call.hook) else {
            return Ok(());
        };
        let prev_attrs = match &call.target {
            HookTarget::Transition { prev, .. } => Some(prev.attrs()),
            HookTarget::Node(_) => None,
        };
        let context = HookContext {
            hook: call.hook,
            id: &call.id,
            element: self.handle(&call.id),
            attrs: call.target.node().attrs(),
            prev_attrs,
        };

        callback.call(Invocation::Hook(context)).map_err(|source| Error::Hook {
            hook: call.hook,
            id: call.id.clone(),
            source,
        })
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTarget for MemoryDom {
    fn apply(&mut self, patch: &Patch) -> Result<()> {
        match patch {
            Patch::AddNode { node, id } => self.add_node(node, id),
            Patch::RemoveNode { id, .. } => self.remove_node(id),
            Patch::AddAttr(change) | Patch::UpdateAttr(change) | Patch::RemoveAttr(change) => {
                let handle = self.live_handle(&change.id)?;
                self.set_attribute(handle, &change.id, &change.key, change.value.as_ref())
            }
            Patch::Lifecycle(call) => self.run_hook(call),
        }
    }

    fn listener(&self, id: &PositionalId, event: &str) -> Option<Callback> {
        self.listeners.get(id)?.get(event).cloned()
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::builder::h;
    use crate::node::Hook;
    use crate::reconcile::ReconcilerEngine;
    use crate::{attrs, children};

    fn render(
        dom: &mut MemoryDom,
        engine: &mut ReconcilerEngine,
        prev: Option<&VNode>,
        next: Option<&VNode>,
    ) -> Result<()> {
        for patch in engine.reconcile(prev, next, &PositionalId::root()) {
            dom.apply(&patch)?;
        }
        Ok(())
    }

    #[test]
    fn mounts_and_serializes() {
        let mut dom = MemoryDom::new();
        let mut engine = ReconcilerEngine::new();
        let tree = h(
            "ul",
            attrs! { "class" => "list", "hidden" => false, "open" => true },
            children![h("li", attrs! {}, children!["a < b"]), h("li", attrs! {}, children!["c"])],
        );

        render(&mut dom, &mut engine, None, Some(&tree)).unwrap();

        assert_eq!(dom.to_markup(), r#"<ul class="list" open><li>a &lt; b</li><li>c</li></ul>"#);
        assert_eq!(dom.live_count(), 5);
        assert_eq!(dom.element_at(&PositionalId::from_path(&[0, 1, 0])).and_then(Element::text), Some("c"));

        render(&mut dom, &mut engine, Some(&tree), None).unwrap();
        assert_eq!(dom.to_markup(), "");
        assert_eq!(dom.live_count(), 0);
    }

    #[test]
    fn replacement_keeps_sibling_order() {
        let mut dom = MemoryDom::new();
        let mut engine = ReconcilerEngine::new();
        let prev = h(
            "div",
            attrs! {},
            children![h("a", attrs! {}, children![]), h("b", attrs! {}, children![]), h("c", attrs! {}, children![])],
        );
        let next = h(
            "div",
            attrs! {},
            children![h("a", attrs! {}, children![]), h("i", attrs! {}, children![]), h("c", attrs! {}, children![])],
        );

        render(&mut dom, &mut engine, None, Some(&prev)).unwrap();
        render(&mut dom, &mut engine, Some(&prev), Some(&next)).unwrap();

        assert_eq!(dom.to_markup(), "<div><a></a><i></i><c></c></div>");
    }

    #[test]
    fn vacated_slots_are_reused() {
        let mut dom = MemoryDom::new();
        let mut engine = ReconcilerEngine::new();
        let trees = [
            h("div", attrs! {}, children![h("a", attrs! {}, children![])]),
            h("div", attrs! {}, children![h("b", attrs! {}, children![])]),
        ];

        render(&mut dom, &mut engine, None, Some(&trees[0])).unwrap();
        for i in 1..1000 {
            render(&mut dom, &mut engine, Some(&trees[(i - 1) % 2]), Some(&trees[i % 2])).unwrap();
        }

        assert_eq!(dom.to_markup(), "<div><b></b></div>");
        assert_eq!(dom.live_count(), 2);
        // Mount point, div and one child slot.
        assert_eq!(dom.slot_count(), 3);
    }

    #[test]
    fn attribute_patches_update_live_element() {
        let mut dom = MemoryDom::new();
        let mut engine = ReconcilerEngine::new();
        let prev = h("input", attrs! { "id" => "1", "lang" => "en", "checked" => true }, children![]);
        let next = h("input", attrs! { "lang" => "pt", "checked" => false, "class" => "c" }, children![]);

        render(&mut dom, &mut engine, None, Some(&prev)).unwrap();
        render(&mut dom, &mut engine, Some(&prev), Some(&next)).unwrap();

        assert_eq!(dom.to_markup(), r#"<input lang="pt" class="c"></input>"#);
    }

    #[test]
    fn listeners_follow_event_attributes() {
        let mut dom = MemoryDom::new();
        let mut engine = ReconcilerEngine::new();
        let clicks = Arc::new(Mutex::new(Vec::new()));
        let clicks_clone = clicks.clone();
        let on_click = Callback::event(move |args| {
            clicks_clone.lock().extend(args.iter().cloned());
            Ok(())
        });

        let with_listener = h("button", attrs! { "onclick" => on_click }, children!["go"]);
        let without = h("button", attrs! {}, children!["go"]);
        let root = PositionalId::root();

        render(&mut dom, &mut engine, None, Some(&with_listener)).unwrap();
        assert_eq!(dom.to_markup(), "<button>go</button>");

        dom.dispatch(&root, "click", &[AttrValue::Int(7)]).unwrap();
        assert_eq!(*clicks.lock(), vec![AttrValue::Int(7)]);

        render(&mut dom, &mut engine, Some(&with_listener), Some(&without)).unwrap();
        assert!(matches!(
            dom.dispatch(&root, "click", &[]),
            Err(Error::NoListener { .. })
        ));
    }

    #[test]
    fn occupied_and_orphan_slots_are_rejected() {
        let mut dom = MemoryDom::new();
        let node = h("p", attrs! {}, children![]);
        let add = |id: PositionalId| Patch::AddNode { node: node.clone(), id };

        dom.apply(&add(PositionalId::root())).unwrap();
        assert!(matches!(dom.apply(&add(PositionalId::root())), Err(Error::SlotOccupied(_))));
        assert!(matches!(
            dom.apply(&add(PositionalId::from_path(&[0, 3, 0]))),
            Err(Error::MissingParent(_))
        ));
        assert!(matches!(
            dom.apply(&Patch::RemoveNode { node: node.clone(), id: PositionalId::from_path(&[1]) }),
            Err(Error::MissingElement(_))
        ));
    }

    #[test]
    fn hooks_see_live_element_and_propagate_errors() {
        let mut dom = MemoryDom::new();
        let mut engine = ReconcilerEngine::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let created = Callback::hook(move |context| {
            seen_clone.lock().push((context.hook, context.element.is_some()));
            Ok(())
        });
        let failing = Callback::hook(|_| Err("boom".into()));

        let tree = h("div", attrs! { "beforecreate" => created.clone(), "created" => created }, children![]);
        render(&mut dom, &mut engine, None, Some(&tree)).unwrap();
        assert_eq!(*seen.lock(), vec![(Hook::BeforeCreate, false), (Hook::Created, true)]);

        let doomed = h("div", attrs! { "beforedestroy" => failing }, children![]);
        render(&mut dom, &mut engine, Some(&tree), Some(&doomed)).unwrap();
        let err = render(&mut dom, &mut engine, Some(&doomed), None).unwrap_err();
        assert!(matches!(err, Error::Hook { hook: Hook::BeforeDestroy, .. }));
        // The pass stopped before the removal.
        assert_eq!(dom.live_count(), 1);
    }
}
