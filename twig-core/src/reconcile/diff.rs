//! Attribute Differ
//!
//! Compares the attribute maps of two nodes that share an identity.
//!
//! # Algorithm
//!
//! 1. Walk the previous attributes in order. A key present on both sides
//!    with different values yields `UpdateAttr`; a key present before and
//!    absent now yields `RemoveAttr`.
//! 2. Walk the next attributes in order. A key absent before and present
//!    now yields `AddAttr`.
//! 3. If anything changed, bracket the result with the next node's
//!    `beforeupdate`/`updated` hooks.
//!
//! Null, `false` and a missing key all count as absent.

use crate::id::PositionalId;
use crate::node::{AttrValue, Hook, VNode};
use crate::patch::{AttrChange, Patch};

/// Diff the attributes of `prev` and `next` at `id`.
pub fn diff_attrs(prev: &VNode, next: &VNode, id: &PositionalId) -> Vec<Patch> {
    let mut patches = Vec::new();

    for (key, prev_value) in prev.attrs().iter() {
        if !prev_value.is_present() {
            continue;
        }
        match next.attrs().get(key).filter(|value| value.is_present()) {
            Some(next_value) if next_value != prev_value => {
                patches.push(Patch::UpdateAttr(change(key, Some(next_value), prev, next, id)));
            }
            Some(_) => {}
            None => patches.push(Patch::RemoveAttr(change(key, None, prev, next, id))),
        }
    }

    for (key, next_value) in next.attrs().iter() {
        let was_present = prev.attrs().get(key).is_some_and(AttrValue::is_present);
        if !was_present && next_value.is_present() {
            patches.push(Patch::AddAttr(change(key, Some(next_value), prev, next, id)));
        }
    }

    if patches.is_empty() {
        return patches;
    }

    bracketed(
        patches,
        Patch::transition_hook(prev, next, Hook::BeforeUpdate, id),
        Patch::transition_hook(prev, next, Hook::Updated, id),
    )
}

/// `body` with optional patches before and after it.
pub(crate) fn bracketed(body: Vec<Patch>, before: Option<Patch>, after: Option<Patch>) -> Vec<Patch> {
    if before.is_none() && after.is_none() {
        return body;
    }
    let mut patches = Vec::with_capacity(body.len() + 2);
    patches.extend(before);
    patches.extend(body);
    patches.extend(after);
    patches
}

fn change(key: &str, value: Option<&AttrValue>, prev: &VNode, next: &VNode, id: &PositionalId) -> AttrChange {
    AttrChange {
        key: key.to_string(),
        value: value.cloned(),
        prev: prev.clone(),
        next: next.clone(),
        id: id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::h;
    use crate::node::Callback;
    use crate::{attrs, children};

    fn lines(patches: &[Patch]) -> Vec<String> {
        patches.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn removes_updates_then_adds() {
        let prev = h("div", attrs! { "id" => "1", "lang" => "en" }, children![]);
        let next = h("div", attrs! { "class" => "class", "lang" => "pt" }, children![]);

        let patches = diff_attrs(&prev, &next, &PositionalId::root());

        assert_eq!(
            lines(&patches),
            vec!["remove-attr 0 id", "update-attr 0 lang=pt", "add-attr 0 class=class"]
        );
        match &patches[0] {
            Patch::RemoveAttr(change) => assert!(change.value.is_none()),
            other => panic!("unexpected patch {other}"),
        }
    }

    #[test]
    fn equal_values_produce_nothing() {
        let prev = h("input", attrs! { "value" => "a", "size" => 3 }, children![]);
        let next = h("input", attrs! { "value" => "a", "size" => 3 }, children![]);

        assert!(diff_attrs(&prev, &next, &PositionalId::root()).is_empty());
    }

    #[test]
    fn unchanged_nan_produces_nothing() {
        let prev = h("meter", attrs! { "value" => f64::NAN }, children![]);
        let next = h("meter", attrs! { "value" => f64::NAN }, children![]);

        assert!(diff_attrs(&prev, &next, &PositionalId::root()).is_empty());
    }

    #[test]
    fn false_and_null_count_as_absent() {
        let prev = h("input", attrs! { "checked" => true, "disabled" => false }, children![]);
        let next = h(
            "input",
            attrs! { "checked" => false, "disabled" => true, "title" => AttrValue::Null },
            children![],
        );

        let patches = diff_attrs(&prev, &next, &PositionalId::root());

        assert_eq!(
            lines(&patches),
            vec!["remove-attr 0 checked", "add-attr 0 disabled=true"]
        );
    }

    #[test]
    fn brackets_changes_with_next_update_hooks() {
        let hook = Callback::hook(|_| Ok(()));
        let prev = h("div", attrs! { "class" => "a" }, children![]);
        let next = h(
            "div",
            attrs! { "class" => "b", "beforeupdate" => hook.clone(), "updated" => hook },
            children![],
        );

        let patches = diff_attrs(&prev, &next, &PositionalId::root());

        assert_eq!(
            lines(&patches),
            vec!["beforeupdate 0", "update-attr 0 class=b", "updated 0"]
        );
    }

    #[test]
    fn no_bracket_without_changes() {
        let hook = Callback::hook(|_| Ok(()));
        let prev = h("div", attrs! { "class" => "a" }, children![]);
        let next = h("div", attrs! { "class" => "a", "updated" => hook }, children![]);

        assert!(diff_attrs(&prev, &next, &PositionalId::root()).is_empty());
    }
}
