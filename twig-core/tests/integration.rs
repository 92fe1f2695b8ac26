//! Integration Tests for the Rendering Pipeline
//!
//! These tests drive trees through the renderer into the in-memory target
//! and check the resulting markup, the way an application would.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use twig_core::builder::{component, h, pure, text, with_state};
use twig_core::node::{InitialState, State, StatefulOptions};
use twig_core::render::{FrameScheduler, ManualFrames, MemoryDom, Renderer};
use twig_core::{attrs, children, AttrValue, Callback, Error, PositionalId, Render, RenderConfig};

fn markup(renderer: &Renderer<MemoryDom>) -> String {
    renderer.with_target(MemoryDom::to_markup).unwrap()
}

fn counter() -> Render {
    let options = StatefulOptions::new(InitialState::from_json(serde_json::json!({ "count": 0 })))
        .handler("increment", |state, _attrs, args| {
            let count = state.get("count").and_then(AttrValue::as_int).unwrap_or(0);
            let by = args.first().and_then(AttrValue::as_int).unwrap_or(1);
            State::from([("count".to_string(), AttrValue::Int(count + by))])
        });

    with_state(
        options,
        Render::new("Counter", |props| {
            h(
                "button",
                attrs! { "onclick" => props.get("increment").cloned().unwrap_or(AttrValue::Null) },
                children![props.get("count").cloned().unwrap_or(AttrValue::Null)],
            )
        }),
    )
}

/// A click re-renders only the counter, through the handler's trigger.
#[test]
fn stateful_counter_rerenders_on_click() {
    let renderer = Renderer::new(MemoryDom::new());
    let tree = component(counter(), attrs! {}, children![]);

    renderer.render(None, Some(&tree)).unwrap();
    assert_eq!(markup(&renderer), "<button>0</button>");

    renderer.dispatch(&PositionalId::root(), "click", &[]).unwrap();
    assert_eq!(markup(&renderer), "<button>1</button>");

    renderer.dispatch(&PositionalId::root(), "click", &[AttrValue::Int(5)]).unwrap();
    assert_eq!(markup(&renderer), "<button>6</button>");
}

/// State survives parent re-renders and is dropped with the node.
#[test]
fn stateful_state_follows_the_slot() {
    let renderer = Renderer::new(MemoryDom::new());
    let counter = counter();
    let view = |title: &str| {
        h(
            "section",
            attrs! {},
            children![h("h1", attrs! {}, children![title]), component(counter.clone(), attrs! {}, children![])],
        )
    };

    let first = view("a");
    let current = renderer.render(None, Some(&first)).unwrap();
    let button = PositionalId::from_path(&[0, 1]);
    renderer.dispatch(&button, "click", &[]).unwrap();

    let second = view("b");
    let current = renderer.render(current.as_ref(), Some(&second)).unwrap();
    assert_eq!(markup(&renderer), "<section><h1>b</h1><button>1</button></section>");

    let empty = h("section", attrs! {}, children![h("h1", attrs! {}, children!["b"])]);
    let current = renderer.render(current.as_ref(), Some(&empty)).unwrap();
    assert_eq!(markup(&renderer), "<section><h1>b</h1></section>");

    renderer.render(current.as_ref(), Some(&second)).unwrap();
    assert_eq!(markup(&renderer), "<section><h1>b</h1><button>0</button></section>");
}

/// Conditional children appear and disappear in place.
#[test]
fn conditional_rendering() {
    let renderer = Renderer::new(MemoryDom::new());
    let status = Render::new("Status", |props| {
        let on = props.get("on").and_then(AttrValue::as_bool).unwrap_or(false);
        h(
            "div",
            attrs! {},
            children![
                on.then(|| h("span", attrs! {}, children!["on"])),
                (!on).then(|| h("em", attrs! {}, children!["off"])),
            ],
        )
    });

    let off = component(status.clone(), attrs! { "on" => false }, children![]);
    let on = component(status, attrs! { "on" => true }, children![]);

    let current = renderer.render(None, Some(&off)).unwrap();
    assert_eq!(markup(&renderer), "<div><em>off</em></div>");

    let current = renderer.render(current.as_ref(), Some(&on)).unwrap();
    assert_eq!(markup(&renderer), "<div><span>on</span></div>");

    renderer.render(current.as_ref(), Some(&off)).unwrap();
    assert_eq!(markup(&renderer), "<div><em>off</em></div>");
}

/// Hooks fire in patch order around the live changes.
#[test]
fn lifecycle_hooks_fire_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let hook = |name: &'static str| {
        let log = log.clone();
        Callback::hook(move |context| {
            log.lock().push(format!("{name} {} live={}", context.id, context.element.is_some()));
            Ok(())
        })
    };
    let tracked = |value: &str| {
        h(
            "p",
            attrs! {
                "beforecreate" => hook("beforecreate"),
                "created" => hook("created"),
                "beforeupdate" => hook("beforeupdate"),
                "updated" => hook("updated"),
                "beforedestroy" => hook("beforedestroy"),
                "destroyed" => hook("destroyed"),
            },
            children![value],
        )
    };

    let renderer = Renderer::new(MemoryDom::new());
    let first = tracked("a");
    let second = tracked("b");

    let current = renderer.render(None, Some(&first)).unwrap();
    let current = renderer.render(current.as_ref(), Some(&second)).unwrap();
    renderer.render(current.as_ref(), None).unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            "beforecreate 0 live=false",
            "created 0 live=true",
            "beforeupdate 0 live=true",
            "updated 0 live=true",
            "beforedestroy 0 live=true",
            "destroyed 0 live=false",
        ]
    );
}

/// A failing hook stops the pass and surfaces as a hook error.
#[test]
fn hook_failure_aborts_pass() {
    let renderer = Renderer::new(MemoryDom::new());
    let tree = h(
        "div",
        attrs! { "created" => Callback::hook(|_| Err("not today".into())) },
        children!["x"],
    );

    let err = renderer.render(None, Some(&tree)).unwrap_err();

    assert!(matches!(err, Error::Hook { .. }));
    assert_eq!(err.to_string(), "lifecycle hook `created` failed at 0");
    // Everything before the hook was applied.
    assert_eq!(markup(&renderer), "<div>x</div>");
}

/// A pure component with the default predicate renders once.
#[test]
fn pure_component_renders_once() {
    let renders = Arc::new(AtomicUsize::new(0));
    let renders_clone = renders.clone();
    let badge = pure(Render::new("Badge", move |props| {
        renders_clone.fetch_add(1, Ordering::SeqCst);
        text(props.get("label").cloned().unwrap_or(AttrValue::Null))
    }));

    let renderer = Renderer::new(MemoryDom::new());
    let first = component(badge.clone(), attrs! { "label" => "new" }, children![]);
    let second = component(badge, attrs! { "label" => "changed" }, children![]);

    let current = renderer.render(None, Some(&first)).unwrap();
    renderer.render(current.as_ref(), Some(&second)).unwrap();

    assert_eq!(renders.load(Ordering::SeqCst), 1);
    assert_eq!(markup(&renderer), "new");
}

/// A configured root renders beneath its own mount point.
#[test]
fn configured_root_and_prefix() {
    let config = RenderConfig::from_json(r#"{ "root": [3], "event_prefix": "on:", "trace_patches": false }"#).unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_clone = hits.clone();
    let listener = Callback::event(move |_| {
        hits_clone.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let renderer = Renderer::with_config(MemoryDom::with_config(&config), config);
    let tree = h("a", attrs! { "on:press" => listener, "href" => "#" }, children!["go"]);
    renderer.render(None, Some(&tree)).unwrap();

    assert_eq!(markup(&renderer), r##"<a href="#">go</a>"##);
    renderer.dispatch(&PositionalId::from_path(&[3]), "press", &[]).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

/// Requests between frames coalesce into one pass of the latest tree.
#[test]
fn scheduler_coalesces_to_latest_tree() {
    let mut scheduler = FrameScheduler::new(Renderer::new(MemoryDom::new()), ManualFrames::new());

    for label in ["one", "two", "three"] {
        scheduler.request(h("p", attrs! {}, children![label]));
    }
    assert_eq!(scheduler.frames().requested(), 1);
    scheduler.on_frame().unwrap();
    assert_eq!(scheduler.renderer().with_target(MemoryDom::to_markup).unwrap(), "<p>three</p>");

    scheduler.request(h("p", attrs! { "class" => "done" }, children!["three"]));
    assert_eq!(scheduler.frames().requested(), 2);
    scheduler.on_frame().unwrap();
    assert_eq!(
        scheduler.renderer().with_target(MemoryDom::to_markup).unwrap(),
        r#"<p class="done">three</p>"#
    );
}
