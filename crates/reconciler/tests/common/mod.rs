#![allow(dead_code)]

use dom::{Document, NodeKey};
use reconciler::{
    Component, Context, Element, EventHandler, HookResult, Props, ReconcileError, RenderResult,
    Renderer, State, Updater,
};
use std::cell::RefCell;
use std::rc::Rc;

/// A document with `<div id="container">` under the body, and a renderer on it.
pub struct Harness {
    pub doc: Rc<RefCell<Document>>,
    pub renderer: Renderer,
    pub container: NodeKey,
}

impl Harness {
    pub fn new() -> Self {
        let doc = Rc::new(RefCell::new(Document::new()));
        let container = {
            let mut d = doc.borrow_mut();
            let container = d.create_element("div");
            d.set_attribute(container, "id", "container").unwrap();
            let root = d.root();
            d.append_child(root, container).unwrap();
            container
        };
        let renderer = Renderer::new(doc.clone());
        Self {
            doc,
            renderer,
            container,
        }
    }

    pub fn render(&mut self, element: Element) -> Result<(), ReconcileError> {
        self.renderer.render(element, self.container)
    }

    /// Serialized body content, container included.
    pub fn body_html(&self) -> String {
        let doc = self.doc.borrow();
        doc.inner_html(doc.root())
    }

    pub fn html(&self) -> String {
        self.doc.borrow().inner_html(self.container)
    }

    pub fn click(&self, id: &str) -> bool {
        dom::click_element_by_id(&self.doc, id).unwrap()
    }

    pub fn rendered_children(&self) -> Vec<NodeKey> {
        self.doc.borrow().children(self.container).to_vec()
    }
}

/// Button with a click counter in state; renders `props.children` after the
/// button.
pub struct Counter {
    updater: Updater,
}

impl Component for Counter {
    fn create(_: &Props, updater: Updater) -> Self {
        Counter { updater }
    }

    fn initial_state(&self) -> State {
        State::new().with("counter", 0)
    }

    fn render(&self, cx: &Context<'_>) -> RenderResult {
        let count = cx.state().get_int("counter").unwrap_or_default();
        let label = cx.props().get_str("label").unwrap_or("");
        let updater = self.updater.clone();
        let on_click = EventHandler::new(move || {
            updater.set_state_with(|state| {
                State::new().with("counter", state.get_int("counter").unwrap_or_default() + 1)
            })
        });
        let mut button = Props::new().with("onClick", on_click);
        if let Some(id) = cx.props().get_str("id") {
            button = button.with("id", id);
        }
        let children = std::iter::once(Element::host(
            "button",
            button,
            [Element::text(format!("{label} Counter: {count}"))],
        ))
        .chain(cx.props().children().iter().cloned());
        Ok(Element::host("div", Props::new(), children))
    }
}

pub fn counter(id: &str, label: &str, children: Vec<Element>) -> Element {
    Element::class::<Counter>(Props::new().with("id", id).with("label", label), children)
}

thread_local! {
    /// Lifecycle calls as `"<name>:<hook>"`, per test thread.
    static JOURNAL: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

pub fn take_journal() -> Vec<String> {
    JOURNAL.with(|j| std::mem::take(&mut *j.borrow_mut()))
}

fn note(cx: &Context<'_>, hook: &str) {
    let name = cx.props().get_str("name").unwrap_or("?");
    JOURNAL.with(|j| j.borrow_mut().push(format!("{name}:{hook}")));
}

/// Renders `<tag>` from its `tag` prop (default `div`) and journals every hook.
pub struct Traced;

impl Component for Traced {
    fn create(_: &Props, _: Updater) -> Self {
        Traced
    }

    fn render(&self, cx: &Context<'_>) -> RenderResult {
        note(cx, "render");
        let tag = cx.props().get_str("tag").unwrap_or("div");
        Ok(Element::host(tag, Props::new(), cx.props().children().iter().cloned()))
    }

    fn component_will_mount(&mut self, cx: &Context<'_>) -> HookResult {
        note(cx, "will_mount");
        Ok(())
    }

    fn component_will_update(&mut self, cx: &Context<'_>) -> HookResult {
        note(cx, "will_update");
        Ok(())
    }

    fn component_will_unmount(&mut self, cx: &Context<'_>) -> HookResult {
        note(cx, "will_unmount");
        Ok(())
    }
}

pub fn traced(name: &str, children: Vec<Element>) -> Element {
    Element::class::<Traced>(Props::new().with("name", name), children)
}

pub fn traced_tag(name: &str, tag: &str) -> Element {
    Element::class::<Traced>(Props::new().with("name", name).with("tag", tag), [])
}
