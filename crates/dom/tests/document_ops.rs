use dom::{
    DispatchError, Document, DocumentConfig, DomError, DomPatch, EventListener, EventType,
    dispatch_event,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn custom_root_tag() {
    let doc = Document::with_config(DocumentConfig {
        root_tag: "main",
        ..DocumentConfig::default()
    });
    assert_eq!(doc.tag_name(doc.root()), Some("main"));
    assert_eq!(doc.outer_html(doc.root()), "<main></main>");
}

#[test]
fn journal_is_off_by_default() {
    let mut doc = Document::new();
    let div = doc.create_element("div");
    doc.append_child(doc.root(), div).unwrap();
    assert!(doc.take_patches().is_empty());
}

#[test]
fn journal_records_in_application_order() {
    let mut doc = Document::with_config(DocumentConfig {
        record_patches: true,
        ..DocumentConfig::default()
    });
    let root = doc.root();
    let div = doc.create_element("div");
    doc.set_attribute(div, "id", "x").unwrap();
    let text = doc.append_text(div, "hi").unwrap();
    doc.append_child(root, div).unwrap();
    let span = doc.create_element("span");
    doc.replace_child(root, span, div).unwrap();

    let patches = doc.take_patches();
    assert_eq!(patches.len(), 6);
    assert!(matches!(patches[0], DomPatch::CreateElement { key, .. } if key == div));
    assert!(matches!(patches[2], DomPatch::AppendText { key, .. } if key == text));
    assert_eq!(patches[5], DomPatch::ReplaceChild { parent: root, new: span, old: div });
    assert!(!doc.is_live(div));
    assert!(!doc.is_live(text));
    assert!(doc.take_patches().is_empty());
}

#[test]
fn listeners_may_mutate_the_document_they_fire_on() {
    let doc = Rc::new(RefCell::new(Document::new()));
    let button = {
        let mut d = doc.borrow_mut();
        let button = d.create_element("button");
        d.set_attribute(button, "id", "go").unwrap();
        let root = d.root();
        d.append_child(root, button).unwrap();
        button
    };
    let fired = Rc::new(Cell::new(false));
    let (target, flag) = (Rc::downgrade(&doc), fired.clone());
    doc.borrow_mut()
        .set_listener(
            button,
            EventType::Click,
            EventListener::new(move || {
                let doc = target.upgrade().ok_or("document gone")?;
                let mut doc = doc.borrow_mut();
                doc.append_text(button, "clicked")?;
                flag.set(true);
                Ok(())
            }),
        )
        .unwrap();

    assert!(dom::click_element_by_id(&doc, "go").unwrap());
    assert!(fired.get());
    assert_eq!(doc.borrow().inner_html(doc.borrow().root()), r#"<button id="go">clicked</button>"#);
}

#[test]
fn dispatch_errors() {
    let doc = RefCell::new(Document::new());
    let root = doc.borrow().root();
    let stray = doc.borrow_mut().create_element("p");
    let err = doc.borrow_mut().remove_child(root, stray).unwrap_err();
    assert_eq!(err, DomError::NotAChild { parent: root, child: stray });

    let busy = doc.borrow_mut();
    assert!(matches!(
        dispatch_event(&doc, stray, EventType::Click),
        Err(DispatchError::DocumentBusy)
    ));
    drop(busy);

    let err = doc.borrow_mut().append_child(stray, stray).unwrap_err();
    assert_eq!(err, DomError::CycleDetected { parent: stray, child: stray });
}
