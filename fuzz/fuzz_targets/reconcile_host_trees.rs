#![no_main]

use dom::Document;
use libfuzzer_sys::fuzz_target;
use reconciler::{Element, Props, Renderer};
use std::cell::RefCell;
use std::rc::Rc;

const TAGS: &[&str] = &["div", "span", "p", "ul", "li"];
const WORDS: &[&str] = &["a", "b", "<&>", " "];
const MAX_NODES: usize = 256;

/// Byte-driven tree builder. Each byte picks the next node kind; running out of
/// input closes every open element.
struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    nodes: usize,
}

impl Decoder<'_> {
    fn next(&mut self) -> Option<u8> {
        let b = self.bytes.get(self.pos).copied();
        self.pos += 1;
        b
    }

    fn element(&mut self, depth: usize) -> Element {
        let b = self.next().unwrap_or(0);
        self.nodes += 1;
        let tag = TAGS[usize::from(b) % TAGS.len()];
        let mut props = Props::new();
        if b & 0x20 != 0 {
            props = props.with("className", WORDS[usize::from(b >> 6) % WORDS.len()]);
        }
        let mut children = Vec::new();
        while depth < 16 && self.nodes < MAX_NODES {
            match self.next() {
                None | Some(0..=63) => break,
                Some(64..=127) => {
                    self.nodes += 1;
                    children.push(Element::text(WORDS[self.pos % WORDS.len()]));
                }
                Some(_) => children.push(self.element(depth + 1)),
            }
        }
        Element::host(tag, props, children)
    }
}

fn expected_html(element: &Element, out: &mut String) {
    match element {
        Element::Text(text) => {
            for ch in text.chars() {
                match ch {
                    '&' => out.push_str("&amp;"),
                    '<' => out.push_str("&lt;"),
                    '>' => out.push_str("&gt;"),
                    _ => out.push(ch),
                }
            }
        }
        Element::Node { ty, props } => {
            let reconciler::ElementType::Tag(tag) = ty else {
                unreachable!("host trees only");
            };
            out.push('<');
            out.push_str(tag);
            if let Some(class) = props.get_str("className") {
                out.push_str(" class=\"");
                for ch in class.chars() {
                    match ch {
                        '&' => out.push_str("&amp;"),
                        '<' => out.push_str("&lt;"),
                        '"' => out.push_str("&quot;"),
                        _ => out.push(ch),
                    }
                }
                out.push('"');
            }
            out.push('>');
            for child in props.children() {
                expected_html(child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mid = data.len() / 2;
    let first = Decoder { bytes: &data[..mid], pos: 0, nodes: 0 }.element(0);
    let second = Decoder { bytes: &data[mid..], pos: 0, nodes: 0 }.element(0);

    let doc = Rc::new(RefCell::new(Document::new()));
    let root = doc.borrow().root();
    let mut renderer = Renderer::new(doc.clone());

    for tree in [first, second] {
        let mut expected = String::new();
        expected_html(&tree, &mut expected);
        renderer.render(tree, root).expect("host trees always render");
        assert_eq!(doc.borrow().inner_html(root), expected);
    }

    let live = doc.borrow().live_count();
    renderer.unmount_at(root).expect("unmount");
    assert!(doc.borrow().live_count() < live);
});
