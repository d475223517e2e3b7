//! Deterministic HTML serialization.
//!
//! Attributes are written in insertion order with double quotes. Text escapes
//! `&`, `<`, `>`; attribute values escape `&`, `"`, `<`. No void-element
//! shorthand: every element gets an explicit end tag.

use crate::types::Node;
use memchr::memchr3;

pub fn to_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

pub fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element {
            name,
            attributes,
            children,
            ..
        } => {
            open_tag(out, name, attributes.iter().map(|(k, v)| (k.as_ref(), v.as_str())));
            for child in children {
                write_node(out, child);
            }
            close_tag(out, name);
        }
        Node::Text { text, .. } => escape_text(out, text),
    }
}

pub(crate) fn open_tag<'a>(
    out: &mut String,
    name: &str,
    attributes: impl Iterator<Item = (&'a str, &'a str)>,
) {
    out.push('<');
    out.push_str(name);
    for (key, value) in attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_with(out, value, b'"', |b| match b {
            b'&' => "&amp;",
            b'"' => "&quot;",
            _ => "&lt;",
        });
        out.push('"');
    }
    out.push('>');
}

pub(crate) fn close_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

pub(crate) fn escape_text(out: &mut String, text: &str) {
    escape_with(out, text, b'>', |b| match b {
        b'&' => "&amp;",
        b'<' => "&lt;",
        _ => "&gt;",
    });
}

/// Copy `input` into `out`, replacing `&`, `<` and `third` with `entity(byte)`.
fn escape_with(out: &mut String, input: &str, third: u8, entity: impl Fn(u8) -> &'static str) {
    let bytes = input.as_bytes();
    let mut start = 0;
    while let Some(rel) = memchr3(b'&', b'<', third, &bytes[start..]) {
        let pos = start + rel;
        // All three needles are ASCII, so `pos` is always a char boundary.
        out.push_str(&input[start..pos]);
        out.push_str(entity(bytes[pos]));
        start = pos + 1;
    }
    out.push_str(&input[start..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKey;
    use std::sync::Arc;

    #[test]
    fn escapes_text_and_attributes() {
        let node = Node::Element {
            key: NodeKey(1),
            name: Arc::from("p"),
            attributes: vec![(Arc::from("title"), r#"a "quoted" <b> & c"#.to_string())],
            children: vec![Node::Text {
                key: NodeKey(2),
                text: "1 < 2 && 3 > 2".to_string(),
            }],
        };
        assert_eq!(
            to_html(&node),
            r#"<p title="a &quot;quoted&quot; &lt;b> &amp; c">1 &lt; 2 &amp;&amp; 3 &gt; 2</p>"#
        );
    }

    #[test]
    fn non_ascii_text_passes_through() {
        let mut out = String::new();
        escape_text(&mut out, "héllo <wörld>");
        assert_eq!(out, "héllo &lt;wörld&gt;");
    }
}
