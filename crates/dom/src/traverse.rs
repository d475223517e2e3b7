use crate::Node;

pub fn find_element_by_id<'a>(node: &'a Node, id: &str) -> Option<&'a Node> {
    if node.attr("id") == Some(id) {
        return Some(node);
    }
    node.children()
        .iter()
        .find_map(|child| find_element_by_id(child, id))
}

/// Concatenated text of all descendant text nodes, in tree order.
pub fn text_content(node: &Node) -> String {
    fn walk(node: &Node, out: &mut String) {
        match node {
            Node::Text { text, .. } => out.push_str(text),
            Node::Element { children, .. } => {
                for child in children {
                    walk(child, out);
                }
            }
        }
    }
    let mut out = String::new();
    walk(node, &mut out);
    out
}

/// Number of element nodes in the subtree, `node` included.
pub fn count_elements(node: &Node) -> usize {
    match node {
        Node::Element { children, .. } => 1 + children.iter().map(count_elements).sum::<usize>(),
        Node::Text { .. } => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    #[test]
    fn finds_nested_ids_and_text() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        doc.set_attribute(inner, "id", "inner").unwrap();
        doc.append_text(inner, "deep").unwrap();
        doc.append_text(outer, "shallow ").unwrap();
        doc.append_child(outer, inner).unwrap();
        doc.append_child(doc.root(), outer).unwrap();

        let tree = doc.materialize(doc.root()).unwrap();
        let found = find_element_by_id(&tree, "inner").unwrap();
        assert_eq!(found.key(), inner);
        assert_eq!(text_content(&tree), "shallow deep");
        assert_eq!(count_elements(&tree), 3);
        assert!(find_element_by_id(&tree, "missing").is_none());
    }
}
