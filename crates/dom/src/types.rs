use std::sync::Arc;

/// Opaque handle for a node living in a [`Document`](crate::Document).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u32);

impl NodeKey {
    /// Reserved sentinel for "unassigned/invalid" identity. Never allocated.
    pub const INVALID: NodeKey = NodeKey(0);
}

/// Materialized snapshot of a subtree, detached from the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element {
        key: NodeKey,
        name: Arc<str>,
        attributes: Vec<(Arc<str>, String)>,
        children: Vec<Node>,
    },
    Text {
        key: NodeKey,
        text: String,
    },
}

impl Node {
    pub fn key(&self) -> NodeKey {
        match self {
            Node::Element { key, .. } => *key,
            Node::Text { key, .. } => *key,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element { children, .. } => children,
            Node::Text { .. } => &[],
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.as_ref() == name)
                .map(|(_, v)| v.as_str()),
            Node::Text { .. } => None,
        }
    }

    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Node::Element { name, .. } => Some(name),
            Node::Text { .. } => None,
        }
    }
}
