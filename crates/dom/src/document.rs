use crate::events::{EventListener, EventType};
use crate::patch::DomPatch;
use crate::serialize;
use crate::types::{Node, NodeKey};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomError {
    /// `NodeKey::INVALID` was passed where a real key is required.
    InvalidKey(NodeKey),
    /// The key was never allocated or its node has been released.
    MissingKey(NodeKey),
    /// Element-only operation applied to a text node.
    WrongNodeKind(NodeKey),
    /// The node cannot take (or be) a child in this position.
    InvalidParent(NodeKey),
    NotAChild { parent: NodeKey, child: NodeKey },
    CycleDetected { parent: NodeKey, child: NodeKey },
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::InvalidKey(key) => write!(f, "invalid node key {key:?}"),
            DomError::MissingKey(key) => write!(f, "node {key:?} is not live"),
            DomError::WrongNodeKind(key) => write!(f, "node {key:?} is not an element"),
            DomError::InvalidParent(key) => write!(f, "node {key:?} cannot be used as parent/child here"),
            DomError::NotAChild { parent, child } => {
                write!(f, "node {child:?} is not a child of {parent:?}")
            }
            DomError::CycleDetected { parent, child } => {
                write!(f, "appending {child:?} under {parent:?} would create a cycle")
            }
        }
    }
}

impl std::error::Error for DomError {}

#[derive(Clone, Debug)]
pub struct DocumentConfig {
    /// Record every successful mutation in the journal (see [`Document::take_patches`]).
    pub record_patches: bool,
    /// Tag name of the root element created with the document.
    pub root_tag: &'static str,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            record_patches: false,
            root_tag: "body",
        }
    }
}

/// Mutable output tree.
///
/// Nodes are created detached and become part of the document once they are
/// appended somewhere below [`Document::root`]. A node has at most one parent;
/// appending an already-parented node moves it. Replaced or removed subtrees
/// are released immediately and their keys never come back.
pub struct Document {
    config: DocumentConfig,
    nodes: HashMap<NodeKey, NodeRecord>,
    next_key: u32,
    root: NodeKey,
    journal: Vec<DomPatch>,
}

impl Document {
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        let mut doc = Self {
            config,
            nodes: HashMap::new(),
            next_key: 1,
            root: NodeKey::INVALID,
            journal: Vec::new(),
        };
        let root_tag = doc.config.root_tag;
        doc.root = doc.insert(NodeKind::Element {
            name: Arc::from(root_tag),
            attributes: Vec::new(),
        });
        doc
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn create_element(&mut self, name: &str) -> NodeKey {
        let name: Arc<str> = Arc::from(name);
        let key = self.insert(NodeKind::Element {
            name: Arc::clone(&name),
            attributes: Vec::new(),
        });
        log::trace!(target: "dom.document", "create <{name}> as {key:?}");
        self.record(DomPatch::CreateElement { key, name });
        key
    }

    pub fn create_text(&mut self, text: &str) -> NodeKey {
        let key = self.insert(NodeKind::Text {
            text: text.to_string(),
        });
        self.record(DomPatch::CreateText {
            key,
            text: text.to_string(),
        });
        key
    }

    pub fn set_attribute(&mut self, key: NodeKey, name: &str, value: &str) -> Result<(), DomError> {
        let record = self.live_mut(key)?;
        let NodeKind::Element { attributes, .. } = &mut record.kind else {
            return Err(DomError::WrongNodeKind(key));
        };
        let name: Arc<str> = match attributes.iter_mut().find(|(k, _)| k.as_ref() == name) {
            Some((existing, slot)) => {
                slot.clear();
                slot.push_str(value);
                Arc::clone(existing)
            }
            None => {
                let name: Arc<str> = Arc::from(name);
                attributes.push((Arc::clone(&name), value.to_string()));
                name
            }
        };
        self.record(DomPatch::SetAttribute {
            key,
            name,
            value: value.to_string(),
        });
        Ok(())
    }

    pub fn set_listener(
        &mut self,
        key: NodeKey,
        event: EventType,
        listener: EventListener,
    ) -> Result<(), DomError> {
        let record = self.live_mut(key)?;
        if !record.is_element() {
            return Err(DomError::WrongNodeKind(key));
        }
        match record.listeners.iter_mut().find(|(ty, _)| *ty == event) {
            Some((_, slot)) => *slot = listener,
            None => record.listeners.push((event, listener)),
        }
        self.record(DomPatch::SetListener { key, event });
        Ok(())
    }

    pub fn listener(&self, key: NodeKey, event: EventType) -> Option<EventListener> {
        self.nodes.get(&key).and_then(|record| {
            record
                .listeners
                .iter()
                .find(|(ty, _)| *ty == event)
                .map(|(_, listener)| listener.clone())
        })
    }

    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        self.check_link(parent, child)?;
        self.detach(child);
        self.link_at(parent, child, None);
        self.record(DomPatch::AppendChild { parent, child });
        self.verify();
        Ok(())
    }

    /// Splice `text` at the end of `parent`'s content.
    ///
    /// Extends the trailing text node when there is one, otherwise creates it.
    /// Returns the key of the text node that now holds the text.
    pub fn append_text(&mut self, parent: NodeKey, text: &str) -> Result<NodeKey, DomError> {
        let record = self.live(parent)?;
        if !record.is_element() {
            return Err(DomError::InvalidParent(parent));
        }
        let trailing = record
            .children
            .last()
            .copied()
            .filter(|last| matches!(self.nodes.get(last).map(|r| &r.kind), Some(NodeKind::Text { .. })));
        let key = match trailing {
            Some(last) => {
                if let Some(NodeKind::Text { text: existing }) =
                    self.nodes.get_mut(&last).map(|r| &mut r.kind)
                {
                    existing.push_str(text);
                }
                last
            }
            None => {
                let key = self.insert(NodeKind::Text {
                    text: text.to_string(),
                });
                self.link_at(parent, key, None);
                key
            }
        };
        self.record(DomPatch::AppendText {
            parent,
            key,
            text: text.to_string(),
        });
        self.verify();
        Ok(key)
    }

    /// Put `new` where `old` is and release `old`'s subtree.
    pub fn replace_child(
        &mut self,
        parent: NodeKey,
        new: NodeKey,
        old: NodeKey,
    ) -> Result<(), DomError> {
        self.live(old)?;
        if self.nodes.get(&old).and_then(|r| r.parent) != Some(parent) {
            return Err(DomError::NotAChild { parent, child: old });
        }
        if new == old {
            return Ok(());
        }
        self.check_link(parent, new)?;
        self.detach(new);
        let Some(pos) = self
            .nodes
            .get(&parent)
            .and_then(|r| r.children.iter().position(|k| *k == old))
        else {
            debug_assert!(false, "{old:?} has parent link to {parent:?} but is not listed");
            return Err(DomError::NotAChild { parent, child: old });
        };
        self.detach(old);
        self.link_at(parent, new, Some(pos));
        let released = self.release(old);
        log::trace!(
            target: "dom.document",
            "replace {old:?} with {new:?} under {parent:?}, released {released} nodes"
        );
        self.record(DomPatch::ReplaceChild { parent, new, old });
        self.verify();
        Ok(())
    }

    /// Detach `child` from `parent` and release its subtree.
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        self.live(child)?;
        if self.nodes.get(&child).and_then(|r| r.parent) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        self.release(child);
        self.record(DomPatch::RemoveNode { key: child });
        self.verify();
        Ok(())
    }

    /// Release a node that never made it into the tree, along with its
    /// subtree. A node that still has a parent is unlinked first.
    pub fn discard(&mut self, key: NodeKey) -> Result<(), DomError> {
        self.live(key)?;
        if key == self.root {
            return Err(DomError::InvalidParent(key));
        }
        self.detach(key);
        let released = self.release(key);
        log::trace!(target: "dom.document", "discard {key:?}, released {released} nodes");
        self.record(DomPatch::Discard { key });
        self.verify();
        Ok(())
    }

    pub fn is_live(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Number of allocated, unreleased nodes (attached or not).
    pub fn live_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(&key).and_then(|r| r.parent)
    }

    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes
            .get(&key)
            .map(|r| r.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn tag_name(&self, key: NodeKey) -> Option<&str> {
        match &self.nodes.get(&key)?.kind {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn attribute(&self, key: NodeKey, name: &str) -> Option<&str> {
        match &self.nodes.get(&key)?.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.as_ref() == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn text(&self, key: NodeKey) -> Option<&str> {
        match &self.nodes.get(&key)?.kind {
            NodeKind::Text { text } => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    /// First element in tree order (starting at the root) whose `id` attribute is `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeKey> {
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            if self.attribute(key, "id") == Some(id) {
                return Some(key);
            }
            stack.extend(self.children(key).iter().rev().copied());
        }
        None
    }

    pub fn materialize(&self, key: NodeKey) -> Result<Node, DomError> {
        let record = self.live(key)?;
        let node = match &record.kind {
            NodeKind::Element { name, attributes } => Node::Element {
                key,
                name: Arc::clone(name),
                attributes: attributes.clone(),
                children: record
                    .children
                    .iter()
                    .map(|child| self.materialize(*child))
                    .collect::<Result<Vec<_>, _>>()?,
            },
            NodeKind::Text { text } => Node::Text {
                key,
                text: text.clone(),
            },
        };
        Ok(node)
    }

    /// Serialized children of `key`; empty for released keys.
    pub fn inner_html(&self, key: NodeKey) -> String {
        let mut out = String::new();
        for child in self.children(key) {
            self.write_html(*child, &mut out);
        }
        out
    }

    /// Serialized `key` including its own tag; empty for released keys.
    pub fn outer_html(&self, key: NodeKey) -> String {
        let mut out = String::new();
        self.write_html(key, &mut out);
        out
    }

    /// Drain the mutation journal.
    pub fn take_patches(&mut self) -> Vec<DomPatch> {
        std::mem::take(&mut self.journal)
    }

    fn write_html(&self, key: NodeKey, out: &mut String) {
        let Some(record) = self.nodes.get(&key) else {
            return;
        };
        match &record.kind {
            NodeKind::Element { name, attributes } => {
                serialize::open_tag(out, name, attributes.iter().map(|(k, v)| (k.as_ref(), v.as_str())));
                for child in &record.children {
                    self.write_html(*child, out);
                }
                serialize::close_tag(out, name);
            }
            NodeKind::Text { text } => serialize::escape_text(out, text),
        }
    }

    fn insert(&mut self, kind: NodeKind) -> NodeKey {
        let key = NodeKey(self.next_key);
        self.next_key = self.next_key.wrapping_add(1);
        debug_assert!(key != NodeKey::INVALID, "node key space exhausted");
        self.nodes.insert(
            key,
            NodeRecord {
                kind,
                parent: None,
                children: Vec::new(),
                listeners: Vec::new(),
            },
        );
        key
    }

    fn live(&self, key: NodeKey) -> Result<&NodeRecord, DomError> {
        if key == NodeKey::INVALID {
            return Err(DomError::InvalidKey(key));
        }
        self.nodes.get(&key).ok_or(DomError::MissingKey(key))
    }

    fn live_mut(&mut self, key: NodeKey) -> Result<&mut NodeRecord, DomError> {
        if key == NodeKey::INVALID {
            return Err(DomError::InvalidKey(key));
        }
        self.nodes.get_mut(&key).ok_or(DomError::MissingKey(key))
    }

    fn check_link(&self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        if !self.live(parent)?.is_element() {
            return Err(DomError::InvalidParent(parent));
        }
        self.live(child)?;
        if child == self.root {
            return Err(DomError::InvalidParent(child));
        }
        if parent == child || self.is_descendant(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        Ok(())
    }

    fn detach(&mut self, key: NodeKey) {
        let Some(parent) = self.nodes.get_mut(&key).and_then(|r| r.parent.take()) else {
            return;
        };
        if let Some(record) = self.nodes.get_mut(&parent) {
            record.children.retain(|k| *k != key);
        }
    }

    fn link_at(&mut self, parent: NodeKey, child: NodeKey, pos: Option<usize>) {
        if let Some(record) = self.nodes.get_mut(&parent) {
            match pos {
                Some(pos) if pos <= record.children.len() => record.children.insert(pos, child),
                _ => record.children.push(child),
            }
        }
        if let Some(record) = self.nodes.get_mut(&child) {
            record.parent = Some(parent);
        }
    }

    /// Drop a detached subtree; returns how many nodes were released.
    fn release(&mut self, key: NodeKey) -> usize {
        let mut released = 0;
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if let Some(record) = self.nodes.remove(&current) {
                released += 1;
                stack.extend(record.children);
            }
        }
        released
    }

    fn is_descendant(&self, ancestor: NodeKey, maybe_descendant: NodeKey) -> bool {
        let mut current = self.parent(maybe_descendant);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.parent(key);
        }
        false
    }

    fn record(&mut self, patch: DomPatch) {
        if self.config.record_patches {
            self.journal.push(patch);
        }
    }

    #[cfg(feature = "dom-invariants")]
    fn verify(&self) {
        for (key, record) in &self.nodes {
            for child in &record.children {
                let child_parent = self.nodes.get(child).and_then(|r| r.parent);
                assert_eq!(child_parent, Some(*key), "child {child:?} has a stale parent link");
            }
            if let Some(parent) = record.parent {
                let listed = self
                    .nodes
                    .get(&parent)
                    .is_some_and(|r| r.children.contains(key));
                assert!(listed, "{key:?} is missing from its parent's children");
            }
        }
    }

    #[cfg(not(feature = "dom-invariants"))]
    #[inline]
    fn verify(&self) {}
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root)
            .field("live", &self.nodes.len())
            .field("html", &self.outer_html(self.root))
            .finish()
    }
}

struct NodeRecord {
    kind: NodeKind,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    listeners: Vec<(EventType, EventListener)>,
}

impl NodeRecord {
    fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }
}

enum NodeKind {
    Element {
        name: Arc<str>,
        attributes: Vec<(Arc<str>, String)>,
    },
    Text {
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_container() -> (Document, NodeKey) {
        let mut doc = Document::new();
        let container = doc.create_element("div");
        doc.set_attribute(container, "id", "container").unwrap();
        doc.append_child(doc.root(), container).unwrap();
        (doc, container)
    }

    #[test]
    fn attributes_keep_insertion_order_and_overwrite_in_place() {
        let (mut doc, container) = doc_with_container();
        let div = doc.create_element("div");
        doc.set_attribute(div, "id", "a").unwrap();
        doc.set_attribute(div, "class", "b").unwrap();
        doc.set_attribute(div, "id", "c").unwrap();
        doc.append_child(container, div).unwrap();
        assert_eq!(doc.inner_html(container), r#"<div id="c" class="b"></div>"#);
    }

    #[test]
    fn append_text_extends_trailing_text_node() {
        let (mut doc, container) = doc_with_container();
        let first = doc.append_text(container, "test1").unwrap();
        let second = doc.append_text(container, "test2").unwrap();
        assert_eq!(first, second);
        assert_eq!(doc.children(container).len(), 1);
        assert_eq!(doc.inner_html(container), "test1test2");
    }

    #[test]
    fn append_moves_a_parented_node() {
        let (mut doc, container) = doc_with_container();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(container, a).unwrap();
        doc.append_child(container, b).unwrap();
        doc.append_child(b, a).unwrap();
        assert_eq!(doc.inner_html(container), "<b><a></a></b>");
        assert_eq!(doc.parent(a), Some(b));
    }

    #[test]
    fn replace_child_keeps_position_and_releases_old_subtree() {
        let (mut doc, container) = doc_with_container();
        let first = doc.create_element("p");
        let old = doc.create_element("div");
        let last = doc.create_element("i");
        doc.append_child(container, first).unwrap();
        doc.append_child(container, old).unwrap();
        doc.append_child(container, last).unwrap();
        let inner = doc.append_text(old, "gone").unwrap();

        let new = doc.create_element("span");
        doc.replace_child(container, new, old).unwrap();

        assert_eq!(doc.inner_html(container), "<p></p><span></span><i></i>");
        assert!(!doc.is_live(old));
        assert!(!doc.is_live(inner));
    }

    #[test]
    fn replace_child_rejects_foreign_old_node() {
        let (mut doc, container) = doc_with_container();
        let stranger = doc.create_element("div");
        let new = doc.create_element("span");
        assert_eq!(
            doc.replace_child(container, new, stranger),
            Err(DomError::NotAChild {
                parent: container,
                child: stranger
            })
        );
    }

    #[test]
    fn cycles_are_rejected() {
        let (mut doc, container) = doc_with_container();
        let inner = doc.create_element("div");
        doc.append_child(container, inner).unwrap();
        assert_eq!(
            doc.append_child(inner, container),
            Err(DomError::CycleDetected {
                parent: inner,
                child: container
            })
        );
    }

    #[test]
    fn text_nodes_cannot_parent() {
        let (mut doc, _) = doc_with_container();
        let text = doc.create_text("x");
        let div = doc.create_element("div");
        assert_eq!(doc.append_child(text, div), Err(DomError::InvalidParent(text)));
        assert_eq!(
            doc.set_attribute(text, "id", "nope"),
            Err(DomError::WrongNodeKind(text))
        );
    }

    #[test]
    fn remove_child_releases_subtree() {
        let (mut doc, container) = doc_with_container();
        let div = doc.create_element("div");
        doc.append_child(container, div).unwrap();
        let before = doc.live_count();
        doc.remove_child(container, div).unwrap();
        assert_eq!(doc.live_count(), before - 1);
        assert_eq!(doc.inner_html(container), "");
    }

    #[test]
    fn discard_releases_detached_subtrees() {
        let (mut doc, container) = doc_with_container();
        let before = doc.live_count();
        let ul = doc.create_element("ul");
        let li = doc.create_element("li");
        doc.append_child(ul, li).unwrap();
        doc.append_text(li, "x").unwrap();
        assert_eq!(doc.live_count(), before + 3);

        doc.discard(li).unwrap();
        assert!(doc.children(ul).is_empty());
        doc.discard(ul).unwrap();
        assert_eq!(doc.live_count(), before);
        assert_eq!(doc.discard(ul), Err(DomError::MissingKey(ul)));
        assert_eq!(doc.discard(doc.root()), Err(DomError::InvalidParent(doc.root())));
        assert_eq!(doc.inner_html(container), "");
    }

    #[test]
    fn get_element_by_id_uses_tree_order() {
        let (mut doc, container) = doc_with_container();
        let outer = doc.create_element("section");
        let nested = doc.create_element("div");
        let sibling = doc.create_element("div");
        doc.set_attribute(nested, "id", "dup").unwrap();
        doc.set_attribute(sibling, "id", "dup").unwrap();
        doc.append_child(outer, nested).unwrap();
        doc.append_child(container, outer).unwrap();
        doc.append_child(container, sibling).unwrap();
        assert_eq!(doc.get_element_by_id("dup"), Some(nested));
        assert_eq!(doc.get_element_by_id("container"), Some(container));
    }

    #[test]
    fn detached_nodes_are_not_found_by_id() {
        let (mut doc, _) = doc_with_container();
        let floating = doc.create_element("div");
        doc.set_attribute(floating, "id", "floating").unwrap();
        assert_eq!(doc.get_element_by_id("floating"), None);
    }

    #[test]
    fn journal_records_only_when_enabled() {
        let mut quiet = Document::new();
        let div = quiet.create_element("div");
        quiet.append_child(quiet.root(), div).unwrap();
        assert!(quiet.take_patches().is_empty());

        let mut loud = Document::with_config(DocumentConfig {
            record_patches: true,
            ..DocumentConfig::default()
        });
        let div = loud.create_element("div");
        loud.set_attribute(div, "id", "x").unwrap();
        loud.append_child(loud.root(), div).unwrap();
        let patches = loud.take_patches();
        assert_eq!(patches.len(), 3);
        assert!(matches!(patches[0], DomPatch::CreateElement { key, .. } if key == div));
        assert!(patches[2].is_structural());
        assert!(loud.take_patches().is_empty());
    }

    #[test]
    fn materialize_mirrors_structure() {
        let (mut doc, container) = doc_with_container();
        let div = doc.create_element("div");
        doc.append_text(div, "hi").unwrap();
        doc.append_child(container, div).unwrap();
        let node = doc.materialize(container).unwrap();
        assert_eq!(node.tag_name(), Some("div"));
        assert_eq!(node.attr("id"), Some("container"));
        assert_eq!(node.children().len(), 1);
        assert!(matches!(&node.children()[0].children()[0], Node::Text { text, .. } if text == "hi"));
    }
}
