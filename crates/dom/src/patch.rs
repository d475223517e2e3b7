//! Mutation journal.
//!
//! When [`DocumentConfig::record_patches`](crate::DocumentConfig) is enabled every
//! successful mutation of a [`Document`](crate::Document) appends one record here,
//! in application order. The journal lets callers observe exactly which mutations
//! a render pass replayed against the live tree.
//!
//! Invariants:
//! - Records are appended only after the mutation succeeded.
//! - Keys in `RemoveNode`/`Discard`/`ReplaceChild { old, .. }` are invalid for every later record.
//! - Attribute records carry the canonical (already mapped) attribute name.

use crate::events::EventType;
use crate::types::NodeKey;
use std::sync::Arc;

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomPatch {
    /// Create a detached element node.
    CreateElement { key: NodeKey, name: Arc<str> },
    /// Create a detached text node.
    CreateText { key: NodeKey, text: String },
    /// Set (or overwrite) one attribute on an element.
    SetAttribute {
        key: NodeKey,
        name: Arc<str>,
        value: String,
    },
    /// Fill the listener slot for `event` on an element.
    SetListener { key: NodeKey, event: EventType },
    /// Append a child to the end of a parent's children list, detaching it first
    /// if it had another parent.
    AppendChild { parent: NodeKey, child: NodeKey },
    /// Splice text at the end of a parent's content.
    ///
    /// `key` is the text node that received the text; it is either a freshly
    /// created node or the parent's trailing text node.
    AppendText { parent: NodeKey, key: NodeKey, text: String },
    /// Swap `old` for `new` at the same position; `old`'s subtree is released.
    ReplaceChild {
        parent: NodeKey,
        new: NodeKey,
        old: NodeKey,
    },
    /// Detach and release a subtree.
    RemoveNode { key: NodeKey },
    /// Release a node built for the tree but never committed to it.
    Discard { key: NodeKey },
}

impl DomPatch {
    /// Whether this record changed parent/child links, as opposed to creating
    /// a node or setting node data.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DomPatch::AppendChild { .. }
                | DomPatch::AppendText { .. }
                | DomPatch::ReplaceChild { .. }
                | DomPatch::RemoveNode { .. }
                | DomPatch::Discard { .. }
        )
    }
}
