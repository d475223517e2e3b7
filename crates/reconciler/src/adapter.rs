//! The output backend seam.
//!
//! The reconciler never touches a concrete tree. Everything it does to the
//! rendered output goes through [`OutputAdapter`], in depth-first,
//! left-to-right order.

use crate::error::OutputError;
use crate::value::EventHandler;
use std::sync::Arc;

/// Opaque handle to a node owned by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Click => "click",
        }
    }
}

/// What an instance contributes to its parent: a node, or bare text that the
/// parent splices into its content.
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    Node(NodeHandle),
    Text(Arc<str>),
}

impl Output {
    pub fn node(&self) -> Option<NodeHandle> {
        match self {
            Output::Node(handle) => Some(*handle),
            Output::Text(_) => None,
        }
    }
}

pub trait OutputAdapter {
    /// Create a detached node for `tag`.
    fn create_node(&mut self, tag: &str) -> Result<NodeHandle, OutputError>;

    fn set_attribute(&mut self, node: NodeHandle, name: &str, value: &str)
    -> Result<(), OutputError>;

    /// Bind `handler` to the node's `kind` slot, replacing any previous one.
    fn bind_event(
        &mut self,
        node: NodeHandle,
        kind: EventKind,
        handler: EventHandler,
    ) -> Result<(), OutputError>;

    fn append_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), OutputError>;

    /// Append text to the end of `parent`'s content.
    fn append_text(&mut self, parent: NodeHandle, text: &str) -> Result<(), OutputError>;

    /// Put `new` in `old`'s position under `parent`; `old` is released.
    fn replace_child(
        &mut self,
        parent: NodeHandle,
        new: NodeHandle,
        old: NodeHandle,
    ) -> Result<(), OutputError>;

    fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), OutputError>;

    /// Release a node built during a pass that was abandoned before commit,
    /// together with everything appended under it.
    fn discard(&mut self, node: NodeHandle) -> Result<(), OutputError>;

    fn append_output(&mut self, parent: NodeHandle, output: &Output) -> Result<(), OutputError> {
        match output {
            Output::Node(child) => self.append_child(parent, *child),
            Output::Text(text) => self.append_text(parent, text),
        }
    }
}
