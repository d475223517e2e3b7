//! [`OutputAdapter`] for the in-memory [`dom::Document`].

use crate::adapter::{EventKind, NodeHandle, OutputAdapter};
use crate::error::OutputError;
use crate::value::EventHandler;
use dom::{Document, EventListener, EventType, ListenerError, NodeKey};

impl From<NodeKey> for NodeHandle {
    fn from(key: NodeKey) -> Self {
        NodeHandle(u64::from(key.0))
    }
}

fn key(op: &'static str, handle: NodeHandle) -> Result<NodeKey, OutputError> {
    u32::try_from(handle.0)
        .map(NodeKey)
        .map_err(|_| OutputError::new(op, format!("handle {} is not a document key", handle.0)))
}

fn event_type(kind: EventKind) -> EventType {
    match kind {
        EventKind::Click => EventType::Click,
    }
}

impl OutputAdapter for Document {
    fn create_node(&mut self, tag: &str) -> Result<NodeHandle, OutputError> {
        Ok(Document::create_element(self, tag).into())
    }

    fn set_attribute(
        &mut self,
        node: NodeHandle,
        name: &str,
        value: &str,
    ) -> Result<(), OutputError> {
        let node = key("set_attribute", node)?;
        Document::set_attribute(self, node, name, value)
            .map_err(|err| OutputError::new("set_attribute", err))
    }

    fn bind_event(
        &mut self,
        node: NodeHandle,
        kind: EventKind,
        handler: EventHandler,
    ) -> Result<(), OutputError> {
        let node = key("bind_event", node)?;
        let listener = EventListener::new(move || {
            handler
                .call()
                .map_err(|err| -> ListenerError { Box::new(err) })
        });
        self.set_listener(node, event_type(kind), listener)
            .map_err(|err| OutputError::new("bind_event", err))
    }

    fn append_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), OutputError> {
        let (parent, child) = (key("append_child", parent)?, key("append_child", child)?);
        Document::append_child(self, parent, child)
            .map_err(|err| OutputError::new("append_child", err))
    }

    fn append_text(&mut self, parent: NodeHandle, text: &str) -> Result<(), OutputError> {
        let parent = key("append_text", parent)?;
        Document::append_text(self, parent, text)
            .map(|_| ())
            .map_err(|err| OutputError::new("append_text", err))
    }

    fn replace_child(
        &mut self,
        parent: NodeHandle,
        new: NodeHandle,
        old: NodeHandle,
    ) -> Result<(), OutputError> {
        let parent = key("replace_child", parent)?;
        let (new, old) = (key("replace_child", new)?, key("replace_child", old)?);
        Document::replace_child(self, parent, new, old)
            .map_err(|err| OutputError::new("replace_child", err))
    }

    fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), OutputError> {
        let (parent, child) = (key("remove_child", parent)?, key("remove_child", child)?);
        Document::remove_child(self, parent, child)
            .map_err(|err| OutputError::new("remove_child", err))
    }

    fn discard(&mut self, node: NodeHandle) -> Result<(), OutputError> {
        let node = key("discard", node)?;
        Document::discard(self, node).map_err(|err| OutputError::new("discard", err))
    }
}
