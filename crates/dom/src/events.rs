//! Event listener slots and dispatch.
//!
//! Each element has at most one listener per [`EventType`], the way
//! `node.onclick = f` works: binding again replaces the previous listener.
//! Dispatch never holds a borrow of the document while a listener runs, so
//! listeners are free to mutate the document that invoked them.

use crate::Document;
use crate::types::NodeKey;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Click => "click",
        }
    }
}

pub type ListenerError = Box<dyn std::error::Error>;

/// Shared, cheaply clonable callback stored in a listener slot.
#[derive(Clone)]
pub struct EventListener(Rc<dyn Fn() -> Result<(), ListenerError>>);

impl EventListener {
    pub fn new(f: impl Fn() -> Result<(), ListenerError> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self) -> Result<(), ListenerError> {
        (self.0)()
    }
}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventListener(..)")
    }
}

#[derive(Debug)]
pub enum DispatchError {
    /// The target is not a live node.
    UnknownTarget(NodeKey),
    /// The document was already mutably borrowed by the caller.
    DocumentBusy,
    /// The listener ran and failed.
    Listener {
        target: NodeKey,
        event: EventType,
        source: ListenerError,
    },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::UnknownTarget(key) => write!(f, "unknown event target {key:?}"),
            DispatchError::DocumentBusy => f.write_str("document is borrowed during dispatch"),
            DispatchError::Listener {
                target,
                event,
                source,
            } => write!(
                f,
                "{} listener on {target:?} failed: {source}",
                event.as_str()
            ),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Listener { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Fire `event` at `target`.
///
/// Returns `Ok(false)` when the target has no listener for `event`. The
/// document borrow is released before the listener is invoked.
pub fn dispatch_event(
    doc: &RefCell<Document>,
    target: NodeKey,
    event: EventType,
) -> Result<bool, DispatchError> {
    let listener = {
        let doc = doc.try_borrow().map_err(|_| DispatchError::DocumentBusy)?;
        if !doc.is_live(target) {
            return Err(DispatchError::UnknownTarget(target));
        }
        doc.listener(target, event)
    };
    let Some(listener) = listener else {
        log::trace!(target: "dom.events", "no {} listener on {target:?}", event.as_str());
        return Ok(false);
    };
    log::trace!(target: "dom.events", "dispatch {} to {target:?}", event.as_str());
    listener.call().map_err(|source| DispatchError::Listener {
        target,
        event,
        source,
    })?;
    Ok(true)
}

/// Convenience for tests and demos: find `#id` and click it.
pub fn click_element_by_id(doc: &RefCell<Document>, id: &str) -> Result<bool, DispatchError> {
    let target = {
        let doc = doc.try_borrow().map_err(|_| DispatchError::DocumentBusy)?;
        doc.get_element_by_id(id)
    };
    match target {
        Some(key) => dispatch_event(doc, key, EventType::Click),
        None => Ok(false),
    }
}
