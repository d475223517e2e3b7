//! In-memory output tree for the reconciler.
//!
//! A [`Document`] is a mutable arena of element and text nodes addressed by
//! [`NodeKey`] handles. It supports exactly the operations a renderer needs:
//! create, set attribute, bind a listener, append, splice text, replace and
//! remove. Reads go through materialized [`Node`] snapshots or HTML strings.

pub mod debug;
pub mod events;
pub mod serialize;
pub mod traverse;

mod document;
mod patch;
mod types;

pub use crate::document::{Document, DocumentConfig, DomError};
pub use crate::events::{
    DispatchError, EventListener, EventType, ListenerError, click_element_by_id, dispatch_event,
};
pub use crate::patch::DomPatch;
pub use crate::types::{Node, NodeKey};
