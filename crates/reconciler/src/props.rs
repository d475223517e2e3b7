//! Props and the prop → output vocabulary.
//!
//! Only props listed in [`ATTRIBUTE_TABLE`] and [`EVENT_TABLE`] reach the output
//! tree. Everything else (including `children`, which is stored separately) is
//! ignored by host elements.

use crate::adapter::{EventKind, NodeHandle, OutputAdapter};
use crate::element::Element;
use crate::error::ReconcileError;
use crate::value::{Value, ValueMap};

/// Prop name → output attribute name.
pub const ATTRIBUTE_TABLE: &[(&str, &str)] = &[("id", "id"), ("className", "class")];

/// Prop name → event slot.
pub const EVENT_TABLE: &[(&str, EventKind)] = &[("onClick", EventKind::Click)];

#[derive(Clone, Debug, Default)]
pub struct Props {
    values: ValueMap,
    children: Vec<Element>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key, value);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get_str(key)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.values.get_int(key)
    }

    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }
}

impl From<ValueMap> for Props {
    fn from(values: ValueMap) -> Self {
        Self {
            values,
            children: Vec::new(),
        }
    }
}

pub(crate) fn attribute_name(prop: &str) -> Option<&'static str> {
    ATTRIBUTE_TABLE
        .iter()
        .find(|(key, _)| *key == prop)
        .map(|(_, attr)| *attr)
}

pub(crate) fn event_kind(prop: &str) -> Option<EventKind> {
    EVENT_TABLE
        .iter()
        .find(|(key, _)| *key == prop)
        .map(|(_, kind)| *kind)
}

/// Set recognized attributes and bind recognized events on `node`, in prop order.
pub(crate) fn apply(
    out: &mut dyn OutputAdapter,
    node: NodeHandle,
    props: &Props,
) -> Result<(), ReconcileError> {
    for (key, value) in props.values.iter() {
        if let Some(attr) = attribute_name(key) {
            match value.to_attribute() {
                Some(text) => out.set_attribute(node, attr, &text)?,
                None => {
                    log::warn!(target: "reconciler.host", "prop {key} has no attribute text, dropped");
                }
            }
        } else if let Some(kind) = event_kind(key) {
            match value.as_handler() {
                Some(handler) => out.bind_event(node, kind, handler.clone())?,
                None => {
                    log::warn!(target: "reconciler.host", "event prop {key} is not a handler, dropped");
                }
            }
        } else {
            log::trace!(target: "reconciler.host", "ignoring unrecognized prop {key}");
        }
    }
    Ok(())
}
