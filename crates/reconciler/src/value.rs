//! Prop and state values.

use crate::error::ReconcileError;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Callback stored in an event prop such as `onClick`.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn() -> Result<(), ReconcileError>>);

impl EventHandler {
    pub fn new(f: impl Fn() -> Result<(), ReconcileError> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self) -> Result<(), ReconcileError> {
        (self.0)()
    }

    pub fn ptr_eq(&self, other: &EventHandler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventHandler(..)")
    }
}

#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Handler(EventHandler),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            Value::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// Attribute text for this value. `Null` and handlers have none.
    pub fn to_attribute(&self) -> Option<String> {
        match self {
            Value::Null | Value::Handler(_) => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(n) => Some(n.to_string()),
            Value::Float(x) => Some(x.to_string()),
            Value::Str(s) => Some(s.to_string()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Handler(a), Value::Handler(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Value::Str(s)
    }
}

impl From<EventHandler> for Value {
    fn from(h: EventHandler) -> Self {
        Value::Handler(h)
    }
}

/// Insertion-ordered string-keyed map.
///
/// Re-inserting a key overwrites its value in place, so iteration order is the
/// order in which keys were first seen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueMap {
    entries: Vec<(Arc<str>, Value)>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k.as_ref() == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((Arc::from(key), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shallow merge: keys in `partial` overwrite, new keys are appended.
    pub fn merge(&mut self, partial: ValueMap) {
        for (key, value) in partial.entries {
            match self.entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, slot)) => *slot = value,
                None => self.entries.push((key, value)),
            }
        }
    }
}

/// Component state. Same shape as the prop values map.
pub type State = ValueMap;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overwrites_in_place_and_appends() {
        let mut state = State::new().with("counter", 0).with("label", "a");
        state.merge(State::new().with("counter", 1).with("extra", true));
        let keys: Vec<_> = state.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["counter", "label", "extra"]);
        assert_eq!(state.get_int("counter"), Some(1));
        assert_eq!(state.get_str("label"), Some("a"));
        assert_eq!(state.get_bool("extra"), Some(true));
    }

    #[test]
    fn attribute_text() {
        assert_eq!(Value::from("x").to_attribute().as_deref(), Some("x"));
        assert_eq!(Value::from(3).to_attribute().as_deref(), Some("3"));
        assert_eq!(Value::Null.to_attribute(), None);
        assert_eq!(Value::from(EventHandler::new(|| Ok(()))).to_attribute(), None);
    }

    #[test]
    fn handlers_compare_by_identity() {
        let h = EventHandler::new(|| Ok(()));
        assert_eq!(Value::from(h.clone()), Value::from(h));
        assert_ne!(
            Value::from(EventHandler::new(|| Ok(()))),
            Value::from(EventHandler::new(|| Ok(())))
        );
    }
}
