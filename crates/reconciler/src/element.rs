//! Element descriptions: what to render.
//!
//! Elements are immutable values. New content is always described by a new
//! element; the reconciler compares an old and a new element at the same tree
//! position with [`Element::same_type`] to decide between patching and
//! replacing.

use crate::component::{Component, RenderResult, Updater};
use crate::props::Props;
use std::any::TypeId;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub enum Element {
    Text(Arc<str>),
    Node { ty: ElementType, props: Props },
}

#[derive(Clone, Debug)]
pub enum ElementType {
    /// Output tag such as `div`.
    Tag(Arc<str>),
    /// Stateless component.
    Function(FunctionType),
    /// Stateful component.
    Class(ClassType),
}

/// A stateless component: a function of props.
///
/// Identity is the Rust type of the function or closure, so the same `fn`
/// item names the same component type across renders.
#[derive(Clone)]
pub struct FunctionType {
    id: TypeId,
    name: &'static str,
    render: Rc<dyn Fn(&Props) -> RenderResult>,
}

impl FunctionType {
    pub fn of<F>(render: F) -> Self
    where
        F: Fn(&Props) -> RenderResult + 'static,
    {
        Self {
            id: TypeId::of::<F>(),
            name: std::any::type_name::<F>(),
            render: Rc::new(render),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn call(&self, props: &Props) -> RenderResult {
        (self.render)(props)
    }
}

impl PartialEq for FunctionType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionType({})", self.name)
    }
}

/// A stateful component type: anything implementing [`Component`].
#[derive(Clone, Copy)]
pub struct ClassType {
    id: TypeId,
    name: &'static str,
    construct: fn(&Props, Updater) -> Box<dyn Component>,
}

impl ClassType {
    pub fn of<C: Component>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
            construct: construct::<C>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn construct(&self, props: &Props, updater: Updater) -> Box<dyn Component> {
        (self.construct)(props, updater)
    }
}

fn construct<C: Component>(props: &Props, updater: Updater) -> Box<dyn Component> {
    Box::new(C::create(props, updater))
}

impl PartialEq for ClassType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassType({})", self.name)
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ElementType::Tag(a), ElementType::Tag(b)) => a == b,
            (ElementType::Function(a), ElementType::Function(b)) => a == b,
            (ElementType::Class(a), ElementType::Class(b)) => a == b,
            _ => false,
        }
    }
}

impl Element {
    /// The element factory: `ty` plus props, with `children` stored as
    /// `props.children`.
    pub fn create(ty: ElementType, props: Props, children: impl IntoIterator<Item = Element>) -> Self {
        Element::Node {
            ty,
            props: props.with_children(children),
        }
    }

    pub fn text(text: impl Into<Arc<str>>) -> Self {
        Element::Text(text.into())
    }

    pub fn host(tag: &str, props: Props, children: impl IntoIterator<Item = Element>) -> Self {
        Self::create(ElementType::Tag(Arc::from(tag)), props, children)
    }

    pub fn function<F>(render: F, props: Props, children: impl IntoIterator<Item = Element>) -> Self
    where
        F: Fn(&Props) -> RenderResult + 'static,
    {
        Self::create(ElementType::Function(FunctionType::of(render)), props, children)
    }

    pub fn class<C: Component>(props: Props, children: impl IntoIterator<Item = Element>) -> Self {
        Self::create(ElementType::Class(ClassType::of::<C>()), props, children)
    }

    pub fn ty(&self) -> Option<&ElementType> {
        match self {
            Element::Text(_) => None,
            Element::Node { ty, .. } => Some(ty),
        }
    }

    pub fn props(&self) -> Option<&Props> {
        match self {
            Element::Text(_) => None,
            Element::Node { props, .. } => Some(props),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Element::Text(_))
    }

    /// Positional type check: text matches text, nodes match by type.
    pub fn same_type(&self, other: &Element) -> bool {
        match (self, other) {
            (Element::Text(_), Element::Text(_)) => true,
            (Element::Node { ty: a, .. }, Element::Node { ty: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Short label for logs.
    pub fn type_name(&self) -> &str {
        match self {
            Element::Text(_) => "#text",
            Element::Node { ty, .. } => match ty {
                ElementType::Tag(tag) => tag.as_ref(),
                ElementType::Function(f) => f.name(),
                ElementType::Class(c) => c.name(),
            },
        }
    }
}

impl From<&str> for Element {
    fn from(text: &str) -> Self {
        Element::text(text)
    }
}

impl From<String> for Element {
    fn from(text: String) -> Self {
        Element::text(text)
    }
}
