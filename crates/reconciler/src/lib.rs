//! A small UI-tree reconciler.
//!
//! [`Element`]s describe what to show. A [`Renderer`] turns them into
//! instances that own a piece of an output tree and, on every later render or
//! [`Updater::set_state`], diff the new description against the previous one
//! position by position: same type patches the existing instance, a different
//! type tears it down and mounts a new one.
//!
//! The output tree is reached only through [`OutputAdapter`]. The in-memory
//! [`dom::Document`] implements it.

pub mod adapter;
pub mod component;
pub mod element;
pub mod error;
pub mod props;
pub mod value;

mod dom_output;
mod instance;
mod root;
mod stats;

pub use crate::adapter::{EventKind, NodeHandle, Output, OutputAdapter};
pub use crate::component::{Component, Context, HookResult, RenderResult, Updater};
pub use crate::element::{ClassType, Element, ElementType, FunctionType};
pub use crate::error::{OutputError, ReconcileError};
pub use crate::props::{ATTRIBUTE_TABLE, EVENT_TABLE, Props};
pub use crate::root::{RenderConfig, Renderer};
pub use crate::stats::RenderStats;
pub use crate::value::{EventHandler, State, Value, ValueMap};
