//! The stateful-component protocol.

use crate::element::Element;
use crate::error::ReconcileError;
use crate::instance::class::{self, ClassCell, Phase};
use crate::instance::Env;
use crate::props::Props;
use crate::value::State;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Weak;

pub type RenderResult = Result<Element, ReconcileError>;
pub type HookResult = Result<(), ReconcileError>;

/// Read-only view of a component's current props and state during render and
/// lifecycle hooks.
pub struct Context<'a> {
    pub(crate) props: &'a Props,
    pub(crate) state: &'a State,
}

impl<'a> Context<'a> {
    pub fn props(&self) -> &'a Props {
        self.props
    }

    pub fn state(&self) -> &'a State {
        self.state
    }
}

/// A stateful component.
///
/// Implementors are constructed by the reconciler when their element first
/// appears at a tree position and live until that position changes type. The
/// [`Updater`] handed to [`Component::create`] is the only way to change state.
pub trait Component: 'static {
    fn create(props: &Props, updater: Updater) -> Self
    where
        Self: Sized;

    fn initial_state(&self) -> State {
        State::new()
    }

    fn render(&self, cx: &Context<'_>) -> RenderResult;

    /// Runs once, before the first render.
    fn component_will_mount(&mut self, _cx: &Context<'_>) -> HookResult {
        Ok(())
    }

    /// Runs before a re-render is patched into an output of the same type.
    fn component_will_update(&mut self, _cx: &Context<'_>) -> HookResult {
        Ok(())
    }

    fn component_will_unmount(&mut self, _cx: &Context<'_>) -> HookResult {
        Ok(())
    }
}

/// Handle from a component back to the instance that owns it.
///
/// Holds weak references only: an updater captured by an event handler in the
/// output tree keeps neither the instance nor the renderer alive.
#[derive(Clone)]
pub struct Updater {
    pub(crate) cell: Weak<RefCell<ClassCell>>,
    pub(crate) phase: Weak<Cell<Phase>>,
    pub(crate) env: Weak<Env>,
    pub(crate) component: &'static str,
}

impl Updater {
    /// Shallow-merge `partial` into state and re-render synchronously.
    pub fn set_state(&self, partial: State) -> Result<(), ReconcileError> {
        self.set_state_with(move |_| partial)
    }

    /// Like [`Updater::set_state`], with the partial state computed from the
    /// current state.
    pub fn set_state_with(
        &self,
        f: impl FnOnce(&State) -> State,
    ) -> Result<(), ReconcileError> {
        let unmounted = || ReconcileError::Unmounted {
            component: self.component,
        };
        let cell = self.cell.upgrade().ok_or_else(unmounted)?;
        let phase = self.phase.upgrade().ok_or_else(unmounted)?;
        let env = self.env.upgrade().ok_or_else(unmounted)?;
        class::set_state(&cell, &phase, &env, self.component, f)
    }

    /// False before the first render completes and from the start of
    /// `component_will_unmount` on.
    pub fn is_mounted(&self) -> bool {
        self.env.strong_count() > 0
            && self
                .phase
                .upgrade()
                .is_some_and(|phase| phase.get() == Phase::Mounted)
    }
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Updater({})", self.component)
    }
}
