//! Stateful component instances and the `set_state` commit path.

use super::{Env, Instance, RenderPass, abandon, check_tags, commit, instantiate};
use crate::adapter::{NodeHandle, Output};
use crate::component::{Component, Context, Updater};
use crate::element::ClassType;
use crate::error::ReconcileError;
use crate::props::Props;
use crate::value::State;
use std::cell::{Cell, RefCell, RefMut};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Created,
    Mounted,
    Unmounted,
}

/// Everything a class instance owns. Shared with the component's [`Updater`]
/// through a weak reference.
pub(crate) struct ClassCell {
    ty: ClassType,
    props: Props,
    state: State,
    parent: NodeHandle,
    component: Option<Box<dyn Component>>,
    child: Option<Box<Instance>>,
    checkpoint: Option<Checkpoint>,
}

/// What an in-flight re-render replaced.
struct Checkpoint {
    props: Option<Props>,
    state: Option<State>,
    parent: NodeHandle,
    /// The unmounted child, once the rendered type switched.
    replaced: Option<Box<Instance>>,
}

impl Checkpoint {
    fn unchanged(parent: NodeHandle) -> Self {
        Self {
            props: None,
            state: None,
            parent,
            replaced: None,
        }
    }
}

pub(crate) struct ClassInstance {
    ty: ClassType,
    /// Kept outside the cell so it can be read while the cell is borrowed.
    phase: Rc<Cell<Phase>>,
    cell: Rc<RefCell<ClassCell>>,
}

impl ClassInstance {
    pub(crate) fn new(ty: ClassType, props: Props, parent: NodeHandle) -> Self {
        let cell = ClassCell {
            ty,
            props,
            state: State::new(),
            parent,
            component: None,
            child: None,
            checkpoint: None,
        };
        Self {
            ty,
            phase: Rc::new(Cell::new(Phase::Created)),
            cell: Rc::new(RefCell::new(cell)),
        }
    }

    pub(crate) fn ty(&self) -> ClassType {
        self.ty
    }

    pub(crate) fn is_retired(&self) -> bool {
        self.phase.get() == Phase::Unmounted
    }

    fn borrow_mut(&self) -> Result<RefMut<'_, ClassCell>, ReconcileError> {
        self.cell.try_borrow_mut().map_err(|_| ReconcileError::Reentrant {
            component: self.ty.name(),
        })
    }

    fn unmounted(&self) -> ReconcileError {
        ReconcileError::Unmounted {
            component: self.ty.name(),
        }
    }

    pub(crate) fn output(&self) -> Result<Output, ReconcileError> {
        let cell = self.cell.try_borrow().map_err(|_| ReconcileError::Reentrant {
            component: self.ty.name(),
        })?;
        match &cell.child {
            Some(child) => child.output(),
            None => Err(self.unmounted()),
        }
    }

    /// Construct the component, run `component_will_mount`, render, and mount
    /// the rendered child under the same parent.
    pub(crate) fn mount(&mut self, pass: &mut RenderPass<'_>) -> Result<(), ReconcileError> {
        let updater = Updater {
            cell: Rc::downgrade(&self.cell),
            phase: Rc::downgrade(&self.phase),
            env: Rc::downgrade(pass.env),
            component: self.ty.name(),
        };
        let mut guard = self.borrow_mut()?;
        let cell = &mut *guard;

        let mut component = cell.ty.construct(&cell.props, updater);
        cell.state = component.initial_state();
        let cx = Context {
            props: &cell.props,
            state: &cell.state,
        };
        component.component_will_mount(&cx)?;
        let rendered = component.render(&cx)?;
        cell.component = Some(component);

        let mut child = instantiate(&rendered, cell.parent)?;
        child.mount(pass)?;
        cell.child = Some(Box::new(child));
        self.phase.set(Phase::Mounted);
        log::debug!(target: "reconciler.class", "mounted {}", self.ty.name());
        Ok(())
    }

    pub(crate) fn begin(&mut self, props: Props, parent: NodeHandle) -> Result<(), ReconcileError> {
        let mut guard = self.borrow_mut()?;
        let cell = &mut *guard;
        cell.checkpoint = Some(Checkpoint {
            props: Some(std::mem::replace(&mut cell.props, props)),
            parent: std::mem::replace(&mut cell.parent, parent),
            ..Checkpoint::unchanged(parent)
        });
        Ok(())
    }

    /// Re-render against current props and state.
    ///
    /// Same rendered type: `component_will_update`, then patch the child.
    /// Different type: unmount the old child, mount a new one.
    pub(crate) fn update(&mut self, pass: &mut RenderPass<'_>) -> Result<(), ReconcileError> {
        let unmounted = self.unmounted();
        let mut guard = self.borrow_mut()?;
        let cell = &mut *guard;
        let parent = cell.parent;
        let checkpoint = cell
            .checkpoint
            .get_or_insert_with(|| Checkpoint::unchanged(parent));
        let cx = Context {
            props: &cell.props,
            state: &cell.state,
        };
        let component = cell.component.as_mut().ok_or(unmounted)?;
        let next = component.render(&cx)?;

        let reusable = cell.child.as_mut().filter(|child| child.matches(&next));
        if let Some(child) = reusable {
            component.component_will_update(&cx)?;
            child.patch(&next, parent, pass)?;
            log::trace!(target: "reconciler.class", "patched {}", self.ty.name());
        } else {
            check_tags(&next)?;
            let mut fresh = instantiate(&next, parent)?;
            if let Some(old) = cell.child.take() {
                checkpoint.replaced.insert(old).unmount(pass.env)?;
            }
            fresh.mount(pass)?;
            log::debug!(
                target: "reconciler.class",
                "{} switched output to {}",
                self.ty.name(),
                next.type_name()
            );
            cell.child = Some(Box::new(fresh));
        }
        Ok(())
    }

    pub(crate) fn settle(&mut self) {
        let Ok(mut cell) = self.cell.try_borrow_mut() else {
            debug_assert!(false, "settling a busy component");
            return;
        };
        if cell.checkpoint.take().is_some() {
            if let Some(child) = cell.child.as_mut() {
                child.settle();
            }
        }
    }

    pub(crate) fn revert(&mut self, pass: &mut RenderPass<'_>) {
        let Ok(mut guard) = self.cell.try_borrow_mut() else {
            debug_assert!(false, "reverting a busy component");
            return;
        };
        let cell = &mut *guard;
        let Some(checkpoint) = cell.checkpoint.take() else {
            return;
        };
        match checkpoint.replaced {
            Some(old) => {
                if let Some(fresh) = cell.child.replace(old) {
                    abandon(*fresh, pass);
                }
            }
            None => {
                if let Some(child) = cell.child.as_mut() {
                    child.revert(pass);
                }
            }
        }
        if let Some(props) = checkpoint.props {
            cell.props = props;
        }
        if let Some(state) = checkpoint.state {
            cell.state = state;
        }
        cell.parent = checkpoint.parent;
        log::debug!(target: "reconciler.class", "reverted {}", self.ty.name());
    }

    /// `component_will_unmount`, then the rendered subtree.
    ///
    /// The phase flips first, so the component no longer reports itself
    /// mounted from inside the hook.
    pub(crate) fn unmount(&mut self, env: &Env) -> Result<(), ReconcileError> {
        let was_mounted = self.phase.replace(Phase::Unmounted) == Phase::Mounted;
        let mut guard = self.borrow_mut()?;
        let cell = &mut *guard;
        let hook = match cell.component.as_mut() {
            Some(component) if was_mounted => {
                let cx = Context {
                    props: &cell.props,
                    state: &cell.state,
                };
                component.component_will_unmount(&cx)
            }
            _ => Ok(()),
        };
        log::debug!(target: "reconciler.class", "unmounted {}", self.ty.name());
        let child = match &mut cell.child {
            Some(child) => child.unmount(env),
            None => Ok(()),
        };
        hook.and(child)
    }
}

/// Merge a partial state into `cell` and commit one synchronous re-render.
///
/// On failure the state merge is undone and the live output keeps showing
/// the last committed render.
pub(crate) fn set_state(
    cell: &Rc<RefCell<ClassCell>>,
    phase: &Rc<Cell<Phase>>,
    env: &Rc<Env>,
    component: &'static str,
    f: impl FnOnce(&State) -> State,
) -> Result<(), ReconcileError> {
    let reentrant = || ReconcileError::Reentrant { component };
    let mut output = env.output.try_borrow_mut().map_err(|_| reentrant())?;
    if phase.get() != Phase::Mounted {
        return Err(ReconcileError::Unmounted { component });
    }
    let (ty, parent, old) = {
        let mut guard = cell.try_borrow_mut().map_err(|_| reentrant())?;
        let old = match &guard.child {
            Some(child) => child.output()?,
            None => return Err(ReconcileError::Unmounted { component }),
        };
        let partial = f(&guard.state);
        let previous = guard.state.clone();
        guard.state.merge(partial);
        guard.checkpoint = Some(Checkpoint {
            state: Some(previous),
            ..Checkpoint::unchanged(guard.parent)
        });
        (guard.ty, guard.parent, old)
    };

    let mut pass = RenderPass::new(&mut *output, env);
    let mut instance = Instance::Class(ClassInstance {
        ty,
        phase: phase.clone(),
        cell: cell.clone(),
    });
    let committed = instance.update(&mut pass).and_then(|()| {
        let new = instance.output()?;
        commit(pass.out, parent, &old, &new)
    });
    if let Err(err) = committed {
        instance.revert(&mut pass);
        log::debug!(target: "reconciler.class", "set_state on {component} rolled back: {err}");
        return Err(err);
    }
    instance.settle();
    env.bump(|s| s.commits += 1);
    log::debug!(target: "reconciler.class", "set_state on {component} committed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::RenderResult;
    use crate::element::Element;
    use crate::root::RenderConfig;
    use dom::Document;

    struct Echo;

    impl Component for Echo {
        fn create(_: &Props, _: Updater) -> Self {
            Echo
        }

        fn initial_state(&self) -> State {
            State::new().with("n", 0)
        }

        fn render(&self, cx: &Context<'_>) -> RenderResult {
            let n = cx.state().get_int("n").unwrap_or_default();
            if n == 13 {
                return Err(ReconcileError::raised("unlucky"));
            }
            Ok(Element::host("p", Props::new(), [Element::text(n.to_string())]))
        }
    }

    #[test]
    fn set_state_outside_a_mount_is_unmounted() {
        let doc = Rc::new(RefCell::new(Document::new()));
        let env = Rc::new(Env {
            output: doc.clone(),
            config: RenderConfig::default(),
            stats: Cell::new(Default::default()),
        });
        let root: NodeHandle = doc.borrow().root().into();
        let instance = ClassInstance::new(ClassType::of::<Echo>(), Props::new(), root);
        let err = set_state(&instance.cell, &instance.phase, &env, "Echo", |_| State::new())
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Unmounted { component: "Echo" }));
    }

    #[test]
    fn set_state_is_rejected_while_output_is_busy() {
        let doc = Rc::new(RefCell::new(Document::new()));
        let env = Rc::new(Env {
            output: doc.clone(),
            config: RenderConfig::default(),
            stats: Cell::new(Default::default()),
        });
        let root: NodeHandle = doc.borrow().root().into();
        let mut instance = ClassInstance::new(ClassType::of::<Echo>(), Props::new(), root);
        {
            let mut guard = doc.borrow_mut();
            let mut pass = RenderPass::new(&mut *guard, &env);
            instance.mount(&mut pass).unwrap();
            let out = instance.output().unwrap();
            pass.out.append_output(root, &out).unwrap();
        }

        let busy = doc.borrow_mut();
        let err = set_state(&instance.cell, &instance.phase, &env, "Echo", |_| {
            State::new().with("n", 5)
        })
        .unwrap_err();
        assert!(matches!(err, ReconcileError::Reentrant { .. }));
        drop(busy);
        assert_eq!(instance.cell.borrow().state.get_int("n"), Some(0));

        set_state(&instance.cell, &instance.phase, &env, "Echo", |s| {
            State::new().with("n", s.get_int("n").unwrap_or_default() + 1)
        })
        .unwrap();
        assert_eq!(doc.borrow().inner_html(doc.borrow().root()), "<p>1</p>");
    }

    #[test]
    fn failed_set_state_restores_state_and_output() {
        let doc = Rc::new(RefCell::new(Document::new()));
        let env = Rc::new(Env {
            output: doc.clone(),
            config: RenderConfig::default(),
            stats: Cell::new(Default::default()),
        });
        let root: NodeHandle = doc.borrow().root().into();
        let mut instance = ClassInstance::new(ClassType::of::<Echo>(), Props::new(), root);
        {
            let mut guard = doc.borrow_mut();
            let mut pass = RenderPass::new(&mut *guard, &env);
            instance.mount(&mut pass).unwrap();
            let out = instance.output().unwrap();
            pass.out.append_output(root, &out).unwrap();
        }
        let live = doc.borrow().live_count();

        let err = set_state(&instance.cell, &instance.phase, &env, "Echo", |_| {
            State::new().with("n", 13)
        })
        .unwrap_err();
        assert!(err.to_string().contains("unlucky"));
        assert_eq!(instance.cell.borrow().state.get_int("n"), Some(0));
        assert!(instance.cell.borrow().checkpoint.is_none());
        assert_eq!(doc.borrow().live_count(), live);

        set_state(&instance.cell, &instance.phase, &env, "Echo", |s| {
            State::new().with("n", s.get_int("n").unwrap_or_default() + 2)
        })
        .unwrap();
        assert_eq!(doc.borrow().inner_html(doc.borrow().root()), "<p>2</p>");
        assert_eq!(doc.borrow().live_count(), live);
    }
}
