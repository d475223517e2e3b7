//! Runtime instances: one per rendered element position.
//!
//! Every instance kind builds its output into fresh, detached nodes. Nothing
//! here touches the live tree except [`commit`], which the renderer root and
//! `set_state` call once the whole subtree has been rebuilt.
//!
//! A patched instance keeps a checkpoint of what it replaced until the pass
//! ends. The committing caller then either [settles](Instance::settle) the
//! subtree or [reverts](Instance::revert) it, in which case every instance
//! points at the still-live output again and every node built by the pass is
//! discarded.

pub(crate) mod class;
mod function;
mod host;
mod text;

use crate::adapter::{NodeHandle, Output, OutputAdapter};
use crate::element::{Element, ElementType};
use crate::error::ReconcileError;
use crate::root::RenderConfig;
use crate::stats::RenderStats;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub(crate) use class::ClassInstance;
pub(crate) use function::FunctionInstance;
pub(crate) use host::HostInstance;
pub(crate) use text::TextInstance;

/// Shared by every instance of one renderer.
pub(crate) struct Env {
    pub(crate) output: Rc<RefCell<dyn OutputAdapter>>,
    pub(crate) config: RenderConfig,
    pub(crate) stats: Cell<RenderStats>,
}

impl Env {
    pub(crate) fn bump(&self, f: impl FnOnce(&mut RenderStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

/// One synchronous render pass: exclusive access to the output plus the
/// nesting depth guard.
pub(crate) struct RenderPass<'a> {
    pub(crate) out: &'a mut dyn OutputAdapter,
    pub(crate) env: &'a Rc<Env>,
    depth: usize,
}

impl<'a> RenderPass<'a> {
    pub(crate) fn new(out: &'a mut dyn OutputAdapter, env: &'a Rc<Env>) -> Self {
        Self { out, env, depth: 0 }
    }

    fn enter(&mut self) -> Result<(), ReconcileError> {
        let limit = self.env.config.max_depth;
        if self.depth >= limit {
            return Err(ReconcileError::DepthExceeded { limit });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

pub(crate) enum Instance {
    Text(TextInstance),
    Host(HostInstance),
    Function(FunctionInstance),
    Class(ClassInstance),
}

/// Classify `element` into an unmounted instance under `parent`.
pub(crate) fn instantiate(element: &Element, parent: NodeHandle) -> Result<Instance, ReconcileError> {
    let instance = match element {
        Element::Text(text) => Instance::Text(TextInstance::new(text.clone())),
        Element::Node { ty, props } => match ty {
            ElementType::Tag(tag) => {
                if !is_valid_tag(tag) {
                    return Err(ReconcileError::InvalidTag(tag.to_string()));
                }
                Instance::Host(HostInstance::new(tag.clone(), props.clone(), parent))
            }
            ElementType::Function(f) => {
                Instance::Function(FunctionInstance::new(f.clone(), props.clone(), parent))
            }
            ElementType::Class(c) => Instance::Class(ClassInstance::new(*c, props.clone(), parent)),
        },
    };
    log::trace!(
        target: "reconciler.dispatch",
        "instantiate {} under {parent:?}",
        element.type_name()
    );
    Ok(instance)
}

/// Reject bad tags anywhere in `element`'s host subtree before an old
/// instance is torn down for it.
///
/// Component children are not looked at: they only become output if the
/// component renders them.
pub(crate) fn check_tags(element: &Element) -> Result<(), ReconcileError> {
    let mut stack = vec![element];
    while let Some(element) = stack.pop() {
        check_tag(element)?;
        if let Element::Node {
            ty: ElementType::Tag(_),
            props,
        } = element
        {
            stack.extend(props.children());
        }
    }
    Ok(())
}

/// [`check_tags`] for `element` alone.
pub(crate) fn check_tag(element: &Element) -> Result<(), ReconcileError> {
    match element {
        Element::Node {
            ty: ElementType::Tag(tag),
            ..
        } if !is_valid_tag(tag) => Err(ReconcileError::InvalidTag(tag.to_string())),
        _ => Ok(()),
    }
}

/// Unmount an instance mounted during a pass that is being rolled back and
/// discard its node. Errors are logged; the pass is already failing.
pub(crate) fn abandon(mut instance: Instance, pass: &mut RenderPass<'_>) {
    let node = instance.output().ok().and_then(|output| output.node());
    if let Err(err) = instance.unmount(pass.env) {
        log::warn!(target: "reconciler.dispatch", "unmount during rollback failed: {err}");
    }
    if let Some(node) = node {
        discard(pass, node);
    }
}

pub(crate) fn discard(pass: &mut RenderPass<'_>, node: NodeHandle) {
    if let Err(err) = pass.out.discard(node) {
        log::warn!(target: "reconciler.dispatch", "could not discard {node:?}: {err}");
    }
}

fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl Instance {
    /// Mount a freshly instantiated subtree.
    ///
    /// On error nothing is left behind: instances already mounted below this
    /// point are unmounted again and every node built is discarded.
    pub(crate) fn mount(&mut self, pass: &mut RenderPass<'_>) -> Result<(), ReconcileError> {
        pass.enter()?;
        let result = match self {
            Instance::Text(_) => Ok(()),
            Instance::Host(host) => host.mount(pass),
            Instance::Function(function) => function.mount(pass),
            Instance::Class(class) => class.mount(pass),
        };
        pass.leave();
        if result.is_ok() {
            pass.env.bump(|s| s.mounts += 1);
        }
        result
    }

    /// Take over `element` under `parent` and re-render.
    ///
    /// Callers only pass elements this instance [matches](Instance::matches),
    /// and must follow up with [`Instance::settle`] or [`Instance::revert`].
    pub(crate) fn patch(
        &mut self,
        element: &Element,
        parent: NodeHandle,
        pass: &mut RenderPass<'_>,
    ) -> Result<(), ReconcileError> {
        match (&mut *self, element) {
            (Instance::Text(text), Element::Text(next)) => text.begin(next.clone()),
            (Instance::Host(host), Element::Node { props, .. }) => host.begin(props.clone(), parent),
            (Instance::Function(function), Element::Node { props, .. }) => {
                function.begin(props.clone(), parent)
            }
            (Instance::Class(class), Element::Node { props, .. }) => {
                class.begin(props.clone(), parent)?
            }
            _ => {
                debug_assert!(false, "patch with an element of another kind");
            }
        }
        self.update(pass)
    }

    /// Re-render against current props (and state).
    pub(crate) fn update(&mut self, pass: &mut RenderPass<'_>) -> Result<(), ReconcileError> {
        pass.enter()?;
        let result = match self {
            Instance::Text(_) => Ok(()),
            Instance::Host(host) => host.update(pass),
            Instance::Function(function) => function.update(pass),
            Instance::Class(class) => class.update(pass),
        };
        pass.leave();
        if result.is_ok() {
            pass.env.bump(|s| s.updates += 1);
        }
        result
    }

    /// The pass committed: drop checkpoints, and with them the instances
    /// that were replaced.
    pub(crate) fn settle(&mut self) {
        match self {
            Instance::Text(text) => text.settle(),
            Instance::Host(host) => host.settle(),
            Instance::Function(function) => function.settle(),
            Instance::Class(class) => class.settle(),
        }
    }

    /// The pass failed: restore this subtree to its last committed shape.
    ///
    /// Instances mounted by the pass are unmounted and their nodes discarded.
    /// Instances it replaced come back, but ones whose unmount hooks already
    /// ran stay retired and are replaced on the next pass.
    pub(crate) fn revert(&mut self, pass: &mut RenderPass<'_>) {
        match self {
            Instance::Text(text) => text.revert(),
            Instance::Host(host) => host.revert(pass),
            Instance::Function(function) => function.revert(pass),
            Instance::Class(class) => class.revert(pass),
        }
    }

    /// Fire unmount hooks for this subtree, parents before children.
    ///
    /// Output nodes are left alone; the caller detaches or replaces them.
    /// Unmounting twice is a no-op.
    pub(crate) fn unmount(&mut self, env: &Env) -> Result<(), ReconcileError> {
        if self.is_retired() {
            return Ok(());
        }
        match self {
            Instance::Text(_) => {}
            Instance::Host(host) => host.unmount(env)?,
            Instance::Function(function) => function.unmount(env)?,
            Instance::Class(class) => class.unmount(env)?,
        }
        env.bump(|s| s.unmounts += 1);
        Ok(())
    }

    /// Current contribution to the parent's content.
    pub(crate) fn output(&self) -> Result<Output, ReconcileError> {
        match self {
            Instance::Text(text) => Ok(text.output()),
            Instance::Host(host) => host.output(),
            Instance::Function(function) => function.output(),
            Instance::Class(class) => class.output(),
        }
    }

    fn is_retired(&self) -> bool {
        match self {
            Instance::Text(_) => false,
            Instance::Host(host) => host.is_retired(),
            Instance::Function(function) => function.is_retired(),
            Instance::Class(class) => class.is_retired(),
        }
    }

    /// Whether `element` can be patched into this instance.
    pub(crate) fn matches(&self, element: &Element) -> bool {
        let same_type = match (self, element) {
            (Instance::Text(_), Element::Text(_)) => true,
            (Instance::Host(host), Element::Node { ty: ElementType::Tag(tag), .. }) => {
                host.tag() == tag.as_ref()
            }
            (Instance::Function(function), Element::Node { ty: ElementType::Function(f), .. }) => {
                function.ty() == f
            }
            (Instance::Class(class), Element::Node { ty: ElementType::Class(c), .. }) => {
                class.ty() == *c
            }
            _ => false,
        };
        same_type && !self.is_retired()
    }
}

/// Swap the freshly built `new` output in for `old` under `parent`.
pub(crate) fn commit(
    out: &mut dyn OutputAdapter,
    parent: NodeHandle,
    old: &Output,
    new: &Output,
) -> Result<(), ReconcileError> {
    match (old, new) {
        (Output::Node(old), Output::Node(new)) => {
            if old != new {
                out.replace_child(parent, *new, *old)?;
            }
            log::debug!(target: "reconciler.root", "commit {new:?} over {old:?} under {parent:?}");
            Ok(())
        }
        _ => Err(ReconcileError::UnaddressableText),
    }
}
