use super::{Env, Instance, RenderPass, abandon, check_tags, instantiate};
use crate::adapter::{NodeHandle, Output};
use crate::element::FunctionType;
use crate::error::ReconcileError;
use crate::props::Props;

/// A stateless component. Every update remounts its rendered child from
/// scratch.
pub(crate) struct FunctionInstance {
    ty: FunctionType,
    props: Props,
    parent: NodeHandle,
    child: Option<Box<Instance>>,
    retired: bool,
    checkpoint: Option<Checkpoint>,
}

struct Checkpoint {
    props: Option<Props>,
    parent: NodeHandle,
    /// The unmounted child, once the new one is being mounted.
    replaced: Option<Box<Instance>>,
}

impl FunctionInstance {
    pub(crate) fn new(ty: FunctionType, props: Props, parent: NodeHandle) -> Self {
        Self {
            ty,
            props,
            parent,
            child: None,
            retired: false,
            checkpoint: None,
        }
    }

    pub(crate) fn ty(&self) -> &FunctionType {
        &self.ty
    }

    pub(crate) fn is_retired(&self) -> bool {
        self.retired
    }

    pub(crate) fn output(&self) -> Result<Output, ReconcileError> {
        match &self.child {
            Some(child) => child.output(),
            None => Err(ReconcileError::Unmounted {
                component: self.ty.name(),
            }),
        }
    }

    pub(crate) fn mount(&mut self, pass: &mut RenderPass<'_>) -> Result<(), ReconcileError> {
        let rendered = self.ty.call(&self.props)?;
        let mut child = instantiate(&rendered, self.parent)?;
        child.mount(pass)?;
        log::trace!(target: "reconciler.function", "mounted {}", self.ty.name());
        self.child = Some(Box::new(child));
        Ok(())
    }

    pub(crate) fn begin(&mut self, props: Props, parent: NodeHandle) {
        self.checkpoint = Some(Checkpoint {
            props: Some(std::mem::replace(&mut self.props, props)),
            parent: std::mem::replace(&mut self.parent, parent),
            replaced: None,
        });
    }

    pub(crate) fn update(&mut self, pass: &mut RenderPass<'_>) -> Result<(), ReconcileError> {
        let rendered = self.ty.call(&self.props)?;
        check_tags(&rendered)?;
        let mut child = instantiate(&rendered, self.parent)?;
        let parent = self.parent;
        let checkpoint = self.checkpoint.get_or_insert_with(|| Checkpoint {
            props: None,
            parent,
            replaced: None,
        });
        if let Some(old) = self.child.take() {
            checkpoint.replaced.insert(old).unmount(pass.env)?;
        }
        child.mount(pass)?;
        log::trace!(target: "reconciler.function", "remounted {}", self.ty.name());
        self.child = Some(Box::new(child));
        Ok(())
    }

    pub(crate) fn settle(&mut self) {
        self.checkpoint = None;
    }

    pub(crate) fn revert(&mut self, pass: &mut RenderPass<'_>) {
        let Some(checkpoint) = self.checkpoint.take() else {
            return;
        };
        if let Some(old) = checkpoint.replaced {
            if let Some(fresh) = self.child.replace(old) {
                abandon(*fresh, pass);
            }
        }
        if let Some(props) = checkpoint.props {
            self.props = props;
        }
        self.parent = checkpoint.parent;
    }

    pub(crate) fn unmount(&mut self, env: &Env) -> Result<(), ReconcileError> {
        self.retired = true;
        match &mut self.child {
            Some(child) => child.unmount(env),
            None => Ok(()),
        }
    }
}
