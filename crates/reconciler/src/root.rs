//! Render roots: the public entry into the reconciler.

use crate::adapter::{NodeHandle, Output, OutputAdapter};
use crate::element::Element;
use crate::error::ReconcileError;
use crate::instance::{Env, Instance, RenderPass, abandon, check_tags, commit, instantiate};
use crate::stats::RenderStats;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Maximum instance nesting in one pass before `DepthExceeded`.
    pub max_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { max_depth: 512 }
    }
}

struct Root {
    element: Element,
    instance: Instance,
}

/// Mounts element trees into containers of one output backend and keeps them
/// up to date.
///
/// The first `render` into a container mounts. Later calls with an element of
/// the same type update the existing root in place, so component state below
/// it survives; a different type unmounts the old tree and mounts a new one.
pub struct Renderer {
    env: Rc<Env>,
    roots: HashMap<NodeHandle, Root>,
}

impl Renderer {
    pub fn new<O: OutputAdapter + 'static>(output: Rc<RefCell<O>>) -> Self {
        Self::with_config(output, RenderConfig::default())
    }

    pub fn with_config<O: OutputAdapter + 'static>(
        output: Rc<RefCell<O>>,
        config: RenderConfig,
    ) -> Self {
        let output: Rc<RefCell<dyn OutputAdapter>> = output;
        Self {
            env: Rc::new(Env {
                output,
                config,
                stats: Cell::new(RenderStats::default()),
            }),
            roots: HashMap::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.env.config
    }

    pub fn stats(&self) -> RenderStats {
        self.env.stats.get()
    }

    pub fn has_root(&self, container: impl Into<NodeHandle>) -> bool {
        self.roots.contains_key(&container.into())
    }

    /// Render `element` into `container`.
    ///
    /// The live tree only changes after the new subtree is fully built. On
    /// error it still shows the previous render, the instances behind it are
    /// restored, and every node built for the failed pass is discarded.
    pub fn render(
        &mut self,
        element: Element,
        container: impl Into<NodeHandle>,
    ) -> Result<(), ReconcileError> {
        let container = container.into();
        let env = Rc::clone(&self.env);
        let mut output = env
            .output
            .try_borrow_mut()
            .map_err(|_| ReconcileError::Reentrant {
                component: "renderer",
            })?;
        let mut pass = RenderPass::new(&mut *output, &env);

        match self.roots.get_mut(&container) {
            None => {
                let mut instance = instantiate(&element, container)?;
                instance.mount(&mut pass)?;
                let attached = instance
                    .output()
                    .and_then(|output| Ok(pass.out.append_output(container, &output)?));
                if let Err(err) = attached {
                    abandon(instance, &mut pass);
                    return Err(err);
                }
                log::debug!(
                    target: "reconciler.root",
                    "mounted {} into {container:?}",
                    element.type_name()
                );
                self.roots.insert(container, Root { element, instance });
            }
            Some(root) if root.instance.matches(&element) => {
                let old = root.instance.output()?;
                let patched =
                    patch_and_commit(&mut root.instance, &element, container, &old, &mut pass);
                if let Err(err) = patched {
                    root.instance.revert(&mut pass);
                    log::debug!(target: "reconciler.root", "rolled back {container:?}: {err}");
                    return Err(err);
                }
                root.instance.settle();
                log::debug!(
                    target: "reconciler.root",
                    "updated {} in {container:?}",
                    element.type_name()
                );
                root.element = element;
            }
            Some(root) => {
                let old = root.instance.output()?;
                check_tags(&element)?;
                let mut fresh = instantiate(&element, container)?;
                root.instance.unmount(&env)?;
                fresh.mount(&mut pass)?;
                let committed = fresh
                    .output()
                    .and_then(|new| commit(pass.out, container, &old, &new));
                if let Err(err) = committed {
                    abandon(fresh, &mut pass);
                    return Err(err);
                }
                log::debug!(
                    target: "reconciler.root",
                    "replaced {} with {} in {container:?}",
                    root.element.type_name(),
                    element.type_name()
                );
                *root = Root {
                    element,
                    instance: fresh,
                };
            }
        }
        env.bump(|s| s.commits += 1);
        #[cfg(feature = "debug-stats")]
        log::debug!(target: "reconciler.root", "stats: {:?}", env.stats.get());
        Ok(())
    }

    /// Unmount whatever was rendered into `container` and remove its node.
    ///
    /// Returns `Ok(false)` when nothing was rendered there.
    pub fn unmount_at(&mut self, container: impl Into<NodeHandle>) -> Result<bool, ReconcileError> {
        let container = container.into();
        let Some(root) = self.roots.get_mut(&container) else {
            return Ok(false);
        };
        let mut output = self
            .env
            .output
            .try_borrow_mut()
            .map_err(|_| ReconcileError::Reentrant {
                component: "renderer",
            })?;
        let node = root
            .instance
            .output()?
            .node()
            .ok_or(ReconcileError::UnaddressableText)?;
        root.instance.unmount(&self.env)?;
        output.remove_child(container, node)?;
        drop(output);
        self.roots.remove(&container);
        log::debug!(target: "reconciler.root", "unmounted root of {container:?}");
        Ok(true)
    }
}

fn patch_and_commit(
    instance: &mut Instance,
    element: &Element,
    container: NodeHandle,
    old: &Output,
    pass: &mut RenderPass<'_>,
) -> Result<(), ReconcileError> {
    instance.patch(element, container, pass)?;
    commit(pass.out, container, old, &instance.output()?)
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("roots", &self.roots.len())
            .field("config", &self.env.config)
            .field("stats", &self.env.stats.get())
            .finish()
    }
}
