use super::{Env, Instance, RenderPass, abandon, check_tag, check_tags, discard, instantiate};
use crate::adapter::{NodeHandle, Output};
use crate::element::Element;
use crate::error::ReconcileError;
use crate::props::{self, Props};
use std::sync::Arc;

/// An output tag such as `div`, with one child instance per child element.
pub(crate) struct HostInstance {
    tag: Arc<str>,
    props: Props,
    parent: NodeHandle,
    node: Option<NodeHandle>,
    children: Vec<Instance>,
    retired: bool,
    checkpoint: Option<Checkpoint>,
}

/// What an in-flight update replaced.
struct Checkpoint {
    props: Option<Props>,
    parent: NodeHandle,
    node: Option<NodeHandle>,
    /// One entry per old child, by position.
    previous: Vec<Previous>,
}

enum Previous {
    /// Not reached yet.
    Pending(Instance),
    /// Now at the same index in `children`, patched in place.
    Patched,
    /// Unmounted; whatever sits at the same index in `children` is new.
    Replaced(Instance),
}

impl Previous {
    fn pending(&self) -> Option<&Instance> {
        match self {
            Previous::Pending(instance) => Some(instance),
            _ => None,
        }
    }

    fn take(&mut self) -> Option<Instance> {
        match std::mem::replace(self, Previous::Patched) {
            Previous::Pending(instance) => Some(instance),
            other => {
                *self = other;
                None
            }
        }
    }

    /// Move a pending instance to `Replaced` and run its unmount hooks.
    fn retire(&mut self, env: &Env) -> Result<(), ReconcileError> {
        if let Some(instance) = self.take() {
            *self = Previous::Replaced(instance);
        }
        match self {
            Previous::Replaced(instance) => instance.unmount(env),
            _ => Ok(()),
        }
    }
}

impl HostInstance {
    pub(crate) fn new(tag: Arc<str>, props: Props, parent: NodeHandle) -> Self {
        Self {
            tag,
            props,
            parent,
            node: None,
            children: Vec::new(),
            retired: false,
            checkpoint: None,
        }
    }

    pub(crate) fn tag(&self) -> &str {
        &self.tag
    }

    pub(crate) fn is_retired(&self) -> bool {
        self.retired
    }

    pub(crate) fn output(&self) -> Result<Output, ReconcileError> {
        self.node.map(Output::Node).ok_or(ReconcileError::Unmounted {
            component: "host element",
        })
    }

    fn create(&self, pass: &mut RenderPass<'_>) -> Result<NodeHandle, ReconcileError> {
        let node = pass.out.create_node(&self.tag)?;
        if let Err(err) = props::apply(pass.out, node, &self.props) {
            discard(pass, node);
            return Err(err);
        }
        Ok(node)
    }

    pub(crate) fn mount(&mut self, pass: &mut RenderPass<'_>) -> Result<(), ReconcileError> {
        let node = self.create(pass)?;
        let mut children = Vec::with_capacity(self.props.children().len());
        if let Err(err) = mount_children(node, self.props.children(), &mut children, pass) {
            for child in children {
                abandon(child, pass);
            }
            discard(pass, node);
            return Err(err);
        }
        log::trace!(
            target: "reconciler.host",
            "mounted <{}> as {node:?} under {:?} with {} children",
            self.tag,
            self.parent,
            children.len()
        );
        self.node = Some(node);
        self.children = children;
        Ok(())
    }

    pub(crate) fn begin(&mut self, props: Props, parent: NodeHandle) {
        debug_assert!(self.checkpoint.is_none(), "<{}> patched twice in one pass", self.tag);
        self.checkpoint = Some(Checkpoint {
            props: Some(std::mem::replace(&mut self.props, props)),
            parent: std::mem::replace(&mut self.parent, parent),
            node: self.node,
            previous: pending(std::mem::take(&mut self.children)),
        });
    }

    /// Rebuild into a fresh node, walking old child instances and new child
    /// elements position by position.
    pub(crate) fn update(&mut self, pass: &mut RenderPass<'_>) -> Result<(), ReconcileError> {
        self.props.children().iter().try_for_each(check_tag)?;
        let (parent, old_node) = (self.parent, self.node);
        let node = self.create(pass)?;
        self.node = Some(node);
        let checkpoint = self.checkpoint.get_or_insert_with(|| Checkpoint {
            props: None,
            parent,
            node: old_node,
            previous: pending(std::mem::take(&mut self.children)),
        });
        let previous = &mut checkpoint.previous;
        let children = &mut self.children;
        let next = self.props.children();
        let (mut reused, mut replaced) = (0usize, 0usize);

        for (i, element) in next.iter().enumerate() {
            let fresh = match previous.get_mut(i) {
                Some(entry) if entry.pending().is_some_and(|prev| prev.matches(element)) => {
                    children.extend(entry.take());
                    None
                }
                entry => {
                    check_tags(element)?;
                    let fresh = instantiate(element, node)?;
                    if let Some(entry) = entry {
                        entry.retire(pass.env)?;
                        replaced += 1;
                    }
                    Some(fresh)
                }
            };
            match fresh {
                Some(mut fresh) => {
                    fresh.mount(pass)?;
                    children.push(fresh);
                }
                None => {
                    if let Some(child) = children.last_mut() {
                        child.patch(element, node, pass)?;
                        reused += 1;
                    }
                }
            }
            if let Some(child) = children.last() {
                pass.out.append_output(node, &child.output()?)?;
            }
        }

        let mut removed = 0usize;
        for entry in previous.iter_mut().skip(next.len()) {
            entry.retire(pass.env)?;
            removed += 1;
        }

        log::trace!(
            target: "reconciler.host",
            "updated <{}> into {node:?}: {} -> {} children, {reused} reused, {replaced} replaced, {removed} removed",
            self.tag,
            previous.len(),
            children.len()
        );
        Ok(())
    }

    pub(crate) fn settle(&mut self) {
        if self.checkpoint.take().is_some() {
            for child in &mut self.children {
                child.settle();
            }
        }
    }

    pub(crate) fn revert(&mut self, pass: &mut RenderPass<'_>) {
        let Some(checkpoint) = self.checkpoint.take() else {
            return;
        };
        // `children[i]` pairs with `previous[i]` up to where the walk stopped.
        let mut current = std::mem::take(&mut self.children).into_iter();
        let mut restored = Vec::with_capacity(checkpoint.previous.len());
        for entry in checkpoint.previous {
            match entry {
                Previous::Pending(prev) => restored.push(prev),
                Previous::Patched => {
                    if let Some(mut child) = current.next() {
                        child.revert(pass);
                        restored.push(child);
                    }
                }
                Previous::Replaced(prev) => {
                    if let Some(fresh) = current.next() {
                        abandon(fresh, pass);
                    }
                    restored.push(prev);
                }
            }
        }
        for fresh in current {
            abandon(fresh, pass);
        }
        if let Some(node) = self.node.filter(|node| Some(*node) != checkpoint.node) {
            discard(pass, node);
        }
        log::trace!(
            target: "reconciler.host",
            "reverted <{}> to {:?}",
            self.tag,
            checkpoint.node
        );
        if let Some(props) = checkpoint.props {
            self.props = props;
        }
        self.parent = checkpoint.parent;
        self.node = checkpoint.node;
        self.children = restored;
    }

    pub(crate) fn unmount(&mut self, env: &Env) -> Result<(), ReconcileError> {
        self.retired = true;
        for child in &mut self.children {
            child.unmount(env)?;
        }
        Ok(())
    }
}

fn pending(children: Vec<Instance>) -> Vec<Previous> {
    children.into_iter().map(Previous::Pending).collect()
}

fn mount_children(
    node: NodeHandle,
    elements: &[Element],
    children: &mut Vec<Instance>,
    pass: &mut RenderPass<'_>,
) -> Result<(), ReconcileError> {
    for element in elements {
        let mut child = instantiate(element, node)?;
        child.mount(pass)?;
        children.push(child);
        if let Some(child) = children.last() {
            pass.out.append_output(node, &child.output()?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Env, RenderPass};
    use crate::root::RenderConfig;
    use dom::{Document, NodeKey};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn env(doc: &Rc<RefCell<Document>>) -> Rc<Env> {
        Rc::new(Env {
            output: doc.clone(),
            config: RenderConfig::default(),
            stats: Cell::new(Default::default()),
        })
    }

    fn key(handle: NodeHandle) -> NodeKey {
        NodeKey(u32::try_from(handle.0).unwrap())
    }

    fn item(text: &str) -> Element {
        Element::host("li", Props::new(), [Element::text(text)])
    }

    #[test]
    fn update_builds_a_detached_replacement() {
        let doc = Rc::new(RefCell::new(Document::new()));
        let env = env(&doc);
        let root: NodeHandle = doc.borrow().root().into();
        let mut host = HostInstance::new(
            Arc::from("ul"),
            Props::new().with_children([
                Element::host("li", Props::new(), [Element::text("a")]),
                Element::text("tail"),
            ]),
            root,
        );

        let mut guard = doc.borrow_mut();
        let mut pass = RenderPass::new(&mut *guard, &env);
        host.mount(&mut pass).unwrap();
        let first = host.node.unwrap();
        assert_eq!(host.children.len(), 2);

        host.begin(
            Props::new().with_children([
                Element::host("li", Props::new(), [Element::text("b")]),
                Element::host("li", Props::new(), []),
            ]),
            root,
        );
        host.update(&mut pass).unwrap();
        host.settle();
        let second = host.node.unwrap();
        drop(pass);

        assert_ne!(first, second);
        assert!(host.checkpoint.is_none());
        assert_eq!(guard.parent(key(second)), None);
        assert_eq!(guard.outer_html(key(second)), "<ul><li>b</li><li></li></ul>");
        assert_eq!(host.children.len(), 2);
    }

    #[test]
    fn revert_restores_children_and_discards_the_build() {
        let doc = Rc::new(RefCell::new(Document::new()));
        let env = env(&doc);
        let root: NodeHandle = doc.borrow().root().into();
        let mut host = HostInstance::new(
            Arc::from("ul"),
            Props::new().with_children([item("a"), item("b")]),
            root,
        );

        let mut guard = doc.borrow_mut();
        let mut pass = RenderPass::new(&mut *guard, &env);
        host.mount(&mut pass).unwrap();
        let first = host.node.unwrap();
        pass.out.append_child(root, first).unwrap();

        host.begin(
            Props::new().with_children([
                item("c"),
                Element::host("li", Props::new(), [Element::host("bad tag", Props::new(), [])]),
            ]),
            root,
        );
        assert!(host.update(&mut pass).is_err());
        host.revert(&mut pass);
        drop(pass);

        assert_eq!(host.node, Some(first));
        assert_eq!(host.children.len(), 2);
        assert!(host.children.iter().all(|child| child.output().is_ok() && !child.is_retired()));
        assert_eq!(guard.live_count(), 1 + 1 + 2 * 2);
        assert_eq!(guard.inner_html(guard.root()), "<ul><li>a</li><li>b</li></ul>");
    }
}
