use std::rc::Rc;

use imperative_core::{ActivationSlot, ContainerId, MountAdapter, Result as CoreResult, Unmount};

use crate::document::MemoryDocument;
use crate::state::{MutableState, RenderScope};
use crate::view::View;

/// The tree a [`ViewAdapter`] mounts: a render function re-run on every
/// state change it observed.
pub type ViewTree = Box<dyn Fn() -> View>;

/// Mounts view trees into a [`MemoryDocument`].
#[derive(Clone)]
pub struct ViewAdapter {
    document: Rc<MemoryDocument>,
}

impl ViewAdapter {
    pub fn new(document: Rc<MemoryDocument>) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Rc<MemoryDocument> {
        &self.document
    }
}

impl MountAdapter for ViewAdapter {
    type Tree = ViewTree;

    fn mount(
        &self,
        container: ContainerId,
        activation: ActivationSlot,
        tree: ViewTree,
    ) -> CoreResult<Unmount> {
        let scope = RenderScope::from_render(Rc::clone(&self.document), container, Rc::from(tree));
        let active = MutableState::new(true);
        activation.install(Rc::new(active.clone()));
        scope.remember(Rc::new(active));

        if let Err(err) = scope.render_now() {
            scope.dispose();
            return Err(err);
        }
        log::trace!("view mounted into container {container}");
        Ok(Unmount::new(move || scope.dispose()))
    }
}
