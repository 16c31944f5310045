//! Contracts the core consumes from the host: a document to place
//! containers in, and a mount adapter that renders into them.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::Result;

/// Identifier of a container node inside a [`Document`].
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ContainerId(u64);

impl ContainerId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The host document: creates containers and places them in the tree.
pub trait Document {
    /// Default mount point.
    fn body(&self) -> ContainerId;

    fn create_container(&self) -> ContainerId;

    fn attach(&self, parent: ContainerId, container: ContainerId) -> Result<()>;

    /// Removes `container` from its parent. Detaching a container that is
    /// not attached is a no-op.
    fn detach(&self, container: ContainerId) -> Result<()>;

    /// Detaches `container` and forgets it; the id is not valid afterwards.
    fn release(&self, container: ContainerId) -> Result<()> {
        self.detach(container)
    }
}

/// Activation flag owned by a mounted tree. Writing it must re-render the
/// tree that owns it.
pub trait ActivationState {
    fn is_active(&self) -> bool;
    fn set_active(&self, active: bool);
}

pub(crate) type ActivationCell = Rc<RefCell<Option<Rc<dyn ActivationState>>>>;

/// Handed to a [`MountAdapter`] so it can install the tree-owned activation
/// state into the controller before the first render.
#[derive(Clone)]
pub struct ActivationSlot {
    cell: ActivationCell,
}

impl ActivationSlot {
    pub(crate) fn new(cell: ActivationCell) -> Self {
        Self { cell }
    }

    pub fn install(&self, state: Rc<dyn ActivationState>) {
        *self.cell.borrow_mut() = Some(state);
    }

    pub fn is_installed(&self) -> bool {
        self.cell.borrow().is_some()
    }
}

impl fmt::Debug for ActivationSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivationSlot")
            .field("installed", &self.is_installed())
            .finish()
    }
}

/// Tears a mounted tree down. Calling it more than once must be harmless.
pub struct Unmount(Box<dyn FnMut() + 'static>);

impl Unmount {
    pub fn new(unmount: impl FnMut() + 'static) -> Self {
        Self(Box::new(unmount))
    }

    pub fn noop() -> Self {
        Self::new(|| {})
    }

    pub fn call(&mut self) {
        (self.0)()
    }
}

impl fmt::Debug for Unmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Unmount")
    }
}

/// Framework glue that renders a tree into a container.
///
/// Contract:
/// - render synchronously inside `mount`;
/// - install the activation state through `activation` before the first
///   render, owned by the mounted tree;
/// - return an [`Unmount`] that releases the tree and tolerates repeat calls.
pub trait MountAdapter {
    type Tree;

    fn mount(
        &self,
        container: ContainerId,
        activation: ActivationSlot,
        tree: Self::Tree,
    ) -> Result<Unmount>;
}

impl<A: MountAdapter + ?Sized> MountAdapter for Rc<A> {
    type Tree = A::Tree;

    fn mount(
        &self,
        container: ContainerId,
        activation: ActivationSlot,
        tree: Self::Tree,
    ) -> Result<Unmount> {
        (**self).mount(container, activation, tree)
    }
}
