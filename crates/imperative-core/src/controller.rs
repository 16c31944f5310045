//! Per-instance handle tying a deferred promise to a mounted tree.
//!
//! States: `Unmounted -> Active <-> Inactive -> Settled -> Destroyed`.
//! Settling and deactivating happen synchronously; teardown always runs on
//! a later runtime turn so a render pass started by the same call stack can
//! finish first.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::{Future, IntoFuture};
use std::rc::Rc;

use crate::deferred::{Deferred, Promise};
use crate::error::{Error, Rejection, Result};
use crate::host::{ActivationCell, ActivationSlot, ActivationState, ContainerId, Document, Unmount};
use crate::registry::{next_instance_id, Instance, InstanceId, Registry};
use crate::runtime::RuntimeHandle;

/// Where a controller puts its container.
#[derive(Clone)]
pub struct Placement {
    pub document: Rc<dyn Document>,
    pub parent: ContainerId,
}

impl Placement {
    pub fn new(document: Rc<dyn Document>, parent: ContainerId) -> Self {
        Self { document, parent }
    }

    /// Places containers directly under the document body.
    pub fn body(document: Rc<dyn Document>) -> Self {
        let parent = document.body();
        Self { document, parent }
    }
}

impl fmt::Debug for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Placement")
            .field("parent", &self.parent)
            .finish()
    }
}

/// Mounts the controller's tree into a freshly attached container.
pub type MountFn<V, E> =
    Box<dyn FnOnce(&Controller<V, E>, ContainerId, ActivationSlot) -> Result<Unmount> + 'static>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Unmounted,
    Active,
    Inactive,
    Settled,
    Destroyed,
}

struct Mounted {
    container: ContainerId,
    unmount: Unmount,
}

struct ControllerInner<V, E> {
    id: InstanceId,
    index: usize,
    deferred: Deferred<V, E>,
    activation: ActivationCell,
    mount: RefCell<Option<MountFn<V, E>>>,
    mounted: RefCell<Option<Mounted>>,
    destroyed: Cell<bool>,
    registry: Registry,
    runtime: RuntimeHandle,
    placement: Placement,
}

pub struct Controller<V, E = Rejection> {
    inner: Rc<ControllerInner<V, E>>,
}

impl<V, E> Clone for Controller<V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<V, E> PartialEq for Controller<V, E> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<V, E> Eq for Controller<V, E> {}

impl<V: Clone + 'static, E: Clone + 'static> Controller<V, E> {
    /// Builds an unmounted controller. The index is allocated from `registry`
    /// right away; membership only starts with [`Controller::create`].
    pub fn new(
        registry: &Registry,
        runtime: RuntimeHandle,
        placement: Placement,
        mount: impl FnOnce(&Controller<V, E>, ContainerId, ActivationSlot) -> Result<Unmount>
            + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(ControllerInner {
                id: next_instance_id(),
                index: registry.next_index(),
                deferred: Deferred::new(),
                activation: Rc::new(RefCell::new(None)),
                mount: RefCell::new(Some(Box::new(mount))),
                mounted: RefCell::new(None),
                destroyed: Cell::new(false),
                registry: registry.clone(),
                runtime,
                placement,
            }),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.inner.id
    }

    pub fn index(&self) -> usize {
        self.inner.index
    }

    pub fn promise(&self) -> Promise<V, E> {
        self.inner.deferred.promise()
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn container(&self) -> Option<ContainerId> {
        self.inner
            .mounted
            .borrow()
            .as_ref()
            .map(|mounted| mounted.container)
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    pub fn is_settled(&self) -> bool {
        self.inner.deferred.is_settled()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        if self.inner.destroyed.get() {
            Lifecycle::Destroyed
        } else if self.inner.mounted.borrow().is_none() {
            Lifecycle::Unmounted
        } else if self.inner.deferred.is_settled() {
            Lifecycle::Settled
        } else if self.is_active() {
            Lifecycle::Active
        } else {
            Lifecycle::Inactive
        }
    }

    /// Attaches a container, registers, and mounts. Runs once.
    pub fn create(&self) -> Result<()> {
        let index = self.inner.index;
        if self.inner.destroyed.get() {
            return Err(Error::Destroyed { index });
        }
        if self.inner.mount.borrow().is_none() {
            return Err(Error::DoubleCreate { index });
        }

        let document = Rc::clone(&self.inner.placement.document);
        let container = document.create_container();
        if let Err(err) = document.attach(self.inner.placement.parent, container) {
            log::error!("controller #{index}: attach failed: {err}");
            Self::release(document.as_ref(), container, index);
            return Err(err);
        }
        let mount = match self.inner.mount.borrow_mut().take() {
            Some(mount) => mount,
            None => {
                Self::release(document.as_ref(), container, index);
                return Err(Error::DoubleCreate { index });
            }
        };
        self.inner.registry.add(self.as_instance());

        let slot = ActivationSlot::new(Rc::clone(&self.inner.activation));
        let outcome = match mount(self, container, slot.clone()) {
            Ok(unmount) if slot.is_installed() => Ok(unmount),
            Ok(mut unmount) => {
                unmount.call();
                Err(Error::adapter(
                    "mount returned without installing the activation state",
                ))
            }
            Err(err @ Error::AdapterContractViolation { .. }) => Err(err),
            Err(err) => Err(Error::adapter(format!("mount failed: {err}"))),
        };

        match outcome {
            Ok(unmount) => {
                *self.inner.mounted.borrow_mut() = Some(Mounted { container, unmount });
                log::debug!("controller #{index} mounted into container {container}");
                Ok(())
            }
            Err(err) => {
                log::error!("controller #{index} failed to mount: {err}");
                self.inner.activation.borrow_mut().take();
                Self::release(document.as_ref(), container, index);
                self.inner.registry.remove(self.inner.id);
                Err(err)
            }
        }
    }

    /// `false` before mount and after teardown.
    pub fn is_active(&self) -> bool {
        let state = self.inner.activation.borrow().clone();
        state.map(|state| state.is_active()).unwrap_or(false)
    }

    pub fn set_active(&self, active: bool) -> Result<()> {
        let state = self.activation()?;
        log::trace!("controller #{} active={active}", self.inner.index);
        state.set_active(active);
        Ok(())
    }

    /// Deactivates, then settles with `value`. Returns whether this call
    /// settled the promise.
    pub fn resolve(&self, value: V) -> bool {
        self.settle(Ok(value))
    }

    /// Deactivates, then settles with `reason`. Returns whether this call
    /// settled the promise.
    pub fn reject(&self, reason: impl Into<E>) -> bool {
        self.settle(Err(reason.into()))
    }

    pub fn settle(&self, outcome: std::result::Result<V, E>) -> bool {
        self.deactivate();
        self.inner.deferred.settle(outcome)
    }

    /// Deactivates for as long as `task` runs. The returned future yields
    /// the task's output unchanged and reactivates once it completes, even
    /// when the output is an error or the future is dropped early.
    pub fn wait_until<F>(&self, task: F) -> Result<impl Future<Output = F::Output>>
    where
        F: IntoFuture,
    {
        let resume = self.pause()?;
        let task = task.into_future();
        Ok(async move {
            let output = task.await;
            drop(resume);
            output
        })
    }

    /// Like [`Controller::wait_until`], but starts the task only after the
    /// instance has been deactivated.
    pub fn wait_until_with<F, Fut>(&self, start: F) -> Result<impl Future<Output = Fut::Output>>
    where
        F: FnOnce() -> Fut,
        Fut: IntoFuture,
    {
        let resume = self.pause()?;
        let task = start().into_future();
        Ok(async move {
            let output = task.await;
            drop(resume);
            output
        })
    }

    /// Schedules teardown for a later turn: unmount, detach the container,
    /// leave the registry. Only the first teardown has any effect.
    pub fn destroy(&self) {
        let this = self.clone();
        self.inner.runtime.spawn_task(Box::new(move || this.teardown()));
    }

    fn teardown(&self) {
        let index = self.inner.index;
        if self.inner.destroyed.replace(true) {
            log::trace!("controller #{index} already torn down");
            return;
        }
        self.inner.mount.borrow_mut().take();
        let mounted = self.inner.mounted.borrow_mut().take();
        if let Some(Mounted {
            container,
            mut unmount,
        }) = mounted
        {
            unmount.call();
            Self::release(self.inner.placement.document.as_ref(), container, index);
        }
        self.inner.activation.borrow_mut().take();
        self.inner.registry.remove(self.inner.id);
        log::debug!("controller #{index} destroyed");
    }

    fn release(document: &dyn Document, container: ContainerId, index: usize) {
        if let Err(err) = document.release(container) {
            log::warn!("controller #{index}: releasing container {container} failed: {err}");
        }
    }

    fn activation(&self) -> Result<Rc<dyn ActivationState>> {
        let index = self.inner.index;
        if self.inner.destroyed.get() {
            return Err(Error::Destroyed { index });
        }
        let state = self.inner.activation.borrow().clone();
        state.ok_or(Error::NotMounted { index })
    }

    fn deactivate(&self) {
        let state = self.inner.activation.borrow().clone();
        if let Some(state) = state {
            state.set_active(false);
        }
    }

    fn pause(&self) -> Result<Reactivate<V, E>> {
        let state = self.activation()?;
        state.set_active(false);
        Ok(Reactivate {
            state,
            owner: Rc::clone(&self.inner),
        })
    }

    fn as_instance(&self) -> Rc<dyn Instance> {
        Rc::new(self.clone())
    }
}

impl<V: Clone + 'static, E: Clone + 'static> Instance for Controller<V, E> {
    fn id(&self) -> InstanceId {
        self.inner.id
    }

    fn index(&self) -> usize {
        self.inner.index
    }

    fn destroy(&self) {
        Controller::destroy(self);
    }
}

impl<V, E> fmt::Debug for Controller<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("index", &self.inner.index)
            .field("id", &self.inner.id)
            .field("settled", &self.inner.deferred.is_settled())
            .field("destroyed", &self.inner.destroyed.get())
            .finish()
    }
}

/// Restores activation when dropped, unless the owner settled meanwhile.
struct Reactivate<V, E> {
    state: Rc<dyn ActivationState>,
    owner: Rc<ControllerInner<V, E>>,
}

impl<V, E> Drop for Reactivate<V, E> {
    fn drop(&mut self) {
        if self.owner.deferred.is_settled() {
            log::trace!("controller #{} settled while waiting; staying inactive", self.owner.index);
            return;
        }
        self.state.set_active(true);
    }
}
