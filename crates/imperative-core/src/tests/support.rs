use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::{
    ActivationState, ContainerId, Controller, Document, Error, Placement, Registry, Result,
    Runtime, Unmount,
};

#[derive(Default)]
pub(crate) struct TestDocument {
    next_id: Cell<u64>,
    edges: RefCell<Vec<(ContainerId, ContainerId)>>,
    released: RefCell<Vec<ContainerId>>,
}

impl TestDocument {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn is_attached(&self, container: ContainerId) -> bool {
        self.edges
            .borrow()
            .iter()
            .any(|(_, child)| *child == container)
    }

    pub(crate) fn attached_count(&self) -> usize {
        self.edges.borrow().len()
    }

    pub(crate) fn released(&self) -> Vec<ContainerId> {
        self.released.borrow().clone()
    }

    fn is_known(&self, container: ContainerId) -> bool {
        container == self.body()
            || (container.raw() <= self.next_id.get()
                && !self.released.borrow().contains(&container))
    }
}

impl Document for TestDocument {
    fn body(&self) -> ContainerId {
        ContainerId::from_raw(0)
    }

    fn create_container(&self) -> ContainerId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        ContainerId::from_raw(id)
    }

    fn attach(&self, parent: ContainerId, container: ContainerId) -> Result<()> {
        for id in [parent, container] {
            if !self.is_known(id) {
                return Err(Error::UnknownContainer { id: id.raw() });
            }
        }
        self.edges.borrow_mut().push((parent, container));
        Ok(())
    }

    fn detach(&self, container: ContainerId) -> Result<()> {
        self.edges
            .borrow_mut()
            .retain(|(_, child)| *child != container);
        Ok(())
    }

    fn release(&self, container: ContainerId) -> Result<()> {
        self.detach(container)?;
        self.released.borrow_mut().push(container);
        Ok(())
    }
}

/// Activation flag that remembers every value it held.
pub(crate) struct RecordingActivation {
    active: Cell<bool>,
    history: RefCell<Vec<bool>>,
}

impl RecordingActivation {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            active: Cell::new(true),
            history: RefCell::new(vec![true]),
        })
    }

    pub(crate) fn history(&self) -> Vec<bool> {
        self.history.borrow().clone()
    }
}

impl ActivationState for RecordingActivation {
    fn is_active(&self) -> bool {
        self.active.get()
    }

    fn set_active(&self, active: bool) {
        self.active.set(active);
        self.history.borrow_mut().push(active);
    }
}

pub(crate) struct Recorder {
    pub(crate) activation: Rc<RecordingActivation>,
    pub(crate) unmounts: Rc<Cell<usize>>,
}

pub(crate) struct Harness {
    pub(crate) runtime: Runtime,
    pub(crate) registry: Registry,
    pub(crate) document: Rc<TestDocument>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self {
            runtime: Runtime::default(),
            registry: Registry::new(),
            document: TestDocument::new(),
        }
    }

    fn placement(&self) -> Placement {
        Placement::body(self.document.clone())
    }

    /// A controller whose container goes under `parent` instead of the body.
    pub(crate) fn controller_under<V: Clone + 'static>(&self, parent: ContainerId) -> Controller<V> {
        Controller::new(
            &self.registry,
            self.runtime.handle(),
            Placement::new(self.document.clone(), parent),
            |_controller, _container, slot| {
                slot.install(RecordingActivation::new());
                Ok(Unmount::noop())
            },
        )
    }

    /// An unmounted controller whose mount installs a recording activation.
    pub(crate) fn controller<V: Clone + 'static>(&self) -> (Controller<V>, Recorder) {
        let activation = RecordingActivation::new();
        let unmounts = Rc::new(Cell::new(0));
        let recorder = Recorder {
            activation: Rc::clone(&activation),
            unmounts: Rc::clone(&unmounts),
        };
        let controller = Controller::new(
            &self.registry,
            self.runtime.handle(),
            self.placement(),
            move |_controller, _container, slot| {
                slot.install(activation);
                Ok(Unmount::new(move || unmounts.set(unmounts.get() + 1)))
            },
        );
        (controller, recorder)
    }

    pub(crate) fn mounted<V: Clone + 'static>(&self) -> (Controller<V>, Recorder) {
        let (controller, recorder) = self.controller();
        controller.create().expect("mount");
        (controller, recorder)
    }

    pub(crate) fn controller_with<V: Clone + 'static>(
        &self,
        mount: impl FnOnce(&Controller<V>, ContainerId, crate::ActivationSlot) -> Result<Unmount>
            + 'static,
    ) -> Controller<V> {
        Controller::new(&self.registry, self.runtime.handle(), self.placement(), mount)
    }
}
