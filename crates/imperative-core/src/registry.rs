//! Bookkeeping for every live controller plus the index allocator.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::collections::OrderedMap;

/// Identity of a controller, unique for the lifetime of the process.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct InstanceId(u64);

impl InstanceId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_instance_id() -> InstanceId {
    InstanceId(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
}

/// Type-erased view of a controller, as stored by the [`Registry`].
pub trait Instance {
    fn id(&self) -> InstanceId;
    fn index(&self) -> usize;
    fn destroy(&self);
}

struct RegistryInner {
    members: RefCell<OrderedMap<InstanceId, Rc<dyn Instance>>>,
    next_index: Cell<usize>,
}

/// Tracks live controllers and hands out their indices.
///
/// Indices grow monotonically while any member is registered. The counter
/// goes back to 1 only when the member set becomes empty through
/// [`Registry::remove`], or on [`Registry::clear`].
#[derive(Clone)]
pub struct Registry {
    inner: Rc<RegistryInner>,
}

thread_local! {
    static GLOBAL_REGISTRY: Registry = Registry::new();
}

impl Registry {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                members: RefCell::new(OrderedMap::default()),
                next_index: Cell::new(1),
            }),
        }
    }

    /// The ambient registry of the current thread.
    pub fn global() -> Self {
        GLOBAL_REGISTRY.with(Registry::clone)
    }

    /// Returns `false` if the instance was already a member.
    pub fn add(&self, instance: Rc<dyn Instance>) -> bool {
        let id = instance.id();
        let mut members = self.inner.members.borrow_mut();
        if members.contains_key(&id) {
            return false;
        }
        members.insert(id, instance);
        true
    }

    /// Returns `false` for non-members, which leaves the counter untouched.
    pub fn remove(&self, id: InstanceId) -> bool {
        let removed = self.inner.members.borrow_mut().shift_remove(&id);
        if removed.is_none() {
            return false;
        }
        if self.inner.members.borrow().is_empty() {
            self.inner.next_index.set(1);
        }
        true
    }

    /// Destroys every member.
    pub fn clear(&self) {
        self.clear_with(|instance| instance.destroy());
    }

    /// Runs `teardown` on a snapshot of the members, then empties the set
    /// and resets the counter.
    pub fn clear_with(&self, mut teardown: impl FnMut(&dyn Instance)) {
        let snapshot: Vec<Rc<dyn Instance>> =
            self.inner.members.borrow().values().cloned().collect();
        log::debug!("clearing {} registered instance(s)", snapshot.len());
        for instance in &snapshot {
            teardown(instance.as_ref());
        }
        self.inner.members.borrow_mut().clear();
        self.inner.next_index.set(1);
    }

    /// Returns the current counter value, then advances it.
    pub fn next_index(&self) -> usize {
        let index = self.inner.next_index.get();
        self.inner.next_index.set(index + 1);
        log::trace!("allocated instance index {index}");
        index
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.inner.members.borrow().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.members.borrow().is_empty()
    }

    /// Indices of the members, in registration order.
    pub fn indices(&self) -> Vec<usize> {
        self.inner
            .members
            .borrow()
            .values()
            .map(|instance| instance.index())
            .collect()
    }

    pub fn ptr_eq(&self, other: &Registry) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("members", &self.len())
            .field("next_index", &self.inner.next_index.get())
            .finish()
    }
}
