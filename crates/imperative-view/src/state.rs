//! Reactive cells and the render scopes that observe them.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use imperative_core::{ActivationState, ContainerId, Result as CoreResult};

use crate::document::MemoryDocument;
use crate::view::View;

thread_local! {
    static CURRENT_SCOPE: RefCell<Vec<Weak<ScopeInner>>> = const { RefCell::new(Vec::new()) };
}

fn current_scope() -> Option<Weak<ScopeInner>> {
    CURRENT_SCOPE.with(|stack| stack.borrow().last().cloned())
}

/// Pops the render scope pushed for the duration of one pass.
struct ScopeGuard;

impl ScopeGuard {
    fn enter(scope: &Rc<ScopeInner>) -> Self {
        CURRENT_SCOPE.with(|stack| stack.borrow_mut().push(Rc::downgrade(scope)));
        ScopeGuard
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        CURRENT_SCOPE.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

struct StateInner<T> {
    value: RefCell<T>,
    watchers: RefCell<Vec<Weak<ScopeInner>>>,
}

/// A value that re-renders every scope that read it during a render pass.
pub struct MutableState<T> {
    inner: Rc<StateInner<T>>,
}

impl<T> Clone for MutableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for MutableState<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for MutableState<T> {}

impl<T> MutableState<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(StateInner {
                value: RefCell::new(value),
                watchers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.subscribe_current_scope();
        let value = self.inner.value.borrow();
        f(&value)
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = {
            let mut value = self.inner.value.borrow_mut();
            f(&mut value)
        };
        self.notify_watchers();
        result
    }

    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.notify_watchers();
    }

    pub fn watcher_count(&self) -> usize {
        let mut watchers = self.inner.watchers.borrow_mut();
        watchers.retain(|w| w.strong_count() > 0);
        watchers.len()
    }

    fn subscribe_current_scope(&self) {
        let Some(scope) = current_scope() else {
            return;
        };
        let mut watchers = self.inner.watchers.borrow_mut();
        watchers.retain(|w| w.strong_count() > 0);
        if !watchers.iter().any(|w| Weak::ptr_eq(w, &scope)) {
            watchers.push(scope);
        }
    }

    fn notify_watchers(&self) {
        let scopes: Vec<RenderScope> = {
            let mut watchers = self.inner.watchers.borrow_mut();
            watchers.retain(|w| w.strong_count() > 0);
            watchers
                .iter()
                .filter_map(Weak::upgrade)
                .map(|inner| RenderScope { inner })
                .collect()
        };
        for scope in scopes {
            scope.invalidate();
        }
    }
}

impl<T: Clone> MutableState<T> {
    pub fn get(&self) -> T {
        self.with(T::clone)
    }
}

impl<T: fmt::Debug> fmt::Debug for MutableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableState")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

impl ActivationState for MutableState<bool> {
    fn is_active(&self) -> bool {
        self.get()
    }

    fn set_active(&self, active: bool) {
        self.set(active);
    }
}

type RenderFn = Rc<dyn Fn() -> View>;

struct ScopeInner {
    render: RefCell<Option<RenderFn>>,
    document: Rc<MemoryDocument>,
    container: ContainerId,
    rendering: Cell<bool>,
    dirty: Cell<bool>,
    disposed: Cell<bool>,
    remembered: RefCell<Vec<Rc<dyn Any>>>,
}

/// Renders a view function into one container and re-renders it whenever a
/// state it read changes.
#[derive(Clone)]
pub struct RenderScope {
    inner: Rc<ScopeInner>,
}

impl RenderScope {
    pub fn new(
        document: Rc<MemoryDocument>,
        container: ContainerId,
        render: impl Fn() -> View + 'static,
    ) -> Self {
        Self::from_render(document, container, Rc::new(render))
    }

    pub(crate) fn from_render(
        document: Rc<MemoryDocument>,
        container: ContainerId,
        render: RenderFn,
    ) -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                render: RefCell::new(Some(render)),
                document,
                container,
                rendering: Cell::new(false),
                dirty: Cell::new(false),
                disposed: Cell::new(false),
                remembered: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn container(&self) -> ContainerId {
        self.inner.container
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Keeps `value` alive for as long as the scope is mounted.
    pub fn remember(&self, value: Rc<dyn Any>) {
        self.inner.remembered.borrow_mut().push(value);
    }

    /// Runs the render function and stores the result in the container.
    /// A render requested while one is in progress runs right after it.
    pub fn render_now(&self) -> CoreResult<()> {
        let inner = &self.inner;
        if inner.disposed.get() {
            return Ok(());
        }
        if inner.rendering.replace(true) {
            inner.dirty.set(true);
            return Ok(());
        }
        let result = self.render_until_clean();
        inner.rendering.set(false);
        result
    }

    fn render_until_clean(&self) -> CoreResult<()> {
        let inner = &self.inner;
        loop {
            inner.dirty.set(false);
            let render = inner.render.borrow().clone();
            let Some(render) = render else {
                return Ok(());
            };
            let view = {
                let _guard = ScopeGuard::enter(inner);
                render()
            };
            if inner.disposed.get() {
                return Ok(());
            }
            inner.document.set_content(inner.container, view)?;
            if !inner.dirty.get() {
                return Ok(());
            }
        }
    }

    pub fn invalidate(&self) {
        if let Err(err) = self.render_now() {
            log::error!("re-render of container {} failed: {err}", self.inner.container);
        }
    }

    /// Drops the render function and remembered values and clears the
    /// container. Repeat calls do nothing.
    pub fn dispose(&self) {
        let inner = &self.inner;
        if inner.disposed.replace(true) {
            return;
        }
        inner.render.borrow_mut().take();
        let remembered = std::mem::take(&mut *inner.remembered.borrow_mut());
        drop(remembered);
        inner.document.clear_content(inner.container);
        log::trace!("render scope for container {} disposed", inner.container);
    }
}

impl fmt::Debug for RenderScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderScope")
            .field("container", &self.inner.container)
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}
