use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use imperative_core::{
    ActivationSlot, ContainerId, Controller, Document, MountAdapter, Promise, Registry,
    Result as CoreResult, Runtime, RuntimeHandle, Unmount,
};
use imperative_view::{
    Component, ImperativeRender, MemoryDocument, RenderOptions, Result, View, ViewAdapter, ViewTree,
};

/// Headless harness for exercising imperative renders in tests.
///
/// Owns a runtime, an in-memory document and a private registry, so tests
/// never touch the thread's global registry. Mounts go through a
/// [`CountingAdapter`] so tests can assert how often trees were mounted and
/// released.
pub struct ImperativeTestRule {
    runtime: Runtime,
    document: Rc<MemoryDocument>,
    registry: Registry,
    adapter: Rc<CountingAdapter<ViewAdapter>>,
    renderer: ImperativeRender,
}

impl ImperativeTestRule {
    pub fn new() -> Self {
        let runtime = Runtime::default();
        let document = MemoryDocument::new();
        let registry = Registry::new();
        let adapter = Rc::new(CountingAdapter::new(ViewAdapter::new(Rc::clone(&document))));
        let renderer = ImperativeRender::with_adapter(
            Rc::clone(&document) as Rc<dyn Document>,
            Rc::clone(&adapter) as Rc<dyn MountAdapter<Tree = ViewTree>>,
            runtime.handle(),
        );
        renderer.configure(RenderOptions::new().registry(registry.clone()));
        Self {
            runtime,
            document,
            registry,
            adapter,
            renderer,
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn document(&self) -> &Rc<MemoryDocument> {
        &self.document
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn renderer(&self) -> &ImperativeRender {
        &self.renderer
    }

    pub fn mounts(&self) -> usize {
        self.adapter.mounts()
    }

    pub fn unmounts(&self) -> usize {
        self.adapter.unmounts()
    }

    pub fn render<P, V, E, C>(&self, component: C, props: P) -> Result<Controller<V, E>>
    where
        C: Component<P, V, E> + 'static,
        P: 'static,
        V: Clone + 'static,
        E: Clone + 'static,
    {
        self.renderer
            .imperative_render(component, props, RenderOptions::new())
    }

    pub fn render_async<P, V, E, C>(&self, component: C, props: P) -> Result<Promise<V, E>>
    where
        C: Component<P, V, E> + 'static,
        P: 'static,
        V: Clone + 'static,
        E: Clone + 'static,
    {
        self.renderer
            .async_imperative_render(component, props, RenderOptions::new())
    }

    /// Runs queued teardowns and local futures until nothing is left.
    pub fn pump_until_idle(&self) -> u64 {
        self.runtime.run_until_idle()
    }

    /// Drives `future` to completion on the harness runtime. `None` if it
    /// is still pending once the runtime goes idle.
    pub fn block_on<F>(&self, future: F) -> Option<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        self.runtime.run_to_completion(future)
    }

    /// Current content of a controller's container.
    pub fn content_of<V: Clone + 'static, E: Clone + 'static>(
        &self,
        controller: &Controller<V, E>,
    ) -> Option<View> {
        controller
            .container()
            .and_then(|container| self.document.content(container))
    }

    pub fn markup(&self) -> String {
        self.document.markup()
    }
}

impl Default for ImperativeTestRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to an
/// `ImperativeTestRule`.
pub fn run_test_render<R>(f: impl FnOnce(&ImperativeTestRule) -> R) -> R {
    let rule = ImperativeTestRule::new();
    f(&rule)
}

/// Wraps an adapter and counts mounts and unmount calls that reached it.
pub struct CountingAdapter<A> {
    inner: A,
    mounts: Cell<usize>,
    unmounts: Rc<Cell<usize>>,
}

impl<A> CountingAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            mounts: Cell::new(0),
            unmounts: Rc::new(Cell::new(0)),
        }
    }

    pub fn mounts(&self) -> usize {
        self.mounts.get()
    }

    pub fn unmounts(&self) -> usize {
        self.unmounts.get()
    }
}

impl<A: MountAdapter> MountAdapter for CountingAdapter<A> {
    type Tree = A::Tree;

    fn mount(
        &self,
        container: ContainerId,
        activation: ActivationSlot,
        tree: A::Tree,
    ) -> CoreResult<Unmount> {
        let mut unmount = self.inner.mount(container, activation, tree)?;
        self.mounts.set(self.mounts.get() + 1);
        let unmounts = Rc::clone(&self.unmounts);
        Ok(Unmount::new(move || {
            unmounts.set(unmounts.get() + 1);
            unmount.call();
        }))
    }
}
