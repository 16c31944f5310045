//! Entry points: mount a component imperatively and hand back its
//! controller or promise.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use imperative_core::{Controller, Document, MountAdapter, Placement, Promise, RuntimeHandle};

use crate::adapter::{ViewAdapter, ViewTree};
use crate::component::{with_controller, Component};
use crate::document::MemoryDocument;
use crate::error::{Error, Result};
use crate::options::{RenderDefaults, RenderOptions};

type SharedAdapter = Rc<dyn MountAdapter<Tree = ViewTree>>;

pub struct ImperativeRender {
    document: Rc<dyn Document>,
    adapter: SharedAdapter,
    runtime: RuntimeHandle,
    defaults: RefCell<RenderDefaults>,
}

impl ImperativeRender {
    /// Renders into `document` through a [`ViewAdapter`].
    pub fn new(document: Rc<MemoryDocument>, runtime: RuntimeHandle) -> Self {
        let adapter = Rc::new(ViewAdapter::new(Rc::clone(&document)));
        Self::with_adapter(document, adapter, runtime)
    }

    pub fn with_adapter(
        document: Rc<dyn Document>,
        adapter: SharedAdapter,
        runtime: RuntimeHandle,
    ) -> Self {
        let defaults = RenderDefaults::new(document.body());
        Self {
            document,
            adapter,
            runtime,
            defaults: RefCell::new(defaults),
        }
    }

    pub fn defaults(&self) -> RenderDefaults {
        self.defaults.borrow().clone()
    }

    /// Lays `options` over the current defaults for every later render.
    pub fn configure(&self, options: RenderOptions) -> RenderDefaults {
        let merged = self.defaults.borrow().merge(options);
        *self.defaults.borrow_mut() = merged.clone();
        log::debug!("render defaults updated: {merged:?}");
        merged
    }

    /// Builds a controller for `component` and, unless `manual` is set,
    /// mounts it before returning.
    pub fn imperative_render<P, V, E, C>(
        &self,
        component: C,
        props: P,
        options: RenderOptions,
    ) -> Result<Controller<V, E>>
    where
        C: Component<P, V, E> + 'static,
        P: 'static,
        V: Clone + 'static,
        E: Clone + 'static,
    {
        let config = self.defaults.borrow().merge(options);
        let placement = Placement::new(Rc::clone(&self.document), config.container);
        let adapter = Rc::clone(&self.adapter);
        let provider = config.provider;

        let controller = Controller::new(
            &config.registry,
            self.runtime.clone(),
            placement,
            move |controller, container, activation| {
                let tree = with_controller(component, props, controller.clone(), provider);
                adapter.mount(container, activation, tree)
            },
        );
        log::trace!("controller #{} allocated", controller.index());

        if !config.manual {
            controller.create()?;
        }
        Ok(controller)
    }

    /// Like [`ImperativeRender::imperative_render`], but destroys the
    /// instance once its promise settles and returns only the promise.
    pub fn async_imperative_render<P, V, E, C>(
        &self,
        component: C,
        props: P,
        options: RenderOptions,
    ) -> Result<Promise<V, E>>
    where
        C: Component<P, V, E> + 'static,
        P: 'static,
        V: Clone + 'static,
        E: Clone + 'static,
    {
        let controller = self.imperative_render(component, props, options)?;
        let promise = controller.promise();
        let settled = controller.promise();
        let index = controller.index();
        let spawned = self.runtime.spawn_local(async move {
            let _ = settled.await;
            controller.destroy();
        });
        if !spawned {
            log::warn!("controller #{index}: runtime gone, teardown will not follow settlement");
        }
        Ok(promise)
    }
}

impl fmt::Debug for ImperativeRender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImperativeRender")
            .field("defaults", &*self.defaults.borrow())
            .finish()
    }
}

thread_local! {
    static RENDERER: RefCell<Option<Rc<ImperativeRender>>> = const { RefCell::new(None) };
}

/// Makes `renderer` the thread's default. Returns the one it replaced.
pub fn install(renderer: Rc<ImperativeRender>) -> Option<Rc<ImperativeRender>> {
    RENDERER.with(|slot| slot.borrow_mut().replace(renderer))
}

pub fn uninstall() -> Option<Rc<ImperativeRender>> {
    RENDERER.with(|slot| slot.borrow_mut().take())
}

pub fn current() -> Result<Rc<ImperativeRender>> {
    RENDERER
        .with(|slot| slot.borrow().clone())
        .ok_or(Error::NoRenderer)
}

pub fn configure(options: RenderOptions) -> Result<RenderDefaults> {
    Ok(current()?.configure(options))
}

pub fn imperative_render<P, V, E, C>(
    component: C,
    props: P,
    options: RenderOptions,
) -> Result<Controller<V, E>>
where
    C: Component<P, V, E> + 'static,
    P: 'static,
    V: Clone + 'static,
    E: Clone + 'static,
{
    current()?.imperative_render(component, props, options)
}

pub fn async_imperative_render<P, V, E, C>(
    component: C,
    props: P,
    options: RenderOptions,
) -> Result<Promise<V, E>>
where
    C: Component<P, V, E> + 'static,
    P: 'static,
    V: Clone + 'static,
    E: Clone + 'static,
{
    current()?.async_imperative_render(component, props, options)
}
