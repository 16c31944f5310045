use std::fmt;
use std::rc::Rc;

use imperative_core::{ContainerId, Registry};

use crate::component::Provider;

/// Per-call overrides. Unset fields fall back to [`RenderDefaults`].
#[derive(Clone, Default)]
pub struct RenderOptions {
    pub container: Option<ContainerId>,
    pub provider: Option<Rc<dyn Provider>>,
    pub manual: Option<bool>,
    pub registry: Option<Registry>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container(mut self, container: ContainerId) -> Self {
        self.container = Some(container);
        self
    }

    pub fn provider(mut self, provider: impl Provider + 'static) -> Self {
        self.provider = Some(Rc::new(provider));
        self
    }

    /// Skip mounting; the caller invokes `create` itself.
    pub fn manual(mut self, manual: bool) -> Self {
        self.manual = Some(manual);
        self
    }

    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("container", &self.container)
            .field("provider", &self.provider.is_some())
            .field("manual", &self.manual)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Settings every render starts from.
#[derive(Clone)]
pub struct RenderDefaults {
    pub container: ContainerId,
    pub provider: Option<Rc<dyn Provider>>,
    pub manual: bool,
    pub registry: Registry,
}

impl RenderDefaults {
    /// Mounts under `body` into the thread's global registry.
    pub fn new(body: ContainerId) -> Self {
        Self {
            container: body,
            provider: None,
            manual: false,
            registry: Registry::global(),
        }
    }

    /// `options` laid over these defaults.
    pub fn merge(&self, options: RenderOptions) -> RenderDefaults {
        RenderDefaults {
            container: options.container.unwrap_or(self.container),
            provider: options.provider.or_else(|| self.provider.clone()),
            manual: options.manual.unwrap_or(self.manual),
            registry: options.registry.unwrap_or_else(|| self.registry.clone()),
        }
    }
}

impl fmt::Debug for RenderDefaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderDefaults")
            .field("container", &self.container)
            .field("provider", &self.provider.is_some())
            .field("manual", &self.manual)
            .field("registry", &self.registry)
            .finish()
    }
}
