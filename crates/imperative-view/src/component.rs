//! Components and the decorator that hands them their controller.

use std::rc::Rc;

use imperative_core::{Controller, Rejection};

use crate::adapter::ViewTree;
use crate::view::View;

/// What a component receives: the caller's props plus the controller that
/// owns the mounted instance.
pub struct InjectedProps<P, V, E = Rejection> {
    pub props: P,
    pub controller: Controller<V, E>,
}

impl<P, V: Clone + 'static, E: Clone + 'static> InjectedProps<P, V, E> {
    pub fn is_active(&self) -> bool {
        self.controller.is_active()
    }

    pub fn resolve(&self, value: V) -> bool {
        self.controller.resolve(value)
    }

    pub fn reject(&self, reason: impl Into<E>) -> bool {
        self.controller.reject(reason)
    }
}

pub trait Component<P, V, E = Rejection> {
    fn render(&self, props: &InjectedProps<P, V, E>) -> View;
}

impl<P, V, E, F> Component<P, V, E> for F
where
    F: Fn(&InjectedProps<P, V, E>) -> View,
{
    fn render(&self, props: &InjectedProps<P, V, E>) -> View {
        self(props)
    }
}

/// Wraps every rendered tree, e.g. to inject context.
pub trait Provider {
    fn provide(&self, view: View) -> View;
}

impl<F> Provider for F
where
    F: Fn(View) -> View,
{
    fn provide(&self, view: View) -> View {
        self(view)
    }
}

/// Binds `component` to `controller`, optionally wrapped by `provider`.
pub fn with_controller<P, V, E, C>(
    component: C,
    props: P,
    controller: Controller<V, E>,
    provider: Option<Rc<dyn Provider>>,
) -> ViewTree
where
    C: Component<P, V, E> + 'static,
    P: 'static,
    V: 'static,
    E: 'static,
{
    let injected = InjectedProps { props, controller };
    Box::new(move || {
        let view = component.render(&injected);
        match &provider {
            Some(provider) => provider.provide(view),
            None => view,
        }
    })
}
