#![doc = r"Lifecycle core for imperatively rendered components: deferred promises, the controller state machine and the registry of live instances."]

pub mod collections;
pub mod controller;
pub mod deferred;
pub mod error;
pub mod host;
pub mod platform;
pub mod registry;
pub mod runtime;

pub use controller::{Controller, Lifecycle, MountFn, Placement};
pub use deferred::{create_deferred, Deferred, Promise};
pub use error::{Error, Rejection, Result};
pub use host::{ActivationSlot, ActivationState, ContainerId, Document, MountAdapter, Unmount};
pub use platform::RuntimeScheduler;
pub use registry::{Instance, InstanceId, Registry};
pub use runtime::{CountingScheduler, DefaultScheduler, Runtime, RuntimeHandle};

/// The ambient registry of the current thread.
pub fn manager() -> Registry {
    Registry::global()
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod support;

#[cfg(test)]
#[path = "tests/deferred_tests.rs"]
mod deferred_tests;

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod registry_tests;

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod controller_tests;

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod runtime_tests;
