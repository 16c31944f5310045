//! Retained view trees, an in-memory document, and the imperative render
//! entry points built on `imperative-core`.

pub mod adapter;
pub mod component;
pub mod document;
pub mod error;
pub mod options;
pub mod render;
pub mod state;
pub mod view;

pub use adapter::{ViewAdapter, ViewTree};
pub use component::{with_controller, Component, InjectedProps, Provider};
pub use document::MemoryDocument;
pub use error::{Error, Result};
pub use options::{RenderDefaults, RenderOptions};
pub use render::{
    async_imperative_render, configure, current, imperative_render, install, uninstall,
    ImperativeRender,
};
pub use state::{MutableState, RenderScope};
pub use view::{Element, View};

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod state_tests;

#[cfg(test)]
#[path = "tests/document_tests.rs"]
mod document_tests;

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod render_tests;
