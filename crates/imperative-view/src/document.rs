//! In-memory host document.

use std::cell::{Cell, RefCell};
use std::fmt::Write as _;
use std::rc::Rc;

use imperative_core::collections::map::HashMap;
use imperative_core::{ContainerId, Document, Error as CoreError, Result as CoreResult};

use crate::view::View;

#[derive(Default)]
struct ContainerRecord {
    parent: Option<ContainerId>,
    children: Vec<ContainerId>,
    content: Option<View>,
    renders: usize,
}

/// Containers form a tree rooted at [`Document::body`]; each container holds
/// the latest view rendered into it.
pub struct MemoryDocument {
    containers: RefCell<HashMap<ContainerId, ContainerRecord>>,
    next_id: Cell<u64>,
}

const BODY: ContainerId = ContainerId::from_raw(0);

impl MemoryDocument {
    pub fn new() -> Rc<Self> {
        let mut containers = HashMap::new();
        containers.insert(BODY, ContainerRecord::default());
        Rc::new(Self {
            containers: RefCell::new(containers),
            next_id: Cell::new(1),
        })
    }

    /// Live containers, the body included.
    pub fn container_count(&self) -> usize {
        self.containers.borrow().len()
    }

    pub fn contains(&self, container: ContainerId) -> bool {
        self.containers.borrow().contains_key(&container)
    }

    pub fn parent(&self, container: ContainerId) -> Option<ContainerId> {
        self.containers
            .borrow()
            .get(&container)
            .and_then(|record| record.parent)
    }

    pub fn children(&self, container: ContainerId) -> Vec<ContainerId> {
        self.containers
            .borrow()
            .get(&container)
            .map(|record| record.children.clone())
            .unwrap_or_default()
    }

    /// Whether `container` is reachable from the body.
    pub fn is_attached(&self, container: ContainerId) -> bool {
        let containers = self.containers.borrow();
        let mut current = container;
        loop {
            if current == BODY {
                return true;
            }
            match containers.get(&current).and_then(|record| record.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn content(&self, container: ContainerId) -> Option<View> {
        self.containers
            .borrow()
            .get(&container)
            .and_then(|record| record.content.clone())
    }

    /// Number of times a view was written into `container`.
    pub fn render_count(&self, container: ContainerId) -> usize {
        self.containers
            .borrow()
            .get(&container)
            .map(|record| record.renders)
            .unwrap_or(0)
    }

    pub fn set_content(&self, container: ContainerId, view: View) -> CoreResult<()> {
        let mut containers = self.containers.borrow_mut();
        let record = containers
            .get_mut(&container)
            .ok_or(CoreError::UnknownContainer {
                id: container.raw(),
            })?;
        record.content = Some(view);
        record.renders += 1;
        Ok(())
    }

    pub fn clear_content(&self, container: ContainerId) {
        if let Some(record) = self.containers.borrow_mut().get_mut(&container) {
            record.content = None;
        }
    }

    /// Markup of everything attached to the body, one `<div>` per container.
    pub fn markup(&self) -> String {
        let mut out = String::new();
        for child in self.children(BODY) {
            self.write_markup(child, &mut out);
        }
        out
    }

    fn write_markup(&self, container: ContainerId, out: &mut String) {
        let _ = write!(out, "<div data-container=\"{}\">", container.raw());
        if let Some(view) = self.content(container) {
            let _ = write!(out, "{view}");
        }
        for child in self.children(container) {
            self.write_markup(child, out);
        }
        out.push_str("</div>");
    }

    fn unlink(containers: &mut HashMap<ContainerId, ContainerRecord>, container: ContainerId) {
        let parent = containers
            .get_mut(&container)
            .and_then(|record| record.parent.take());
        if let Some(parent) = parent {
            if let Some(record) = containers.get_mut(&parent) {
                record.children.retain(|child| *child != container);
            }
        }
    }
}

impl Document for MemoryDocument {
    fn body(&self) -> ContainerId {
        BODY
    }

    fn create_container(&self) -> ContainerId {
        let id = ContainerId::from_raw(self.next_id.get());
        self.next_id.set(id.raw() + 1);
        self.containers
            .borrow_mut()
            .insert(id, ContainerRecord::default());
        id
    }

    fn attach(&self, parent: ContainerId, container: ContainerId) -> CoreResult<()> {
        let mut containers = self.containers.borrow_mut();
        for id in [parent, container] {
            if !containers.contains_key(&id) {
                return Err(CoreError::UnknownContainer { id: id.raw() });
            }
        }
        Self::unlink(&mut containers, container);
        if let Some(record) = containers.get_mut(&parent) {
            record.children.push(container);
        }
        if let Some(record) = containers.get_mut(&container) {
            record.parent = Some(parent);
        }
        Ok(())
    }

    fn detach(&self, container: ContainerId) -> CoreResult<()> {
        let mut containers = self.containers.borrow_mut();
        if !containers.contains_key(&container) {
            return Err(CoreError::UnknownContainer {
                id: container.raw(),
            });
        }
        Self::unlink(&mut containers, container);
        Ok(())
    }

    /// Drops the record of `container`. Its children stay alive but lose
    /// their parent. The body is only detached.
    fn release(&self, container: ContainerId) -> CoreResult<()> {
        let mut containers = self.containers.borrow_mut();
        if !containers.contains_key(&container) {
            return Err(CoreError::UnknownContainer {
                id: container.raw(),
            });
        }
        Self::unlink(&mut containers, container);
        if container == BODY {
            return Ok(());
        }
        if let Some(record) = containers.remove(&container) {
            for child in record.children {
                if let Some(orphan) = containers.get_mut(&child) {
                    orphan.parent = None;
                }
            }
        }
        Ok(())
    }
}
