use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::registry::next_instance_id;
use crate::support::Harness;
use crate::{Instance, InstanceId, Registry};

struct Member {
    id: InstanceId,
    index: usize,
    destroyed: Cell<u32>,
}

impl Member {
    fn register(registry: &Registry) -> Rc<Member> {
        let member = Rc::new(Member {
            id: next_instance_id(),
            index: registry.next_index(),
            destroyed: Cell::new(0),
        });
        registry.add(member.clone());
        member
    }
}

impl Instance for Member {
    fn id(&self) -> InstanceId {
        self.id
    }

    fn index(&self) -> usize {
        self.index
    }

    fn destroy(&self) {
        self.destroyed.set(self.destroyed.get() + 1);
    }
}

#[test]
fn indices_start_at_one_and_increase_while_members_remain() {
    let registry = Registry::new();
    let a = Member::register(&registry);
    let b = Member::register(&registry);
    assert_eq!((a.index, b.index), (1, 2));

    registry.remove(a.id);
    let c = Member::register(&registry);
    assert_eq!(c.index, 3);

    registry.remove(b.id);
    let d = Member::register(&registry);
    assert_eq!(d.index, 4);
    assert_eq!(registry.indices(), vec![3, 4]);
}

#[test]
fn counter_resets_once_the_set_becomes_empty() {
    let registry = Registry::new();
    let a = Member::register(&registry);
    let b = Member::register(&registry);

    registry.remove(a.id);
    assert_eq!(registry.next_index(), 3);
    registry.remove(b.id);

    assert!(registry.is_empty());
    assert_eq!(registry.next_index(), 1);
}

#[test]
fn removing_a_non_member_changes_nothing() {
    let registry = Registry::new();
    let stranger = next_instance_id();
    registry.next_index();
    registry.next_index();

    assert!(!registry.remove(stranger));
    assert_eq!(registry.next_index(), 3);
}

#[test]
fn add_is_idempotent() {
    let registry = Registry::new();
    let member = Member::register(&registry);

    assert!(!registry.add(member.clone()));
    assert_eq!(registry.len(), 1);
    assert!(registry.contains(member.id));
}

#[test]
fn clear_tears_down_a_snapshot_and_resets() {
    let registry = Registry::new();
    let members: Vec<Rc<Member>> = (0..3).map(|_| Member::register(&registry)).collect();

    // The teardown mutates the set it is iterating over.
    let seen = RefCell::new(Vec::new());
    registry.clear_with(|instance| {
        seen.borrow_mut().push(instance.index());
        registry.remove(instance.id());
    });

    assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    assert!(registry.is_empty());
    assert_eq!(registry.next_index(), 1);
    assert!(members.iter().all(|member| member.destroyed.get() == 0));
}

#[test]
fn clear_defaults_to_destroy() {
    let registry = Registry::new();
    let members: Vec<Rc<Member>> = (0..2).map(|_| Member::register(&registry)).collect();

    registry.clear();

    assert!(members.iter().all(|member| member.destroyed.get() == 1));
    assert!(registry.is_empty());
}

#[test]
fn clear_unmounts_live_controllers_on_the_next_turn() {
    let harness = Harness::new();
    let (first, first_recorder) = harness.mounted::<u8>();
    let (second, second_recorder) = harness.mounted::<u8>();
    assert_eq!(harness.registry.len(), 2);

    harness.registry.clear();
    assert!(harness.registry.is_empty());
    assert_eq!(first_recorder.unmounts.get(), 0);

    harness.runtime.run_until_idle();

    assert_eq!(first_recorder.unmounts.get(), 1);
    assert_eq!(second_recorder.unmounts.get(), 1);
    assert!(first.is_destroyed() && second.is_destroyed());
    assert_eq!(harness.document.attached_count(), 0);
}

#[test]
fn global_registry_is_shared_within_a_thread() {
    let a = Registry::global();
    let b = crate::manager();
    assert!(a.ptr_eq(&b));
    assert!(!a.ptr_eq(&Registry::new()));
}
