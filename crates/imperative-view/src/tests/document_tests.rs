use imperative_core::{ContainerId, Document, Error as CoreError};

use crate::{MemoryDocument, View};

#[test]
fn containers_attach_under_the_body() {
    let document = MemoryDocument::new();
    let body = document.body();
    let container = document.create_container();
    assert!(!document.is_attached(container));

    document.attach(body, container).expect("attach");

    assert!(document.is_attached(container));
    assert_eq!(document.parent(container), Some(body));
    assert_eq!(document.children(body), vec![container]);
}

#[test]
fn attaching_again_moves_the_container() {
    let document = MemoryDocument::new();
    let body = document.body();
    let outer = document.create_container();
    let inner = document.create_container();
    document.attach(body, outer).expect("attach outer");
    document.attach(body, inner).expect("attach inner");

    document.attach(outer, inner).expect("reparent");

    assert_eq!(document.children(body), vec![outer]);
    assert_eq!(document.children(outer), vec![inner]);
    assert!(document.is_attached(inner));
}

#[test]
fn detach_is_a_noop_for_unattached_containers() {
    let document = MemoryDocument::new();
    let container = document.create_container();

    document.detach(container).expect("detach unattached");
    document.attach(document.body(), container).expect("attach");
    document.detach(container).expect("detach");
    document.detach(container).expect("detach twice");

    assert!(!document.is_attached(container));
    assert!(document.children(document.body()).is_empty());
}

#[test]
fn unknown_containers_are_rejected() {
    let document = MemoryDocument::new();
    let stranger = ContainerId::from_raw(42);

    assert_eq!(
        document.attach(document.body(), stranger),
        Err(CoreError::UnknownContainer { id: 42 })
    );
    assert_eq!(
        document.detach(stranger),
        Err(CoreError::UnknownContainer { id: 42 })
    );
}

#[test]
fn markup_nests_attached_containers_only() {
    let document = MemoryDocument::new();
    let shown = document.create_container();
    let hidden = document.create_container();
    document.attach(document.body(), shown).expect("attach");
    document
        .set_content(shown, View::element("p").child("hi").into())
        .expect("content");
    document
        .set_content(hidden, View::text("nope"))
        .expect("content");

    assert_eq!(
        document.markup(),
        format!("<div data-container=\"{}\"><p>hi</p></div>", shown.raw())
    );
    assert_eq!(document.render_count(shown), 1);
}

#[test]
fn release_forgets_the_container() {
    let document = MemoryDocument::new();
    let outer = document.create_container();
    let inner = document.create_container();
    document.attach(document.body(), outer).expect("attach outer");
    document.attach(outer, inner).expect("attach inner");
    document
        .set_content(outer, View::text("gone"))
        .expect("content");

    document.release(outer).expect("release");

    assert!(!document.contains(outer));
    assert_eq!(document.content(outer), None);
    assert!(document.children(document.body()).is_empty());
    assert!(document.contains(inner));
    assert_eq!(document.parent(inner), None);
    assert_eq!(document.container_count(), 2);
    assert_eq!(
        document.release(outer),
        Err(CoreError::UnknownContainer { id: outer.raw() })
    );
}
